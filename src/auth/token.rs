use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Driver id the token was issued to.
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens for drivers.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue(&self, driver_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: driver_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::Internal(format!("token encode: {err}")))
    }

    /// Verifies a token and returns the driver id it carries.
    ///
    /// A token whose claims do not deserialize (a subject that is not a
    /// driver id) is malformed input rather than a failed authentication,
    /// and is reported as such.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::Json(_) => {
                    AppError::InvalidInput(format!("malformed token subject: {err}"))
                }
                _ => AppError::Unauthorized(format!("invalid token: {err}")),
            })?;

        Ok(data.claims.sub)
    }
}
