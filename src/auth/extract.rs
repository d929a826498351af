use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Verified caller identity for driver endpoints, extracted from the
/// `Authorization: Bearer <token>` header.
pub struct AuthDriver(pub Uuid);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthDriver {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_string()))?;

        let driver_id = state.auth.verify(token)?;
        Ok(AuthDriver(driver_id))
    }
}
