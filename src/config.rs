use std::env;

use crate::error::AppError;
use crate::models::driver::GeoPoint;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    /// Location assigned to drivers that have not reported one yet.
    pub default_location: GeoPoint,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::Internal("JWT_SECRET must be set".to_string()))?,
            token_ttl_secs: parse_or_default("TOKEN_TTL_SECS", 86_400)?,
            bcrypt_cost: parse_or_default("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            default_location: GeoPoint {
                lat: parse_or_default("DEFAULT_LAT", 0.0)?,
                lng: parse_or_default("DEFAULT_LNG", 0.0)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
