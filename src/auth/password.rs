use crate::error::AppError;

/// Hashes a plaintext password. The plaintext is consumed so it cannot
/// linger once the hash exists.
pub fn hash(plain: String, cost: u32) -> Result<String, AppError> {
    if plain.len() < 8 {
        return Err(AppError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    bcrypt::hash(plain, cost).map_err(|err| AppError::Internal(format!("password hash: {err}")))
}

pub fn verify(plain: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(plain, hash).map_err(|err| AppError::Internal(format!("password verify: {err}")))
}
