use shared_database::store::UserStore;
use shared_models::auth::{TokenClaims, User};
use shared_models::error::AppError;

/// Resolve verified token claims into the live user record.
///
/// Role and verification state are mutable, so authorization decisions must
/// never trust the signed claims alone; a subject that no longer resolves
/// is treated as unauthenticated, not as an internal error.
pub async fn resolve(claims: &TokenClaims, users: &dyn UserStore) -> Result<User, AppError> {
    let user = users
        .find_user(claims.sub)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    user.ok_or_else(|| AppError::Auth("account no longer exists".to_string()))
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin access required".to_string()))
    }
}

pub fn require_verified_provider(user: &User) -> Result<(), AppError> {
    if user.is_verified_provider() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "verified provider access required".to_string(),
        ))
    }
}
