use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::store::{ProviderStore, UserStore};
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::provider::{ProviderProfile, VerificationStatus};

const MIN_PASSWORD_LEN: usize = 8;

pub struct CredentialService {
    users: Arc<dyn UserStore>,
    providers: Arc<dyn ProviderStore>,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserStore>, providers: Arc<dyn ProviderStore>) -> Self {
        Self { users, providers }
    }

    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    pub fn verify_password(
        password: &str,
        hash: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Register a new account. Doctor signups additionally get a pending
    /// provider profile; admin accounts are provisioned directly, never
    /// through this endpoint.
    pub async fn signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::ValidationError("invalid email address".to_string()));
        }
        if name.trim().is_empty() {
            return Err(AppError::ValidationError("name must not be empty".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if role == Role::Admin {
            return Err(AppError::ValidationError(
                "admin accounts cannot be self-registered".to_string(),
            ));
        }

        let password_hash =
            Self::hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: name.trim().to_string(),
            password_hash,
            role,
            verified: false,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert_user(user).await.map_err(AppError::from)?;

        if role == Role::Doctor {
            self.providers
                .insert_profile(ProviderProfile {
                    provider_id: user.id,
                    specialty: None,
                    working_days: Vec::new(),
                    verification: VerificationStatus::Pending,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .map_err(AppError::from)?;
        }

        info!("registered {} account {}", user.role, user.id);
        Ok(user)
    }

    /// Check credentials and return the account. Unknown email and wrong
    /// password produce the identical failure so login cannot be used to
    /// probe for registered addresses.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();

        let user = self
            .users
            .find_user_by_email(&email)
            .await
            .map_err(AppError::from)?;

        let user = match user {
            Some(user) => user,
            None => {
                debug!("login attempt for unknown email");
                return Err(AppError::Auth("invalid email or password".to_string()));
            }
        };

        let password_ok = Self::verify_password(password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !password_ok {
            debug!("failed login attempt for user {}", user.id);
            return Err(AppError::Auth("invalid email or password".to_string()));
        }

        Ok(user)
    }
}
