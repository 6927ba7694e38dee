use crate::auth::jwt::{Claims, JwtError, JwtManager};
use crate::models::user::User;
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::user_service::normalize_email;
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account disabled")]
    AccountDisabled,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("User not found")]
    UserNotFound,
    #[error("Token error: {0}")]
    Token(#[from] JwtError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    jwt: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, jwt: Arc<JwtManager>) -> Self {
        Self {
            user_repository,
            jwt,
        }
    }

    /// Checks credentials, then account state. The password is checked
    /// first so a disabled or unverified account is never revealed to
    /// someone without the password.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !self.verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthServiceError::AccountDisabled);
        }

        if !user.email_verified {
            return Err(AuthServiceError::EmailNotVerified);
        }

        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthServiceError> {
        Ok(self.jwt.issue(user)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthServiceError> {
        Ok(self.jwt.verify(token)?)
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.jwt.ttl_seconds()
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<User, AuthServiceError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}
