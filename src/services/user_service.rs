use crate::models::user::{NewUser, ProfileFields, Role, User};
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::email_service::EmailService;
use crate::validation;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Name is required")]
    InvalidName,
    #[error("Country is required")]
    InvalidCountry,
    #[error("Invalid Egyptian mobile number")]
    InvalidPhone,
    #[error("National ID must be exactly 14 digits")]
    InvalidNationalId,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password too weak (minimum 8 characters)")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("National ID already registered")]
    NationalIdTaken,
    #[error("Verification link is invalid or already used")]
    InvalidVerificationToken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Self-service sign-up from the public form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub password_confirm: Option<String>,
}

/// Account creation by an administrator or the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub country: String,
    pub phone: String,
    pub national_id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub password_confirm: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub email_verified: bool,
}

fn default_true() -> bool {
    true
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub struct UpdatePasswordRequest {
    pub user_id: i64,
    pub new_password: String,
    pub new_password_confirm: Option<String>,
}

/// Identity fields after trimming and normalization.
struct Identity {
    name: String,
    country: String,
    phone: String,
    national_id: String,
    email: String,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    email_service: Arc<dyn EmailService>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, email_service: Arc<dyn EmailService>) -> Self {
        Self {
            repository,
            email_service,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserServiceError> {
        let identity = validate_identity(
            &request.name,
            &request.country,
            &request.phone,
            &request.national_id,
            &request.email,
        )?;
        validate_new_password(&request.password, request.password_confirm.as_deref())?;

        let token = generate_token();
        let new_user = NewUser {
            name: identity.name,
            country: identity.country,
            phone: identity.phone,
            national_id: identity.national_id,
            email: identity.email,
            password_hash: hash_password(&request.password)?,
            role: Role::User,
            is_active: true,
            email_verified: false,
            verification_token: Some(token.clone()),
        };

        let user = self
            .repository
            .create_user(&new_user)
            .await
            .map_err(map_conflict)?;

        tracing::info!("Registered user {} ({})", user.id, user.email);

        // The account stays; the user can ask for a new link later.
        if let Err(e) = self
            .email_service
            .send_verification_email(&user.email, &user.name, &token)
            .await
        {
            tracing::warn!("Failed to send verification email to {}: {}", user.email, e);
        }

        Ok(user)
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let identity = validate_identity(
            &request.name,
            &request.country,
            &request.phone,
            &request.national_id,
            &request.email,
        )?;
        validate_new_password(&request.password, request.password_confirm.as_deref())?;

        let new_user = NewUser {
            name: identity.name,
            country: identity.country,
            phone: identity.phone,
            national_id: identity.national_id,
            email: identity.email,
            password_hash: hash_password(&request.password)?,
            role: request.role,
            is_active: request.is_active,
            email_verified: request.email_verified,
            verification_token: None,
        };

        let user = self
            .repository
            .create_user(&new_user)
            .await
            .map_err(map_conflict)?;

        tracing::info!("Created {} account {} ({})", user.role, user.id, user.email);
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, UserServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)
    }

    pub async fn list_users(
        &self,
        role: Option<Role>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(role, limit, offset).await?)
    }

    pub async fn count_users(&self) -> Result<i64, UserServiceError> {
        Ok(self.repository.count_users().await?)
    }

    pub async fn update_user(
        &self,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<User, UserServiceError> {
        let existing = self.get_user(id).await?;
        let current = ProfileFields::from(&existing);

        let identity = validate_identity(
            request.name.as_deref().unwrap_or(&current.name),
            request.country.as_deref().unwrap_or(&current.country),
            request.phone.as_deref().unwrap_or(&current.phone),
            request.national_id.as_deref().unwrap_or(&current.national_id),
            request.email.as_deref().unwrap_or(&current.email),
        )?;

        let fields = ProfileFields {
            name: identity.name,
            country: identity.country,
            phone: identity.phone,
            national_id: identity.national_id,
            email: identity.email,
            role: request.role.unwrap_or(current.role),
            is_active: request.is_active.unwrap_or(current.is_active),
        };

        match self.repository.update_profile(id, &fields).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(UserServiceError::UserNotFound),
            Err(e) => return Err(map_conflict(e)),
        }

        self.get_user(id).await
    }

    pub async fn set_role(&self, id: i64, role: Role) -> Result<User, UserServiceError> {
        self.update_user(
            id,
            UpdateUserRequest {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<User, UserServiceError> {
        self.update_user(
            id,
            UpdateUserRequest {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn verify_user_email(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.mark_email_verified(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    /// Consumes a verification token and returns the now-verified user.
    pub async fn verify_email_token(&self, token: &str) -> Result<User, UserServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(UserServiceError::InvalidVerificationToken);
        }

        let user = self
            .repository
            .find_by_verification_token(token)
            .await?
            .ok_or(UserServiceError::InvalidVerificationToken)?;

        self.verify_user_email(user.id).await?;
        tracing::info!("Email verified for user {}", user.id);

        self.get_user(user.id).await
    }

    /// Issues a fresh token for an unverified account. Unknown and already
    /// verified addresses succeed without sending anything.
    pub async fn resend_verification(&self, email: &str) -> Result<(), UserServiceError> {
        let Some(user) = self.find_user_by_email(email).await? else {
            tracing::debug!("Verification resend requested for unknown email");
            return Ok(());
        };
        if user.email_verified {
            return Ok(());
        }

        let token = generate_token();
        self.repository
            .set_verification_token(user.id, &token)
            .await?;

        if let Err(e) = self
            .email_service
            .send_verification_email(&user.email, &user.name, &token)
            .await
        {
            tracing::warn!("Failed to resend verification email to {}: {}", user.email, e);
        }

        Ok(())
    }

    pub async fn update_password(
        &self,
        request: UpdatePasswordRequest,
    ) -> Result<(), UserServiceError> {
        validate_new_password(
            &request.new_password,
            request.new_password_confirm.as_deref(),
        )?;

        let password_hash = hash_password(&request.new_password)?;

        match self
            .repository
            .update_password(request.user_id, &password_hash)
            .await
        {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_identity(
    name: &str,
    country: &str,
    phone: &str,
    national_id: &str,
    email: &str,
) -> Result<Identity, UserServiceError> {
    let name = validation::non_blank(name).ok_or(UserServiceError::InvalidName)?;
    let country = validation::non_blank(country).ok_or(UserServiceError::InvalidCountry)?;
    let phone =
        validation::normalize_egyptian_mobile(phone).ok_or(UserServiceError::InvalidPhone)?;

    let national_id = national_id.trim().to_string();
    if !validation::is_valid_national_id(&national_id) {
        return Err(UserServiceError::InvalidNationalId);
    }

    let email = normalize_email(email);
    if !validation::is_valid_email(&email) {
        return Err(UserServiceError::InvalidEmail);
    }

    Ok(Identity {
        name,
        country,
        phone,
        national_id,
        email,
    })
}

fn validate_new_password(password: &str, confirm: Option<&str>) -> Result<(), UserServiceError> {
    if let Some(confirm) = confirm {
        if password != confirm {
            return Err(UserServiceError::PasswordMismatch);
        }
    }
    if !validation::is_strong_enough_password(password) {
        return Err(UserServiceError::WeakPassword);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::HashingError(e.to_string()))
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

fn map_conflict(err: RepositoryError) -> UserServiceError {
    match err {
        RepositoryError::AlreadyExists(column) if column == "national_id" => {
            UserServiceError::NationalIdTaken
        }
        RepositoryError::AlreadyExists(_) => UserServiceError::EmailTaken,
        e => UserServiceError::RepositoryError(e),
    }
}
