use crate::auth::JwtError;
use crate::repositories::RepositoryError;
use crate::services::{
    AuthServiceError, CatalogServiceError, ContractError, EmailError, SupervisionError,
    UserServiceError,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("This account has been disabled")]
    AccountDisabled,

    #[error("Please verify your email address before logging in")]
    EmailNotVerified,

    #[error("You don't have permission to perform this action")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled | AppError::EmailNotVerified | AppError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_) | AppError::Email(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::AccountDisabled => "account_disabled",
            AppError::EmailNotVerified => "email_not_verified",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation_error",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Email(_) => "email_error",
            AppError::Database(_) | AppError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Database(_) | AppError::InternalError(_) => {
                tracing::error!("{}", self);
                "Internal server error".to_string()
            }
            AppError::Email(_) => {
                tracing::error!("{}", self);
                "Failed to send email, please try again later".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::NotFound => AppError::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists(column) => {
                AppError::Conflict(format!("{} already exists", column))
            }
            RepositoryError::MissingReference => {
                AppError::Validation("Referenced record does not exist".to_string())
            }
            RepositoryError::Corrupt(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired | JwtError::InvalidToken => AppError::Unauthorized(err.to_string()),
            JwtError::Signing(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidName
            | UserServiceError::InvalidCountry
            | UserServiceError::InvalidPhone
            | UserServiceError::InvalidNationalId
            | UserServiceError::InvalidEmail
            | UserServiceError::WeakPassword
            | UserServiceError::PasswordMismatch => AppError::Validation(err.to_string()),
            UserServiceError::UserNotFound | UserServiceError::InvalidVerificationToken => {
                AppError::NotFound(err.to_string())
            }
            UserServiceError::EmailTaken | UserServiceError::NationalIdTaken => {
                AppError::Conflict(err.to_string())
            }
            UserServiceError::HashingError(msg) => AppError::InternalError(msg),
            UserServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => AppError::InvalidCredentials,
            AuthServiceError::AccountDisabled => AppError::AccountDisabled,
            AuthServiceError::EmailNotVerified => AppError::EmailNotVerified,
            // A valid token for a deleted account.
            AuthServiceError::UserNotFound => {
                AppError::Unauthorized("Account no longer exists".to_string())
            }
            AuthServiceError::Token(e) => e.into(),
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<CatalogServiceError> for AppError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::MissingTitle
            | CatalogServiceError::MissingDescription
            | CatalogServiceError::InvalidDuration
            | CatalogServiceError::InvalidPrice => AppError::Validation(err.to_string()),
            CatalogServiceError::NotFound => AppError::NotFound(err.to_string()),
            CatalogServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<SupervisionError> for AppError {
    fn from(err: SupervisionError) -> Self {
        match err {
            SupervisionError::SelfAssignment
            | SupervisionError::NotASupervisor(_)
            | SupervisionError::NotADelegate(_) => AppError::Validation(err.to_string()),
            SupervisionError::SupervisorNotFound
            | SupervisionError::DelegateNotFound
            | SupervisionError::LinkNotFound => AppError::NotFound(err.to_string()),
            SupervisionError::AlreadyAssigned => AppError::Conflict(err.to_string()),
            SupervisionError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<ContractError> for AppError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::EmptyFile
            | ContractError::UnsupportedType
            | ContractError::ServiceNotFound => AppError::Validation(err.to_string()),
            ContractError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ContractError::NotFound => AppError::NotFound(err.to_string()),
            ContractError::AccessDenied => AppError::Forbidden,
            ContractError::Storage(e) => AppError::InternalError(e.to_string()),
            ContractError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::Email(err.to_string())
    }
}
