pub mod contract_repository;
pub mod service_repository;
pub mod supervisor_delegate_repository;
pub mod user_repository;

pub use contract_repository::{ContractRepository, SqliteContractRepository};
pub use service_repository::{ServiceRepository, SqliteServiceRepository};
pub use supervisor_delegate_repository::{
    SqliteSupervisorDelegateRepository, SupervisorDelegateRepository,
};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("Referenced record does not exist")]
    MissingReference,
    #[error("Stored data is invalid: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Maps constraint violations on writes to domain errors. For unique
/// violations the offending column is taken from the SQLite message
/// (`UNIQUE constraint failed: users.email`).
pub(crate) fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let column = db_err
                .message()
                .rsplit('.')
                .next()
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| "record".to_string());
            return RepositoryError::AlreadyExists(column);
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::MissingReference;
        }
    }
    RepositoryError::Database(err)
}
