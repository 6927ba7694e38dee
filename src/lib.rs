pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use auth::JwtManager;
use config::AppConfig;
use repositories::{
    SqliteContractRepository, SqliteServiceRepository, SqliteSupervisorDelegateRepository,
    SqliteUserRepository,
};
use services::{
    AuthService, CatalogService, ContractService, EmailService, SupervisionService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub supervision_service: Arc<SupervisionService>,
    pub contract_service: Arc<ContractService>,
    pub email_service: Arc<dyn EmailService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires the SQLite repositories into the services.
    pub fn new(
        pool: sqlx::SqlitePool,
        config: AppConfig,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let service_repository = Arc::new(SqliteServiceRepository::new(pool.clone()));
        let link_repository = Arc::new(SqliteSupervisorDelegateRepository::new(pool.clone()));
        let contract_repository = Arc::new(SqliteContractRepository::new(pool.clone()));

        let jwt = Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_ttl_hours));

        let user_service = Arc::new(UserService::new(
            user_repository.clone(),
            email_service.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(user_repository.clone(), jwt));
        let catalog_service = Arc::new(CatalogService::new(service_repository.clone()));
        let supervision_service = Arc::new(SupervisionService::new(
            link_repository,
            user_repository,
        ));
        let contract_service = Arc::new(ContractService::new(
            contract_repository,
            service_repository,
            config.contracts_dir.clone(),
            config.max_upload_bytes,
        ));

        Self {
            config: Arc::new(config),
            user_service,
            auth_service,
            catalog_service,
            supervision_service,
            contract_service,
            email_service,
            pool,
        }
    }
}
