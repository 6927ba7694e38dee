pub mod auth_service;
pub mod catalog_service;
pub mod contract_service;
pub mod email_service;
pub mod supervision_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, LoginRequest};
pub use catalog_service::{
    CatalogService, CatalogServiceError, CreateServiceRequest, UpdateServiceRequest,
};
pub use contract_service::{ContractError, ContractService, ContractUpload, Requester};
pub use email_service::{
    create_email_service, ContactMessage, ContractNotice, EmailError, EmailService,
    MockEmailService, SmtpEmailService,
};
pub use supervision_service::{SupervisionError, SupervisionService};
pub use user_service::{
    CreateUserRequest, RegisterRequest, UpdatePasswordRequest, UpdateUserRequest, UserService,
    UserServiceError,
};
