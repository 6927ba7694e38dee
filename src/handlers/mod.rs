pub mod auth_handlers;
pub mod contact_handlers;
pub mod contract_handlers;
pub mod email_handlers;
pub mod health_handlers;
pub mod page_handlers;
pub mod service_handlers;
pub mod supervision_handlers;
pub mod user_handlers;
