pub mod contract;
pub mod service;
pub mod supervisor_delegate;
pub mod user;

pub use contract::Contract;
pub use service::Service;
pub use supervisor_delegate::{SupervisorDelegate, SupervisorDelegateView};
pub use user::{NewUser, ProfileFields, Role, User, UserProfile};
