pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtError, JwtManager};
pub use middleware::{optional_user, require_auth, require_page_auth, AuthUser, ACCESS_TOKEN_COOKIE};
