//! Authentication and token lifecycle

pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;

pub use cookies::{clear_token_cookies, set_token_cookies, ACCESS_COOKIE, REFRESH_COOKIE};
pub use jwt::{Claims, TokenCodec, TokenPair};
pub use middleware::{auth_gate, authenticate, require_role};
pub use models::{Identity, Role, User};
pub use password::{hash_password, verify_password};
pub use session::AuthService;
