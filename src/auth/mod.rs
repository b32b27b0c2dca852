//! Authentication module: password hashing, token issuance and the bearer gate

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtService};
pub use middleware::{extract_token, jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
