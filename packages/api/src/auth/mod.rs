//! Authentication: password hashing, tokens, sessions.

pub mod jwt;
pub mod password;
mod service;

pub use jwt::{Claims, JwtConfig};
pub use service::{AuthService, AuthSession};
