//! Credentials and access tokens

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{TokenError, TokenRejection, TokenService};
