//! polls-server - polling REST API
//!
//! Users register, sign in for a bearer token, create polls with an
//! expiration window, vote once per poll and browse paginated listings.
//!
//! # Architecture
//!
//! - **models**: validated input types and pagination
//! - **store**: the `Store` trait plus the in-memory implementation
//! - **db**: PostgreSQL implementation (pool, migrations, repositories)
//! - **auth**: argon2 password hashing and HS256 access tokens
//! - **service**: poll and account logic, page assembly
//! - **http**: axum router, extractors and JSON errors
//! - **config**: TOML configuration with environment overrides

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod service;
pub mod store;

pub use auth::TokenService;
pub use config::{ConfigError, PollsConfig};
pub use db::PgStore;
pub use error::{ServiceError, ServiceResult};
pub use http::{build_router, run_server, AppState, ServerConfig};
pub use store::{MemoryStore, Store, StoreError};
