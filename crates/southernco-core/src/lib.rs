//! Core library for the Southern Company customer portal.
//!
//! The portal has no public API. This crate logs in the way the web client
//! does (login page token, session token, session cookie, JWT) and then
//! reads account data with the resulting bearer credential.
//!
//! - [`auth`]: the login handshake and the cached credential
//! - [`api`]: authenticated requests and account resolution
//! - [`models`]: account types
//! - [`config`]: user configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Endpoints};
pub use auth::{AuthError, Authenticator, TokenExtractionError};
pub use config::{Config, ConfigError};
pub use models::{Account, Company, ResolvedAccounts};
