//! REST API client module for the Southern Company customer service API.
//!
//! This module provides the `ApiClient` for issuing authenticated requests
//! and resolving the accounts a user has access to.
//!
//! The API uses JWT bearer authentication obtained through the portal's
//! login handshake (see [`crate::auth`]).

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use endpoints::Endpoints;
pub use error::ApiError;
