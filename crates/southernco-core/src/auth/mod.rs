//! Authentication against the Southern Company web portal.
//!
//! This module provides:
//! - `Authenticator`: the four-step login handshake and the cached bearer credential
//! - `extract`: pure text scraping of the tokens each step hands back
//!
//! The credential lives in memory only and is never refreshed; it is
//! acquired on first use and kept for the life of the `Authenticator`.

pub mod error;
pub mod extract;
pub mod handshake;

pub use error::{AuthError, HandshakeStep, TokenExtractionError};
pub use handshake::Authenticator;
