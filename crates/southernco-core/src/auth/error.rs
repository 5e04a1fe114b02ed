use std::fmt;

use thiserror::Error;

/// One round-trip of the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Login page scrape for the anti-forgery token
    VerificationToken,
    /// Credential POST answered with the primary `ScWebToken`
    PrimarySessionToken,
    /// Login completion answered with the `ScWebToken` cookie
    SecondarySessionCookie,
    /// JWT issuance answered with the `ScJwtToken` cookie
    BearerCredential,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HandshakeStep::VerificationToken => "request verification token",
            HandshakeStep::PrimarySessionToken => "ScWebToken",
            HandshakeStep::SecondarySessionCookie => "secondary ScWebToken",
            HandshakeStep::BearerCredential => "JWT",
        };
        f.write_str(label)
    }
}

/// An expected token was not present in the scraped text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not find {token} in {location}")]
pub struct TokenExtractionError {
    pub token: &'static str,
    pub location: &'static str,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to get {step} [Code: {status}: {status_text}] {url}: {detail}")]
    Status {
        step: HandshakeStep,
        status: u16,
        status_text: String,
        url: String,
        detail: String,
    },

    #[error("Failed to get {step}: {source}")]
    Extraction {
        step: HandshakeStep,
        #[source]
        source: TokenExtractionError,
    },

    #[error("Failed to get {step}: request to {url} failed: {source}")]
    Network {
        step: HandshakeStep,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to get {step}: invalid response: {source}")]
    InvalidResponse {
        step: HandshakeStep,
        #[source]
        source: serde_json::Error,
    },
}

impl AuthError {
    /// The handshake step that failed
    pub fn step(&self) -> HandshakeStep {
        match self {
            AuthError::Status { step, .. }
            | AuthError::Extraction { step, .. }
            | AuthError::Network { step, .. }
            | AuthError::InvalidResponse { step, .. } => *step,
        }
    }

    /// HTTP status code, if the failure was a non-200 response
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
