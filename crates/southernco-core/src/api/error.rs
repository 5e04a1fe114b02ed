use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Failed to make API request [Code: {status}: {status_text}] {url}: {}", .body.as_deref().unwrap_or("<unreadable body>"))]
    Status {
        status: u16,
        status_text: String,
        url: String,
        body: Option<String>,
    },

    #[error("Network error requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid embedding excessive data in errors
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated, {} total bytes)", head, body.len())
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, url: &str, body: Option<&str>) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            url: url.to_string(),
            body: body.map(truncate_body),
        }
    }

    /// HTTP status code of a rejected data request
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Auth(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn test_truncate_body_long() {
        let body = "é".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.starts_with(&"é".repeat(500)));
        assert!(truncated.ends_with("(truncated, 1200 total bytes)"));
    }

    #[test]
    fn test_from_status_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            "https://example.test/api/account/getAllAccounts",
            Some("{\"Message\":\"denied\"}"),
        );
        let msg = err.to_string();
        assert!(msg.contains("401: Unauthorized"));
        assert!(msg.contains("/api/account/getAllAccounts"));
        assert!(msg.contains("denied"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_from_status_without_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "https://example.test/x", None);
        assert!(err.to_string().contains("<unreadable body>"));
    }
}
