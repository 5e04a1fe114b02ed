//! Token scraping for the login handshake.
//!
//! Every function here takes raw text (a page, an HTML fragment, or
//! `Set-Cookie` header values) and returns the token or a
//! `TokenExtractionError`. No I/O happens in this module.

use std::sync::OnceLock;

use regex::Regex;

use super::TokenExtractionError;

/// Anti-forgery token attribute on the login page
const VERIFICATION_TOKEN_PATTERN: &str = r#"(?i)data-aft="(\S+)""#;

/// Hidden form field carrying the primary session token (a three-part JWT)
const PRIMARY_TOKEN_PATTERN: &str = r"(?im)NAME='ScWebToken' value='(\S+\.\S+\.\S+)'";

const SC_WEB_TOKEN_COOKIE_PATTERN: &str = r"(?i)(?:^|[\s,;])ScWebToken=([^;\s]+);";
const SC_JWT_TOKEN_COOKIE_PATTERN: &str = r"(?i)(?:^|[\s,;])ScJwtToken=([^;\s]+);";

static VERIFICATION_TOKEN: OnceLock<Regex> = OnceLock::new();
static PRIMARY_TOKEN: OnceLock<Regex> = OnceLock::new();
static SC_WEB_TOKEN_COOKIE: OnceLock<Regex> = OnceLock::new();
static SC_JWT_TOKEN_COOKIE: OnceLock<Regex> = OnceLock::new();

/// Session cookies issued during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCookie {
    /// `ScWebToken`, set by login completion
    ScWebToken,
    /// `ScJwtToken`, set by JWT issuance
    ScJwtToken,
}

impl SessionCookie {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCookie::ScWebToken => "ScWebToken",
            SessionCookie::ScJwtToken => "ScJwtToken",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            SessionCookie::ScWebToken => compiled(&SC_WEB_TOKEN_COOKIE, SC_WEB_TOKEN_COOKIE_PATTERN),
            SessionCookie::ScJwtToken => compiled(&SC_JWT_TOKEN_COOKIE, SC_JWT_TOKEN_COOKIE_PATTERN),
        }
    }
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("token pattern must compile"))
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the request verification token from the login page HTML
pub fn verification_token(page: &str) -> Result<String, TokenExtractionError> {
    first_capture(compiled(&VERIFICATION_TOKEN, VERIFICATION_TOKEN_PATTERN), page).ok_or(
        TokenExtractionError {
            token: "request verification token",
            location: "login page",
        },
    )
}

/// Extract the primary `ScWebToken` from the HTML fragment in the login response
pub fn primary_session_token(html: &str) -> Result<String, TokenExtractionError> {
    first_capture(compiled(&PRIMARY_TOKEN, PRIMARY_TOKEN_PATTERN), html).ok_or(
        TokenExtractionError {
            token: "ScWebToken",
            location: "login response",
        },
    )
}

/// Extract a session cookie value from `Set-Cookie` header values.
///
/// Headers are searched in order and the first match wins. Cookies with an
/// empty value (the portal's way of clearing a cookie) never match.
pub fn cookie_token<'a, I>(set_cookies: I, cookie: SessionCookie) -> Result<String, TokenExtractionError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut saw_any = false;
    for value in set_cookies {
        saw_any = true;
        if let Some(token) = first_capture(cookie.pattern(), value) {
            return Ok(token);
        }
    }

    Err(TokenExtractionError {
        token: cookie.name(),
        location: if saw_any {
            "Set-Cookie headers"
        } else {
            "response: no cookies were sent back"
        },
    })
}
