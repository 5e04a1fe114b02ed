/// Login host (steps 1 and 2 of the handshake)
const WEBAUTH_BASE_URL: &str = "https://webauth.southernco.com";

/// Customer service site (steps 3 and 4)
const CUSTOMER_SERVICE_BASE_URL: &str = "https://customerservice2.southerncompany.com";

/// Data API host
const API_BASE_URL: &str = "https://customerservice2api.southerncompany.com";

/// Hosts the client talks to.
///
/// Production always uses `Endpoints::default()`; other bases exist so tests
/// can point the whole client at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub webauth_base: String,
    pub customer_service_base: String,
    pub api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            webauth_base: WEBAUTH_BASE_URL.to_string(),
            customer_service_base: CUSTOMER_SERVICE_BASE_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Serve every endpoint from a single base URL
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            webauth_base: base.clone(),
            customer_service_base: base.clone(),
            api_base: base,
        }
    }

    pub fn login_page(&self) -> String {
        format!("{}/account/login", self.webauth_base)
    }

    pub fn login_api(&self) -> String {
        format!("{}/api/login", self.webauth_base)
    }

    pub fn login_complete(&self) -> String {
        format!("{}/Account/LoginComplete?ReturnUrl=null", self.customer_service_base)
    }

    pub fn jwt_token(&self) -> String {
        format!("{}/Account/LoginValidated/JwtToken", self.customer_service_base)
    }

    pub fn all_accounts(&self) -> String {
        format!("{}/api/account/getAllAccounts", self.api_base)
    }
}
