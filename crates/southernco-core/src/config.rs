//! User configuration.
//!
//! Holds the portal login and, optionally, the account numbers to work
//! with. When no account is configured every account visible to the login
//! is used.
//!
//! Configuration is read from `SOUTHERNCO_*` environment variables (the CLI
//! loads a `.env` file first) or built directly by library callers.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

pub const USERNAME_VAR: &str = "SOUTHERNCO_USERNAME";
pub const PASSWORD_VAR: &str = "SOUTHERNCO_PASSWORD";
pub const ACCOUNT_VAR: &str = "SOUTHERNCO_ACCOUNT";
/// Comma-separated list of account numbers
pub const ACCOUNTS_VAR: &str = "SOUTHERNCO_ACCOUNTS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// Single account number
    pub account: Option<String>,
    /// Several account numbers; unioned with `account` when filtering
    pub accounts: Option<Vec<String>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("account", &self.account)
            .field("accounts", &self.accounts)
            .finish()
    }
}

impl Config {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = Some(accounts.into_iter().map(Into::into).collect());
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    /// Blank values count as unset. The password is kept exactly as given.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // Blank values count as unset; everything but the password is trimmed
        fn trimmed(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        let username = trimmed(lookup(USERNAME_VAR)).ok_or(ConfigError::Missing(USERNAME_VAR))?;
        let password = lookup(PASSWORD_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(PASSWORD_VAR))?;
        let account = trimmed(lookup(ACCOUNT_VAR));
        let accounts = trimmed(lookup(ACCOUNTS_VAR))
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        Ok(Self {
            username,
            password,
            account,
            accounts,
        })
    }

    /// Account numbers named by the configuration, without any lookup.
    ///
    /// `accounts` wins when present, otherwise `account` as a single entry,
    /// otherwise nothing.
    pub fn configured_account_numbers(&self) -> Vec<String> {
        if let Some(ref accounts) = self.accounts {
            accounts.clone()
        } else if let Some(ref account) = self.account {
            vec![account.clone()]
        } else {
            Vec::new()
        }
    }

    /// Set of account numbers to keep, or `None` to keep every account
    pub fn account_filter(&self) -> Option<HashSet<String>> {
        if self.account.is_none() && self.accounts.is_none() {
            return None;
        }

        let mut filter: HashSet<String> = self.accounts.iter().flatten().cloned().collect();
        if let Some(ref account) = self.account {
            filter.insert(account.clone());
        }
        Some(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_configured_numbers_single_account() {
        let config = Config::new("user", "pass").with_account("123");
        assert_eq!(config.configured_account_numbers(), vec!["123"]);
    }

    #[test]
    fn test_configured_numbers_none() {
        let config = Config::new("user", "pass");
        assert!(config.configured_account_numbers().is_empty());
        assert!(config.account_filter().is_none());
    }

    #[test]
    fn test_configured_numbers_accounts_win() {
        let config = Config::new("user", "pass")
            .with_account("999")
            .with_accounts(["1", "2"]);
        assert_eq!(config.configured_account_numbers(), vec!["1", "2"]);
    }

    #[test]
    fn test_account_filter_is_union() {
        let config = Config::new("user", "pass")
            .with_account("3")
            .with_accounts(["1", "2"]);
        let filter = config.account_filter().unwrap();
        assert_eq!(filter.len(), 3);
        assert!(filter.contains("1") && filter.contains("2") && filter.contains("3"));
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (USERNAME_VAR, "someone@example.com"),
            (PASSWORD_VAR, "hunter2"),
            (ACCOUNTS_VAR, " 111, 222 ,,"),
        ]))
        .unwrap();
        assert_eq!(config.username, "someone@example.com");
        assert_eq!(config.account, None);
        assert_eq!(config.accounts, Some(vec!["111".to_string(), "222".to_string()]));
    }

    #[test]
    fn test_from_lookup_blank_values_unset() {
        let config = Config::from_lookup(lookup(&[
            (USERNAME_VAR, "u"),
            (PASSWORD_VAR, "p"),
            (ACCOUNT_VAR, "  "),
            (ACCOUNTS_VAR, " , "),
        ]))
        .unwrap();
        assert_eq!(config.account, None);
        assert_eq!(config.accounts, None);
    }

    #[test]
    fn test_from_lookup_keeps_password_verbatim() {
        let config = Config::from_lookup(lookup(&[
            (USERNAME_VAR, " u "),
            (PASSWORD_VAR, " pass word "),
        ]))
        .unwrap();
        assert_eq!(config.username, "u");
        assert_eq!(config.password, " pass word ");
    }

    #[test]
    fn test_from_lookup_blank_password_missing() {
        let err = Config::from_lookup(lookup(&[(USERNAME_VAR, "u"), (PASSWORD_VAR, "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PASSWORD_VAR));
    }

    #[test]
    fn test_from_lookup_missing_password() {
        let err = Config::from_lookup(lookup(&[(USERNAME_VAR, "u")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PASSWORD_VAR));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::new("u", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
    }
}
