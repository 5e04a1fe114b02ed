use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::Config;

/// Southern Company operating company serving an account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Company {
    Alabama,
    Georgia,
    Mississippi,
    Gulf,
    /// Name the portal sent that is not one of the known companies
    Unknown(String),
}

impl Company {
    /// Look up a company by its short code or long name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "APC" | "ALABAMA" | "ALABAMA POWER" => Company::Alabama,
            "GPC" | "GEORGIA" | "GEORGIA POWER" => Company::Georgia,
            "MPC" | "MISSISSIPPI" | "MISSISSIPPI POWER" => Company::Mississippi,
            "GULF" | "GULF POWER" => Company::Gulf,
            _ => Company::Unknown(name.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Company::Alabama => "APC",
            Company::Georgia => "GPC",
            Company::Mississippi => "MPC",
            Company::Gulf => "GULF",
            Company::Unknown(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Company::Alabama => "Alabama Power",
            Company::Georgia => "Georgia Power",
            Company::Mississippi => "Mississippi Power",
            Company::Gulf => "Gulf Power",
            Company::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for Company {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A utility account visible to the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub name: String,
    pub primary: bool,
    pub number: String,
    pub company: Company,
}

/// Account listing response from `getAllAccounts`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    #[serde(rename = "Data", default)]
    pub data: Vec<AccountRecord>,
}

/// One raw account entry as the API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "PrimaryAccount", default, deserialize_with = "flag")]
    pub primary_account: bool,
    #[serde(rename = "AccountNumber", deserialize_with = "number_string")]
    pub account_number: String,
    #[serde(rename = "Company", default, deserialize_with = "optional_name")]
    pub company: Option<String>,
}

impl AccountRecord {
    pub fn to_account(&self) -> Account {
        Account {
            name: self.description.clone().unwrap_or_default(),
            primary: self.primary_account,
            number: self.account_number.clone(),
            company: Company::from_name(self.company.as_deref().unwrap_or_default()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

// Account numbers arrive as JSON numbers; keep their decimal text.
fn number_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

fn optional_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Scalar::Text(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "true" | "1"),
        None => false,
    })
}

/// Accounts selected for a configuration.
///
/// `account_numbers` is what downstream data requests should iterate: the
/// configured numbers (`accounts` followed by `account` when it is not
/// already listed) when the configuration names any, otherwise the numbers
/// of every account the login can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAccounts {
    pub accounts: Vec<Account>,
    pub account_numbers: Vec<String>,
}

impl ResolvedAccounts {
    /// Select from a full account listing according to `config`.
    /// Source order is preserved.
    pub fn from_listing(mut accounts: Vec<Account>, config: &Config) -> Self {
        match config.account_filter() {
            Some(filter) => {
                accounts.retain(|a| filter.contains(&a.number));
                let mut account_numbers = config.configured_account_numbers();
                if let Some(ref account) = config.account {
                    if !account_numbers.contains(account) {
                        account_numbers.push(account.clone());
                    }
                }
                Self {
                    accounts,
                    account_numbers,
                }
            }
            None => {
                let account_numbers = accounts.iter().map(|a| a.number.clone()).collect();
                Self {
                    accounts,
                    account_numbers,
                }
            }
        }
    }

    pub fn primary(&self) -> Option<&Account> {
        self.accounts.iter().find(|a| a.primary)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "StatusCode": 200,
        "Data": [
            {"Description": "Home", "PrimaryAccount": "Y", "AccountNumber": 1234567890, "Company": "GPC"},
            {"Description": "Lake House", "PrimaryAccount": "N", "AccountNumber": "2222222222", "Company": "Alabama Power"},
            {"Description": null, "PrimaryAccount": false, "AccountNumber": 3333333333, "Company": "SEGCO"}
        ]
    }"#;

    fn accounts() -> Vec<Account> {
        let parsed: AccountsResponse = serde_json::from_str(LISTING).expect("Failed to parse listing test JSON");
        parsed.data.iter().map(|r| r.to_account()).collect()
    }

    #[test]
    fn test_parse_account_listing() {
        let accounts = accounts();
        assert_eq!(accounts.len(), 3);

        assert_eq!(accounts[0].name, "Home");
        assert!(accounts[0].primary);
        assert_eq!(accounts[0].number, "1234567890");
        assert_eq!(accounts[0].company, Company::Georgia);

        assert!(!accounts[1].primary);
        assert_eq!(accounts[1].company, Company::Alabama);

        assert_eq!(accounts[2].name, "");
        assert_eq!(accounts[2].company, Company::Unknown("SEGCO".to_string()));
    }

    #[test]
    fn test_company_serializes_as_code() {
        let json = serde_json::to_value(&accounts()[0]).unwrap();
        assert_eq!(json["company"], "GPC");
        assert_eq!(json["number"], "1234567890");
    }

    #[test]
    fn test_resolve_without_filter_keeps_all() {
        let config = Config::new("u", "p");
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        assert_eq!(resolved.accounts.len(), 3);
        assert_eq!(resolved.account_numbers, vec!["1234567890", "2222222222", "3333333333"]);
        assert_eq!(resolved.primary().map(|a| a.name.as_str()), Some("Home"));

        let again = ResolvedAccounts::from_listing(accounts(), &config);
        assert_eq!(again, resolved);
    }

    #[test]
    fn test_resolve_single_account() {
        let config = Config::new("u", "p").with_account("2222222222");
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        assert_eq!(resolved.accounts.len(), 1);
        assert_eq!(resolved.accounts[0].name, "Lake House");
        assert_eq!(resolved.account_numbers, vec!["2222222222"]);
    }

    #[test]
    fn test_resolve_account_and_accounts_union() {
        let config = Config::new("u", "p")
            .with_account("3333333333")
            .with_accounts(["1234567890", "2222222222"]);
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        assert_eq!(resolved.accounts.len(), 3);
        assert_eq!(resolved.account_numbers, vec!["1234567890", "2222222222", "3333333333"]);

        // Already listed single account is not repeated
        let config = Config::new("u", "p")
            .with_account("2222222222")
            .with_accounts(["2222222222"]);
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        assert_eq!(resolved.account_numbers, vec!["2222222222"]);
    }

    #[test]
    fn test_primary_flag_forms() {
        let json = r#"{"Data": [
            {"AccountNumber": 1, "PrimaryAccount": 1.0},
            {"AccountNumber": 2, "PrimaryAccount": 0},
            {"AccountNumber": 3, "PrimaryAccount": true},
            {"AccountNumber": 4, "PrimaryAccount": "yes"},
            {"AccountNumber": 5}
        ]}"#;
        let parsed: AccountsResponse = serde_json::from_str(json).expect("Failed to parse flag test JSON");
        let flags: Vec<bool> = parsed.data.iter().map(|r| r.primary_account).collect();
        assert_eq!(flags, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_resolve_unknown_account_is_empty() {
        let config = Config::new("u", "p").with_account("404");
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_multiple_keeps_source_order() {
        let config = Config::new("u", "p").with_accounts(["3333333333", "1234567890", "1234567890"]);
        let resolved = ResolvedAccounts::from_listing(accounts(), &config);
        let numbers: Vec<&str> = resolved.accounts.iter().map(|a| a.number.as_str()).collect();
        assert_eq!(numbers, vec!["1234567890", "3333333333"]);
    }

    #[test]
    fn test_company_lookup() {
        assert_eq!(Company::from_name("gpc"), Company::Georgia);
        assert_eq!(Company::from_name("Mississippi Power"), Company::Mississippi);
        assert_eq!(Company::from_name("GULF"), Company::Gulf);
        assert_eq!(Company::Gulf.to_string(), "Gulf Power");
    }
}
