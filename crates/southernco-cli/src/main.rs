//! southernco - command line access to Southern Company account data.
//!
//! Logs in to the customer portal with the configured credentials and
//! prints the accounts the login can see.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use southernco_core::config::PASSWORD_VAR;
use southernco_core::{ApiClient, Config};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "\
Usage: southernco [COMMAND]

Commands:
  accounts   Print the configured accounts as JSON (default)
  login      Print the account numbers to use, listing them from the
             portal when none are configured

Configuration is read from the environment or a .env file:
  SOUTHERNCO_USERNAME   portal username (required)
  SOUTHERNCO_PASSWORD   portal password (prompted for when unset)
  SOUTHERNCO_ACCOUNT    single account number
  SOUTHERNCO_ACCOUNTS   comma-separated account numbers

Set RUST_LOG (e.g. RUST_LOG=debug) to control logging.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Accounts,
    Login,
}

impl Command {
    /// Parse the first argument; `Ok(None)` means help was requested
    fn parse(arg: Option<&str>) -> Result<Option<Self>> {
        match arg {
            None | Some("accounts") => Ok(Some(Command::Accounts)),
            Some("login") => Ok(Some(Command::Login)),
            Some("-h") | Some("--help") | Some("help") => Ok(None),
            Some(other) => Err(anyhow::anyhow!("Unknown command '{}'\n\n{}", other, USAGE)),
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Read configuration, prompting for the password on a terminal when it is not set
fn load_config() -> Result<Config> {
    Config::from_lookup(|key| {
        let value = std::env::var(key).ok();
        if key == PASSWORD_VAR && value.is_none() && io::stdin().is_terminal() {
            return rpassword::prompt_password("Password: ").ok();
        }
        value
    })
    .context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = Command::parse(args.get(1).map(String::as_str))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    init_tracing();

    let config = load_config()?;
    let client = ApiClient::from_config(&config).context("Failed to create API client")?;
    info!(username = %config.username, ?command, "Starting");

    match command {
        Command::Accounts => {
            let resolved = client
                .resolve_accounts(&config)
                .await
                .context("Failed to resolve accounts")?;
            if resolved.is_empty() {
                warn!(configured = ?config.configured_account_numbers(), "No accounts matched the configuration");
            }
            if let Some(primary) = resolved.primary() {
                info!(number = %primary.number, company = %primary.company, "Primary account");
            }
            println!("{}", serde_json::to_string_pretty(&resolved.accounts)?);
        }
        Command::Login => {
            let numbers = client.login(&config).await.context("Failed to log in")?;
            for number in numbers {
                println!("{}", number);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse(None).unwrap(), Some(Command::Accounts));
        assert_eq!(Command::parse(Some("accounts")).unwrap(), Some(Command::Accounts));
        assert_eq!(Command::parse(Some("login")).unwrap(), Some(Command::Login));
        assert_eq!(Command::parse(Some("--help")).unwrap(), None);
        assert!(Command::parse(Some("usage")).is_err());
    }
}
