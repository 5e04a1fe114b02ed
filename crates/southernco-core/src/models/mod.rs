//! Data models for Southern Company account data.
//!
//! - `Account`, `Company`: accounts visible to a login
//! - `AccountsResponse`, `AccountRecord`: raw account listing as the API returns it
//! - `ResolvedAccounts`: the accounts selected by a `Config`

pub mod account;

pub use account::{Account, AccountRecord, AccountsResponse, Company, ResolvedAccounts};
