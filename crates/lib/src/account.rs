//! Core data types for accounts, credentials, and the account table.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::constants::ACCOUNT_SEPARATOR;

/// Accounts of every added instance: `instance -> username -> credential`.
///
/// An instance with an empty inner map has been added but has no accounts
/// (it is "anonymous"). Ordered maps make "first-seen" selection deterministic.
pub type AccountTable = BTreeMap<String, BTreeMap<String, Credential>>;

/// Per-instance default usernames: `instance -> username`.
pub type DefaultAccounts = BTreeMap<String, String>;

/// Opaque authentication token returned by a login call.
///
/// Serialized as `{ "raw": "<token>" }`. The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    raw: String,
}

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw token, e.g. for an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("raw", &"<redacted>")
            .finish()
    }
}

impl From<String> for Credential {
    fn from(raw: String) -> Self {
        Self { raw }
    }
}

impl From<&str> for Credential {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Reference to one account, written as `username@instance`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountRef {
    pub username: String,
    pub instance: String,
}

impl AccountRef {
    pub fn new(username: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            instance: instance.into(),
        }
    }

    /// Parse `username@instance`, splitting on the first separator.
    ///
    /// Returns `None` when there is no separator.
    pub fn parse(value: &str) -> Option<Self> {
        value
            .split_once(ACCOUNT_SEPARATOR)
            .map(|(username, instance)| Self::new(username, instance))
    }

    /// Whether this reference names an account present in `accounts`.
    pub fn exists_in(&self, accounts: &AccountTable) -> bool {
        accounts
            .get(&self.instance)
            .is_some_and(|users| users.contains_key(&self.username))
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.username, ACCOUNT_SEPARATOR, self.instance)
    }
}

/// Error returned when a string is not of the form `username@instance`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid account reference '{value}': expected username@instance")]
pub struct ParseAccountRefError {
    pub value: String,
}

impl FromStr for AccountRef {
    type Err = ParseAccountRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseAccountRefError {
            value: s.to_string(),
        })
    }
}
