//! The registry's state snapshot, its derived queries, and reconciliation.

use std::collections::BTreeSet;

use tracing::debug;

use crate::account::{AccountRef, AccountTable, Credential, DefaultAccounts};

/// Everything the registry knows, as a plain value.
///
/// Queries on this type are pure. Mutations go through
/// [`AccountRegistry`](super::AccountRegistry), which reconciles and persists after each one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryState {
    /// Accounts of every added instance
    pub accounts: AccountTable,
    /// Default username per instance
    pub default_accounts: DefaultAccounts,
    /// Global default account
    pub default_account: Option<AccountRef>,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `instance` was never added or has no accounts.
    pub fn is_anonymous_for(&self, instance: &str) -> bool {
        self.accounts
            .get(instance)
            .is_none_or(|users| users.is_empty())
    }

    /// Every added instance.
    pub fn instances(&self) -> BTreeSet<String> {
        self.accounts.keys().cloned().collect()
    }

    /// Added instances with at least one account.
    pub fn logged_in_instances(&self) -> BTreeSet<String> {
        self.accounts
            .iter()
            .filter(|(_, users)| !users.is_empty())
            .map(|(instance, _)| instance.clone())
            .collect()
    }

    pub fn has_any_account(&self) -> bool {
        self.accounts.values().any(|users| !users.is_empty())
    }

    /// Username half of the global default account.
    pub fn default_username(&self) -> Option<&str> {
        self.default_account.as_ref().map(|a| a.username.as_str())
    }

    /// Instance half of the global default account.
    pub fn default_instance(&self) -> Option<&str> {
        self.default_account.as_ref().map(|a| a.instance.as_str())
    }

    /// Credential of the global default account.
    ///
    /// `None` when unset, or when the default was set to an account that does not exist.
    pub fn default_credential(&self) -> Option<&Credential> {
        let account = self.default_account.as_ref()?;
        self.credential_for(&account.instance, &account.username)
    }

    /// Default username for `instance`; always `None` for anonymous instances.
    pub fn default_username_for(&self, instance: &str) -> Option<&str> {
        if self.is_anonymous_for(instance) {
            return None;
        }
        self.default_accounts.get(instance).map(String::as_str)
    }

    /// Credential of the default account for `instance`.
    pub fn default_credential_for(&self, instance: &str) -> Option<&Credential> {
        let username = self.default_username_for(instance)?;
        self.credential_for(instance, username)
    }

    pub fn credential_for(&self, instance: &str, username: &str) -> Option<&Credential> {
        self.accounts.get(instance)?.get(username)
    }

    /// Usernames logged in on `instance`, in selection order.
    pub fn accounts_for(&self, instance: &str) -> Vec<&str> {
        self.accounts
            .get(instance)
            .map(|users| users.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Repair dangling defaults and fill in missing ones.
    ///
    /// 1. Per-instance defaults pointing at an unknown instance or username are dropped.
    /// 2. A global default pointing at an unknown account is cleared.
    /// 3. Every logged-in instance without a default gets its first username.
    /// 4. An empty global default becomes the first username of the first logged-in instance.
    ///
    /// "First" is map order: instances and usernames sort lexicographically.
    /// Returns whether anything changed.
    pub fn reconcile(&mut self) -> bool {
        let mut changed = false;

        let accounts = &self.accounts;
        self.default_accounts.retain(|instance, username| {
            let valid = accounts
                .get(instance)
                .is_some_and(|users| users.contains_key(username));
            if !valid {
                debug!(%instance, %username, "Dropping stale per-instance default");
                changed = true;
            }
            valid
        });

        if let Some(account) = &self.default_account
            && !account.exists_in(&self.accounts)
        {
            debug!(%account, "Clearing stale global default");
            self.default_account = None;
            changed = true;
        }

        for (instance, users) in &self.accounts {
            if self.default_accounts.contains_key(instance) {
                continue;
            }
            if let Some(username) = users.keys().next() {
                debug!(%instance, %username, "Selecting per-instance default");
                self.default_accounts
                    .insert(instance.clone(), username.clone());
                changed = true;
            }
        }

        if self.default_account.is_none() {
            let first = self.accounts.iter().find_map(|(instance, users)| {
                users
                    .keys()
                    .next()
                    .map(|username| AccountRef::new(username.as_str(), instance.as_str()))
            });
            if let Some(account) = first {
                debug!(%account, "Selecting global default");
                self.default_account = Some(account);
                changed = true;
            }
        }

        changed
    }

    /// Whether every default points at an existing account.
    pub fn defaults_are_consistent(&self) -> bool {
        let per_instance = self
            .default_accounts
            .iter()
            .all(|(instance, username)| self.credential_for(instance, username).is_some());
        let global = self
            .default_account
            .as_ref()
            .is_none_or(|account| account.exists_in(&self.accounts));
        per_instance && global
    }
}
