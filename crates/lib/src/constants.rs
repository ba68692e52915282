//! Constants shared across the fedaccounts crate.

/// Store key holding the account table (`instance -> username -> credential`).
pub const TOKENS_KEY: &str = "tokens";

/// Store key holding the global default account (`"username@instance"`).
pub const DEFAULT_ACCOUNT_KEY: &str = "defaultAccount";

/// Store key holding the per-instance default usernames (`instance -> username`).
pub const DEFAULT_ACCOUNTS_KEY: &str = "defaultAccounts";

/// Separator between username and instance in a global default account reference.
pub const ACCOUNT_SEPARATOR: char = '@';
