//!
//! fedaccounts: the set of accounts a client can act as across many federated instances.
//!
//! ## Core Concepts
//!
//! * **Instances**: backend endpoints identified by their base URL. An instance is "added"
//!   once it appears in the account table, even before any account has logged in to it.
//! * **Accounts (`account::AccountRef`)**: a `(instance, username)` pair holding an opaque
//!   [`Credential`] obtained from a login call.
//! * **Defaults**: a per-instance default username and a single global default account
//!   (`username@instance`), used when an operation does not name an account explicitly.
//! * **Registry (`registry::AccountRegistry`)**: owns all of the above. Every structural
//!   mutation is followed by a reconciliation pass that repairs dangling defaults and
//!   back-fills missing ones, and then by a persistence write to a [`store::DurableStore`].
//! * **Collaborators (`remote`)**: the [`remote::Authenticator`] and [`remote::InstanceProbe`]
//!   traits the registry calls out to. With the "http" feature, [`remote::LemmyClient`]
//!   implements both over the Lemmy v3 HTTP API.

pub mod account;
pub mod constants;
pub mod registry;
pub mod remote;
pub mod store;

pub use account::{AccountRef, Credential};
pub use registry::{AccountRegistry, RegistryState};

/// Result type used throughout the fedaccounts library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the fedaccounts library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured registry errors from the registry module
    #[error(transparent)]
    Registry(registry::RegistryError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Registry(_) => "registry",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates an instance was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error came from a remote collaborator (probe, login, profile).
    pub fn is_remote_error(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_remote_error(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is storage-related.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }
}
