//! Error types for registry mutations.

use thiserror::Error;

use crate::remote::{AuthError, ProbeError, ProfileError};

/// Errors surfaced by [`AccountRegistry`](super::AccountRegistry) mutations.
///
/// None of these are retried internally. A failed mutation leaves the registry state
/// exactly as it was before the call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The instance has already been added.
    #[error("Instance already added: {instance}")]
    DuplicateInstance {
        /// The instance URL
        instance: String,
    },

    /// The instance probe failed.
    #[error("Instance unreachable: {instance}")]
    UnreachableInstance {
        /// The instance URL
        instance: String,
        /// The probe failure
        #[source]
        source: ProbeError,
    },

    /// The instance has not been added.
    #[error("Unknown instance: {instance}")]
    UnknownInstance {
        /// The instance URL
        instance: String,
    },

    /// The login call failed.
    #[error("Login to {instance} failed")]
    Auth {
        /// The instance URL
        instance: String,
        /// The authenticator's failure, unchanged
        #[source]
        source: AuthError,
    },

    /// The profile fetch after a successful login failed.
    #[error("Fetching profile from {instance} failed")]
    Profile {
        /// The instance URL
        instance: String,
        /// The authenticator's failure, unchanged
        #[source]
        source: ProfileError,
    },
}

impl RegistryError {
    /// Check if this error indicates the instance was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::UnknownInstance { .. })
    }

    /// Check if this error indicates the instance already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RegistryError::DuplicateInstance { .. })
    }

    /// Check if this error came from a remote collaborator.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            RegistryError::UnreachableInstance { .. }
                | RegistryError::Auth { .. }
                | RegistryError::Profile { .. }
        )
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            RegistryError::Auth { .. } | RegistryError::Profile { .. }
        )
    }

    /// The instance URL the failed operation targeted.
    pub fn instance(&self) -> &str {
        match self {
            RegistryError::DuplicateInstance { instance }
            | RegistryError::UnreachableInstance { instance, .. }
            | RegistryError::UnknownInstance { instance }
            | RegistryError::Auth { instance, .. }
            | RegistryError::Profile { instance, .. } => instance,
        }
    }
}

impl From<RegistryError> for crate::Error {
    fn from(err: RegistryError) -> Self {
        crate::Error::Registry(err)
    }
}
