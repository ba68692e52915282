//! Remote collaborators of the registry.
//!
//! The registry never talks to the network itself. Logging in, resolving the canonical
//! username behind a credential, and checking that an instance exists are delegated to
//! the [`Authenticator`] and [`InstanceProbe`] traits.

use async_trait::async_trait;
use crate::account::Credential;

mod errors;
pub use errors::{AuthError, ProbeError, ProfileError};

#[cfg(feature = "http")]
mod lemmy;
#[cfg(feature = "http")]
pub use lemmy::{LemmyClient, LemmyClientConfig};

/// The authenticated user's profile, as far as the registry cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Canonical username on the instance
    pub username: String,
}

/// Issues credentials and resolves them to users.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in to `instance`, returning a credential for subsequent calls.
    async fn login(
        &self,
        instance: &str,
        username_or_email: &str,
        password: &str,
    ) -> Result<Credential, AuthError>;

    /// Fetch the profile of the user `credential` was issued to.
    async fn fetch_profile(
        &self,
        instance: &str,
        credential: &Credential,
    ) -> Result<Profile, ProfileError>;
}

/// Lightweight "does this endpoint respond" check.
#[async_trait]
pub trait InstanceProbe: Send + Sync {
    async fn probe(&self, instance: &str) -> Result<(), ProbeError>;
}
