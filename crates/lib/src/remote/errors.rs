//! Error types for remote collaborator calls.

use thiserror::Error;

/// Failure of a login call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// The instance refused the credentials.
    #[error("Login rejected: {reason}")]
    Rejected { reason: String },

    /// The instance accepted the login but returned no token (e.g. pending email verification).
    #[error("Login succeeded but no token was issued")]
    MissingToken,

    /// The request never produced a usable response.
    #[error("Login request failed: {reason}")]
    Transport { reason: String },
}

/// Failure to fetch the authenticated user's profile.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The instance did not recognise the credential as a logged-in user.
    #[error("Credential does not identify a logged-in user")]
    NotLoggedIn,

    /// The instance answered with an error status.
    #[error("Profile request rejected: {reason}")]
    Rejected { reason: String },

    /// The request never produced a usable response.
    #[error("Profile request failed: {reason}")]
    Transport { reason: String },
}

/// Failure of the instance-existence probe.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The endpoint could not be reached at all.
    #[error("Instance unreachable: {reason}")]
    Unreachable { reason: String },

    /// The endpoint answered, but not like an instance.
    #[error("Instance returned HTTP status {status}")]
    BadStatus { status: u16 },

    /// The instance string cannot be turned into a URL.
    #[error("Invalid instance URL '{instance}'")]
    InvalidUrl { instance: String },
}
