//! HTTP implementation of the remote collaborators for the Lemmy v3 API.
//!
//! Endpoints used:
//! - `GET  /api/v3/site`        probe, and profile lookup with a bearer token
//! - `POST /api/v3/user/login`  login

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{AuthError, Authenticator, InstanceProbe, ProbeError, Profile, ProfileError};
use crate::account::Credential;

const SITE_PATH: &str = "api/v3/site";
const LOGIN_PATH: &str = "api/v3/user/login";

/// Settings for [`LemmyClient`].
#[derive(Clone, Debug)]
pub struct LemmyClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for LemmyClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("fedaccounts/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticator and instance probe talking to Lemmy instances over HTTP.
///
/// Instances given without a scheme (`lemmy.ml`) are reached over `https://`.
#[derive(Clone, Debug)]
pub struct LemmyClient {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    jwt: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
struct SiteResponse {
    my_user: Option<MyUser>,
}

#[derive(Deserialize)]
struct MyUser {
    local_user_view: LocalUserView,
}

#[derive(Deserialize)]
struct LocalUserView {
    person: Person,
}

#[derive(Deserialize)]
struct Person {
    name: String,
}

impl LemmyClient {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_config(LemmyClientConfig::default())
    }

    pub fn with_config(config: LemmyClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Resolve `path` against the base URL of `instance`.
    pub fn endpoint(instance: &str, path: &str) -> Option<Url> {
        let base = match Url::parse(instance) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => Url::parse(&format!("https://{instance}")).ok()?,
        };
        let base = format!("{}/", base.as_str().trim_end_matches('/'));
        Url::parse(&base).ok()?.join(path).ok()
    }

    /// Extract the `error` field of a failed response, falling back to the status.
    async fn rejection_reason(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP status {status}"),
        }
    }
}

#[async_trait]
impl InstanceProbe for LemmyClient {
    #[instrument(skip(self))]
    async fn probe(&self, instance: &str) -> Result<(), ProbeError> {
        let url = Self::endpoint(instance, SITE_PATH).ok_or_else(|| ProbeError::InvalidUrl {
            instance: instance.to_string(),
        })?;

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ProbeError::Unreachable {
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(ProbeError::BadStatus {
                status: response.status().as_u16(),
            });
        }
        debug!("Instance responded");
        Ok(())
    }
}

#[async_trait]
impl Authenticator for LemmyClient {
    #[instrument(skip(self, password))]
    async fn login(
        &self,
        instance: &str,
        username_or_email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let url = Self::endpoint(instance, LOGIN_PATH).ok_or_else(|| AuthError::Transport {
            reason: format!("invalid instance URL '{instance}'"),
        })?;

        let response = self
            .client
            .post(url)
            .json(&LoginRequest {
                username_or_email,
                password,
            })
            .send()
            .await
            .map_err(|e| AuthError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected {
                reason: Self::rejection_reason(response).await,
            });
        }

        let body: LoginResponse = response.json().await.map_err(|e| AuthError::Transport {
            reason: format!("Failed to parse response: {e}"),
        })?;

        match body.jwt {
            Some(jwt) if !jwt.is_empty() => Ok(Credential::new(jwt)),
            _ => Err(AuthError::MissingToken),
        }
    }

    #[instrument(skip(self, credential))]
    async fn fetch_profile(
        &self,
        instance: &str,
        credential: &Credential,
    ) -> Result<Profile, ProfileError> {
        let url = Self::endpoint(instance, SITE_PATH).ok_or_else(|| ProfileError::Transport {
            reason: format!("invalid instance URL '{instance}'"),
        })?;

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.as_str())
            .send()
            .await
            .map_err(|e| ProfileError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProfileError::Rejected {
                reason: Self::rejection_reason(response).await,
            });
        }

        let body: SiteResponse = response
            .json()
            .await
            .map_err(|e| ProfileError::Transport {
                reason: format!("Failed to parse response: {e}"),
            })?;

        body.my_user
            .map(|user| Profile {
                username: user.local_user_view.person.name,
            })
            .ok_or(ProfileError::NotLoggedIn)
    }
}
