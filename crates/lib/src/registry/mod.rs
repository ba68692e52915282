//!
//! Provides the [`AccountRegistry`], the owner of all account, instance, and default
//! account state.
//!
//! Every mutation runs the same pipeline: mutate, reconcile (for structural changes to
//! the account table), then queue a full persistence write. Queries read a snapshot and
//! never wait on a mutation in progress.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use handle_trait::Handle;
use tracing::{info, instrument, warn};

use crate::{
    Result,
    account::{AccountRef, Credential},
    remote::{Authenticator, InstanceProbe},
    store::DurableStore,
};

pub mod errors;
mod persistence;
mod state;

pub use errors::RegistryError;
use persistence::{Loaded, Persister};
pub use state::RegistryState;

/// Internal state for AccountRegistry
///
/// AccountRegistry itself is just a cheap-to-clone handle wrapping Arc<RegistryInner>.
struct RegistryInner {
    /// Current state. Never held across an await point.
    state: Mutex<RegistryState>,
    /// Held for the whole of each mutation, collaborator calls included.
    mutation: tokio::sync::Mutex<()>,
    authenticator: Arc<dyn Authenticator>,
    probe: Arc<dyn InstanceProbe>,
    persister: Persister,
}

impl std::fmt::Debug for RegistryInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RegistryInner")
            .field("instances", &state.accounts.len())
            .field("default_account", &state.default_account)
            .field("authenticator", &"<Authenticator>")
            .field("probe", &"<InstanceProbe>")
            .field("persister", &self.persister)
            .finish()
    }
}

/// The set of accounts a client can act as, across instances.
///
/// Construct once at startup with [`AccountRegistry::open`] and share the handle.
/// Mutations are serialized; each one reconciles defaults (when the account table
/// changed) and queues exactly one persistence write. Writes are applied in order by a
/// background task; call [`flush`](Self::flush) to wait for them.
///
/// ## Example
///
/// ```
/// # use std::sync::Arc;
/// # use async_trait::async_trait;
/// # use fedaccounts::{AccountRegistry, Credential, remote::*, store::MemoryStore};
/// # struct Offline;
/// # #[async_trait]
/// # impl Authenticator for Offline {
/// #     async fn login(&self, _: &str, user: &str, _: &str) -> Result<Credential, AuthError> {
/// #         Ok(Credential::new(format!("jwt-{user}")))
/// #     }
/// #     async fn fetch_profile(&self, _: &str, c: &Credential) -> Result<Profile, ProfileError> {
/// #         Ok(Profile { username: c.as_str().trim_start_matches("jwt-").to_string() })
/// #     }
/// # }
/// # #[async_trait]
/// # impl InstanceProbe for Offline {
/// #     async fn probe(&self, _: &str) -> Result<(), ProbeError> { Ok(()) }
/// # }
/// # #[tokio::main]
/// # async fn main() -> fedaccounts::Result<()> {
/// let offline = Arc::new(Offline);
/// let registry =
///     AccountRegistry::open(Arc::new(MemoryStore::new()), offline.clone(), offline).await;
///
/// registry.add_instance("lemmy.ml", false).await?;
/// registry.add_account("lemmy.ml", "alice", "hunter2").await?;
///
/// assert_eq!(registry.default_username().as_deref(), Some("alice"));
/// assert_eq!(registry.default_username_for("lemmy.ml").as_deref(), Some("alice"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct AccountRegistry {
    inner: Arc<RegistryInner>,
}

impl AccountRegistry {
    /// Load state from `store` and start the registry.
    ///
    /// Loading never fails: missing, malformed, or unreadable stored data loads as empty.
    /// The loaded state is reconciled before it becomes visible, and written back if loading
    /// or reconciliation had to change anything. Nothing is written back when a key could
    /// not be read.
    ///
    /// Must be called from within a tokio runtime; the persistence writer is spawned on it.
    pub async fn open(
        store: Arc<dyn DurableStore>,
        authenticator: Arc<dyn Authenticator>,
        probe: Arc<dyn InstanceProbe>,
    ) -> Self {
        let Loaded {
            mut state,
            discarded,
            read_failed,
        } = persistence::load(store.as_ref()).await;
        let repaired = state.reconcile();

        let persister = Persister::spawn(store);
        if read_failed {
            warn!("Store could not be fully read, not writing back loaded state");
        } else if discarded || repaired {
            persister.enqueue(state.clone());
        }
        info!(
            instances = state.accounts.len(),
            default_account = ?state.default_account.as_ref().map(AccountRef::to_string),
            "Opened account registry"
        );

        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(state),
                mutation: tokio::sync::Mutex::new(()),
                authenticator,
                probe,
                persister,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&RegistryState) -> R) -> R {
        f(&self.lock_state())
    }

    /// Apply `mutate`, reconcile if the account table changed, then queue a write.
    fn commit(&self, structural: bool, mutate: impl FnOnce(&mut RegistryState)) {
        let mut state = self.lock_state();
        mutate(&mut state);
        if structural {
            state.reconcile();
        }
        self.inner.persister.enqueue(state.clone());
    }

    // === Mutations ===

    /// Add an instance with no accounts.
    ///
    /// Unless `skip_probe` is set, the instance must answer the probe first.
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateInstance`] if the instance was already added
    /// - [`RegistryError::UnreachableInstance`] if the probe fails
    #[instrument(skip(self))]
    pub async fn add_instance(&self, instance: &str, skip_probe: bool) -> Result<()> {
        let _gate = self.inner.mutation.lock().await;

        if self.read(|state| state.accounts.contains_key(instance)) {
            return Err(RegistryError::DuplicateInstance {
                instance: instance.to_string(),
            }
            .into());
        }

        if !skip_probe {
            self.inner.probe.probe(instance).await.map_err(|source| {
                RegistryError::UnreachableInstance {
                    instance: instance.to_string(),
                    source,
                }
            })?;
        }

        self.commit(true, |state| {
            state.accounts.insert(instance.to_string(), BTreeMap::new());
        });
        info!("Added instance");
        Ok(())
    }

    /// Remove an instance and all of its accounts. Removing an unknown instance is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_instance(&self, instance: &str) {
        let _gate = self.inner.mutation.lock().await;
        self.commit(true, |state| {
            if state.accounts.remove(instance).is_some() {
                info!("Removed instance");
            }
        });
    }

    /// Log in to `instance` and store the resulting credential.
    ///
    /// The account is stored under the canonical username reported by the instance,
    /// which may differ from `username_or_email`. An existing credential for that
    /// username is replaced. Returns the canonical username.
    ///
    /// # Errors
    /// - [`RegistryError::UnknownInstance`] if the instance was not added
    /// - [`RegistryError::Auth`] if the login call fails
    /// - [`RegistryError::Profile`] if the profile fetch fails
    #[instrument(skip(self, password))]
    pub async fn add_account(
        &self,
        instance: &str,
        username_or_email: &str,
        password: &str,
    ) -> Result<String> {
        let _gate = self.inner.mutation.lock().await;

        if !self.read(|state| state.accounts.contains_key(instance)) {
            return Err(RegistryError::UnknownInstance {
                instance: instance.to_string(),
            }
            .into());
        }

        let credential = self
            .inner
            .authenticator
            .login(instance, username_or_email, password)
            .await
            .map_err(|source| RegistryError::Auth {
                instance: instance.to_string(),
                source,
            })?;

        let profile = self
            .inner
            .authenticator
            .fetch_profile(instance, &credential)
            .await
            .map_err(|source| RegistryError::Profile {
                instance: instance.to_string(),
                source,
            })?;

        let username = profile.username;
        self.commit(true, |state| {
            state
                .accounts
                .entry(instance.to_string())
                .or_default()
                .insert(username.clone(), credential);
        });
        info!(%username, "Added account");
        Ok(username)
    }

    /// Forget an account. Removing an unknown account is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_account(&self, instance: &str, username: &str) {
        let _gate = self.inner.mutation.lock().await;
        self.commit(true, |state| {
            if let Some(users) = state.accounts.get_mut(instance)
                && users.remove(username).is_some()
            {
                info!("Removed account");
            }
        });
    }

    /// Set the global default account.
    ///
    /// The account is not checked for existence here; a reference to a missing account
    /// resolves to no credential and is repaired by the next structural mutation.
    #[instrument(skip(self))]
    pub async fn set_default_account(&self, instance: &str, username: &str) {
        let _gate = self.inner.mutation.lock().await;
        self.commit(false, |state| {
            state.default_account = Some(AccountRef::new(username, instance));
        });
    }

    /// Set the default account for one instance. Not checked for existence, as with
    /// [`set_default_account`](Self::set_default_account).
    #[instrument(skip(self))]
    pub async fn set_default_account_for(&self, instance: &str, username: &str) {
        let _gate = self.inner.mutation.lock().await;
        self.commit(false, |state| {
            state
                .default_accounts
                .insert(instance.to_string(), username.to_string());
        });
    }

    /// Wait until every write queued so far has been applied to the store.
    ///
    /// Write failures are logged by the writer, not returned here.
    pub async fn flush(&self) {
        self.inner.persister.flush().await;
    }

    // === Queries ===

    /// Copy of the current state.
    pub fn snapshot(&self) -> RegistryState {
        self.read(RegistryState::clone)
    }

    pub fn is_anonymous_for(&self, instance: &str) -> bool {
        self.read(|state| state.is_anonymous_for(instance))
    }

    pub fn instances(&self) -> BTreeSet<String> {
        self.read(RegistryState::instances)
    }

    pub fn logged_in_instances(&self) -> BTreeSet<String> {
        self.read(RegistryState::logged_in_instances)
    }

    pub fn has_any_account(&self) -> bool {
        self.read(RegistryState::has_any_account)
    }

    pub fn default_account(&self) -> Option<AccountRef> {
        self.read(|state| state.default_account.clone())
    }

    pub fn default_username(&self) -> Option<String> {
        self.read(|state| state.default_username().map(str::to_string))
    }

    pub fn default_instance(&self) -> Option<String> {
        self.read(|state| state.default_instance().map(str::to_string))
    }

    pub fn default_credential(&self) -> Option<Credential> {
        self.read(|state| state.default_credential().cloned())
    }

    pub fn default_username_for(&self, instance: &str) -> Option<String> {
        self.read(|state| state.default_username_for(instance).map(str::to_string))
    }

    pub fn default_credential_for(&self, instance: &str) -> Option<Credential> {
        self.read(|state| state.default_credential_for(instance).cloned())
    }

    pub fn credential_for(&self, instance: &str, username: &str) -> Option<Credential> {
        self.read(|state| state.credential_for(instance, username).cloned())
    }

    pub fn accounts_for(&self, instance: &str) -> Vec<String> {
        self.read(|state| {
            state
                .accounts_for(instance)
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }
}
