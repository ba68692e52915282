//! Persistence of registry state to a [`DurableStore`].
//!
//! State is spread over three keys (see [`crate::constants`]):
//!
//! - `tokens`: `{ instance: { username: { "raw": token } } }`
//! - `defaultAccounts`: `{ instance: username }`
//! - `defaultAccount`: `"username@instance"`, or `""` when unset
//!
//! Loading is lenient: a missing, unreadable, or malformed key (or entry inside a key)
//! loads as empty and is logged. Unreadable keys are reported separately from malformed
//! ones, since the stored data may still be intact. Saving goes through a single background writer task so
//! writes land in the order the mutations produced them.

use std::{collections::BTreeMap, sync::Arc};

use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use super::RegistryState;
use crate::{
    account::{AccountRef, AccountTable, Credential, DefaultAccounts},
    constants::{DEFAULT_ACCOUNT_KEY, DEFAULT_ACCOUNTS_KEY, TOKENS_KEY},
    store::{DurableStore, StoreError},
};

/// Result of [`load`].
#[derive(Debug, Default)]
pub(crate) struct Loaded {
    pub state: RegistryState,
    /// Whether anything stored had to be discarded while loading.
    pub discarded: bool,
    /// Whether any key could not be read at all.
    pub read_failed: bool,
}

/// What went wrong while loading, if anything.
#[derive(Debug, Default)]
struct LoadIssues {
    discarded: bool,
    read_failed: bool,
}

/// Read a key and parse it as JSON, treating every failure as absent.
async fn read_json<T: DeserializeOwned>(
    store: &dyn DurableStore,
    key: &str,
    issues: &mut LoadIssues,
) -> Option<T> {
    let raw = match store.get_string(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored key, treating as empty");
            issues.read_failed = true;
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Malformed stored key, treating as empty");
            issues.discarded = true;
            None
        }
    }
}

fn parse_tokens(
    raw: BTreeMap<String, serde_json::Value>,
    discarded: &mut bool,
) -> AccountTable {
    let mut accounts = AccountTable::new();
    for (instance, users) in raw {
        let users: BTreeMap<String, serde_json::Value> = match serde_json::from_value(users) {
            Ok(users) => users,
            Err(e) => {
                warn!(%instance, error = %e, "Malformed account map, treating as empty");
                *discarded = true;
                BTreeMap::new()
            }
        };
        let credentials = accounts.entry(instance.clone()).or_default();
        for (username, credential) in users {
            match serde_json::from_value::<Credential>(credential) {
                Ok(credential) => {
                    credentials.insert(username, credential);
                }
                Err(e) => {
                    warn!(%instance, %username, error = %e, "Malformed credential, dropping account");
                    *discarded = true;
                }
            }
        }
    }
    accounts
}

fn parse_default_accounts(
    raw: BTreeMap<String, serde_json::Value>,
    discarded: &mut bool,
) -> DefaultAccounts {
    raw.into_iter()
        .filter_map(|(instance, username)| match username {
            serde_json::Value::String(username) => Some((instance, username)),
            other => {
                warn!(%instance, value = %other, "Malformed per-instance default, dropping");
                *discarded = true;
                None
            }
        })
        .collect()
}

fn parse_default_account(raw: String, discarded: &mut bool) -> Option<AccountRef> {
    if raw.is_empty() {
        return None;
    }
    let account = AccountRef::parse(&raw);
    if account.is_none() {
        warn!(value = %raw, "Malformed default account, treating as unset");
        *discarded = true;
    }
    account
}

/// Load registry state from `store`. Never fails.
pub(crate) async fn load(store: &dyn DurableStore) -> Loaded {
    let mut issues = LoadIssues::default();

    let accounts = read_json(store, TOKENS_KEY, &mut issues)
        .await
        .map(|raw| parse_tokens(raw, &mut issues.discarded))
        .unwrap_or_default();
    let default_accounts = read_json(store, DEFAULT_ACCOUNTS_KEY, &mut issues)
        .await
        .map(|raw| parse_default_accounts(raw, &mut issues.discarded))
        .unwrap_or_default();
    let default_account = read_json::<String>(store, DEFAULT_ACCOUNT_KEY, &mut issues)
        .await
        .and_then(|raw| parse_default_account(raw, &mut issues.discarded));

    debug!(
        instances = accounts.len(),
        discarded = issues.discarded,
        read_failed = issues.read_failed,
        "Loaded registry state"
    );

    Loaded {
        state: RegistryState {
            accounts,
            default_accounts,
            default_account,
        },
        discarded: issues.discarded,
        read_failed: issues.read_failed,
    }
}

/// Write the full registry state to `store`.
pub(crate) async fn save(store: &dyn DurableStore, state: &RegistryState) -> Result<(), StoreError> {
    let serialize = |e| StoreError::SerializationFailed { source: e };

    let tokens = serde_json::to_string(&state.accounts).map_err(serialize)?;
    let default_accounts = serde_json::to_string(&state.default_accounts).map_err(serialize)?;
    let default_account = serde_json::to_string(
        &state
            .default_account
            .as_ref()
            .map(AccountRef::to_string)
            .unwrap_or_default(),
    )
    .map_err(serialize)?;

    store.set_string(TOKENS_KEY, &tokens).await?;
    store
        .set_string(DEFAULT_ACCOUNTS_KEY, &default_accounts)
        .await?;
    store.set_string(DEFAULT_ACCOUNT_KEY, &default_account).await
}

/// Commands handled by the writer task.
enum PersistCommand {
    /// Write this snapshot
    Save(Box<RegistryState>),
    /// Reply once every earlier command has been handled
    Flush { done: oneshot::Sender<()> },
}

/// Handle to the background writer task.
///
/// The task exits once every handle has been dropped and the queue is drained.
#[derive(Clone, Debug)]
pub(crate) struct Persister {
    commands: mpsc::UnboundedSender<PersistCommand>,
}

impl Persister {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn DurableStore>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        Self { commands }
    }

    /// Queue a snapshot for writing without waiting for it.
    pub fn enqueue(&self, state: RegistryState) {
        if self
            .commands
            .send(PersistCommand::Save(Box::new(state)))
            .is_err()
        {
            error!("Registry writer task is gone, state not persisted");
        }
    }

    /// Wait until every snapshot queued before this call has been written (or failed).
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(PersistCommand::Flush { done }).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_writer(store: Arc<dyn DurableStore>, mut rx: mpsc::UnboundedReceiver<PersistCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Save(state) => match save(store.as_ref(), &state).await {
                Ok(()) => debug!("Persisted registry state"),
                Err(e) => error!(error = %e, "Failed to persist registry state"),
            },
            PersistCommand::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    debug!("Registry writer stopped");
}
