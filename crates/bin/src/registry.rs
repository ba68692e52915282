//! Registry construction for the CLI.

use std::{path::PathBuf, sync::Arc, time::Duration};

use fedaccounts::{
    AccountRegistry,
    remote::{LemmyClient, LemmyClientConfig},
    store::JsonFileStore,
};

use crate::cli::Cli;

const STORE_FILE: &str = "accounts.json";

/// Open the registry backed by `<data-dir>/accounts.json`, talking to instances over HTTP.
pub async fn open_registry(cli: &Cli) -> Result<AccountRegistry, Box<dyn std::error::Error>> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = data_dir.join(STORE_FILE);
    tracing::info!("Using account store at {}", path.display());

    let store = Arc::new(JsonFileStore::open(&path).await?);
    let client = Arc::new(LemmyClient::with_config(LemmyClientConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..Default::default()
    })?);

    Ok(AccountRegistry::open(store, client.clone(), client).await)
}
