//! Default account commands.

use fedaccounts::{AccountRef, AccountRegistry};

use crate::output::{OutputFormat, or_dash, print_table};

/// Run the `default show` command
pub fn show(
    registry: &AccountRegistry,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = registry.snapshot();
    let global = state.default_account.as_ref().map(AccountRef::to_string);

    match format {
        OutputFormat::Human => {
            println!("Global default: {}", or_dash(global.as_deref()));
            let rows: Vec<_> = state
                .logged_in_instances()
                .into_iter()
                .map(|instance| {
                    let username = or_dash(state.default_username_for(&instance));
                    vec![instance, username]
                })
                .collect();
            print_table(&["INSTANCE", "DEFAULT"], &rows);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "default_account": global,
                "default_accounts": state.default_accounts,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

/// Run the `default set` command
pub async fn set(
    registry: &AccountRegistry,
    account: &AccountRef,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    warn_if_missing(registry, &account.instance, &account.username);
    registry
        .set_default_account(&account.instance, &account.username)
        .await;
    match format {
        OutputFormat::Human => println!("Global default set to {account}"),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "default_account": account.to_string() }))
        }
    }
    Ok(())
}

/// Run the `default set-for` command
pub async fn set_for(
    registry: &AccountRegistry,
    instance: &str,
    username: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    warn_if_missing(registry, instance, username);
    registry.set_default_account_for(instance, username).await;
    match format {
        OutputFormat::Human => println!("Default for {instance} set to {username}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "instance": instance, "default": username })
        ),
    }
    Ok(())
}

/// Defaults are not validated when set; tell the user when this one will be dropped.
fn warn_if_missing(registry: &AccountRegistry, instance: &str, username: &str) {
    if registry.credential_for(instance, username).is_none() {
        eprintln!(
            "warning: no account {username}@{instance}; the default will be replaced on the next change"
        );
    }
}
