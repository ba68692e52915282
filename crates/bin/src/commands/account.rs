//! Account management commands.

use fedaccounts::AccountRegistry;

use crate::output::{OutputFormat, print_table};

/// Run the `account add` command
pub async fn add(
    registry: &AccountRegistry,
    instance: &str,
    username_or_email: &str,
    password: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let username = registry
        .add_account(instance, username_or_email, password)
        .await?;
    match format {
        OutputFormat::Human => println!("Logged in as {username}@{instance}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "instance": instance, "username": username })
        ),
    }
    Ok(())
}

/// Run the `account remove` command
pub async fn remove(
    registry: &AccountRegistry,
    instance: &str,
    username: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let existed = registry.credential_for(instance, username).is_some();
    registry.remove_account(instance, username).await;
    match format {
        OutputFormat::Human if existed => println!("Removed {username}@{instance}"),
        OutputFormat::Human => println!("No account {username}@{instance}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "instance": instance, "username": username, "existed": existed })
        ),
    }
    Ok(())
}

/// Run the `account list` command
pub fn list(
    registry: &AccountRegistry,
    instance: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = registry.snapshot();
    let default_account = state.default_account.clone();

    let mut rows = Vec::new();
    for (name, users) in &state.accounts {
        if instance.is_some_and(|wanted| wanted != name) {
            continue;
        }
        for username in users.keys() {
            let instance_default = state.default_username_for(name) == Some(username.as_str());
            let global_default = default_account
                .as_ref()
                .is_some_and(|a| &a.instance == name && &a.username == username);
            rows.push((name.clone(), username.clone(), instance_default, global_default));
        }
    }

    match format {
        OutputFormat::Human => {
            if rows.is_empty() {
                println!("No accounts.");
                return Ok(());
            }
            let table: Vec<_> = rows
                .into_iter()
                .map(|(instance, username, instance_default, global_default)| {
                    let marker = match (global_default, instance_default) {
                        (true, _) => "global",
                        (false, true) => "instance",
                        (false, false) => "",
                    };
                    vec![instance, username, marker.to_string()]
                })
                .collect();
            print_table(&["INSTANCE", "USERNAME", "DEFAULT"], &table);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = rows
                .into_iter()
                .map(|(instance, username, instance_default, global_default)| {
                    serde_json::json!({
                        "instance": instance,
                        "username": username,
                        "instance_default": instance_default,
                        "global_default": global_default,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
