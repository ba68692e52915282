//! Instance management commands.

use fedaccounts::AccountRegistry;

use crate::output::{OutputFormat, or_dash, print_table};

/// Run the `instance add` command
pub async fn add(
    registry: &AccountRegistry,
    url: &str,
    skip_probe: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    registry.add_instance(url, skip_probe).await?;
    match format {
        OutputFormat::Human => println!("Added instance {url}"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "added": url })),
    }
    Ok(())
}

/// Run the `instance remove` command
pub async fn remove(
    registry: &AccountRegistry,
    url: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let existed = registry.instances().contains(url);
    registry.remove_instance(url).await;
    match format {
        OutputFormat::Human if existed => println!("Removed instance {url}"),
        OutputFormat::Human => println!("Instance {url} was not added"),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "removed": url, "existed": existed }))
        }
    }
    Ok(())
}

/// Run the `instance list` command
pub fn list(
    registry: &AccountRegistry,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = registry.snapshot();

    match format {
        OutputFormat::Human => {
            if state.accounts.is_empty() {
                println!("No instances added.");
                return Ok(());
            }
            let rows: Vec<_> = state
                .accounts
                .iter()
                .map(|(instance, users)| {
                    vec![
                        instance.clone(),
                        users.len().to_string(),
                        or_dash(state.default_username_for(instance)),
                    ]
                })
                .collect();
            print_table(&["INSTANCE", "ACCOUNTS", "DEFAULT"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = state
                .accounts
                .iter()
                .map(|(instance, users)| {
                    serde_json::json!({
                        "instance": instance,
                        "accounts": users.len(),
                        "default": state.default_username_for(instance),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
