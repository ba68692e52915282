use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod registry;

use cli::{AccountCommand, Cli, Commands, DefaultCommand, InstanceCommand};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable with --format json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fedaccounts=warn".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry::open_registry(cli).await?;
    let format = cli.format;

    let result = match &cli.command {
        Commands::Instance(command) => match command {
            InstanceCommand::Add { url, skip_probe } => {
                commands::instance::add(&registry, url, *skip_probe, format).await
            }
            InstanceCommand::Remove { url } => {
                commands::instance::remove(&registry, url, format).await
            }
            InstanceCommand::List => commands::instance::list(&registry, format),
        },
        Commands::Account(command) => match command {
            AccountCommand::Add {
                instance,
                username_or_email,
                password,
            } => {
                commands::account::add(&registry, instance, username_or_email, password, format)
                    .await
            }
            AccountCommand::Remove { instance, username } => {
                commands::account::remove(&registry, instance, username, format).await
            }
            AccountCommand::List { instance } => {
                commands::account::list(&registry, instance.as_deref(), format)
            }
        },
        Commands::Default(command) => match command {
            DefaultCommand::Show => commands::default::show(&registry, format),
            DefaultCommand::Set { account } => {
                commands::default::set(&registry, account, format).await
            }
            DefaultCommand::SetFor { instance, username } => {
                commands::default::set_for(&registry, instance, username, format).await
            }
        },
    };

    // Writes are queued in the background; wait for them before exiting.
    registry.flush().await;
    result
}
