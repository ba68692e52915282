//! CLI argument definitions for the fedaccounts binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fedaccounts::AccountRef;

use crate::output::OutputFormat;

/// Manage accounts across federated instances
#[derive(Parser, Debug)]
#[command(name = "fedaccounts")]
#[command(about = "fedaccounts: accounts and default accounts across federated instances")]
#[command(version)]
pub struct Cli {
    /// Directory holding accounts.json
    #[arg(short = 'D', long, global = true, env = "FEDACCOUNTS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 10, env = "FEDACCOUNTS_TIMEOUT")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add, remove, and list instances
    #[command(subcommand)]
    Instance(InstanceCommand),
    /// Log in, log out, and list accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Show or change default accounts
    #[command(subcommand)]
    Default(DefaultCommand),
}

#[derive(Subcommand, Debug)]
pub enum InstanceCommand {
    /// Add an instance
    Add {
        /// Instance URL, e.g. lemmy.ml
        url: String,
        /// Add without checking that the instance responds
        #[arg(long)]
        skip_probe: bool,
    },
    /// Remove an instance and all of its accounts
    Remove { url: String },
    /// List instances
    List,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Log in to an instance
    Add {
        instance: String,
        username_or_email: String,
        #[arg(long, env = "FEDACCOUNTS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget an account
    Remove { instance: String, username: String },
    /// List accounts, optionally for one instance
    List { instance: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum DefaultCommand {
    /// Show the global default and every per-instance default
    Show,
    /// Set the global default account
    Set {
        /// Account as username@instance
        account: AccountRef,
    },
    /// Set the default account for one instance
    SetFor { instance: String, username: String },
}
