//! Headless wallet view shell
//!
//! Loads configuration, drives a scripted session against the in-memory
//! wallet model and prints every signal the coordinator publishes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wallet_view::config::CoordinatorConfig;

mod session;

#[derive(Parser)]
#[command(name = "wallet-host")]
#[command(about = "Headless shell for the wallet view coordinator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override a config value, e.g. `--set display.unit=milli`
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and print the signals
    Demo {
        /// Passphrase used to encrypt the demo wallet
        #[arg(long, default_value = "correct horse battery")]
        passphrase: String,

        /// Where the demo backup is written
        #[arg(long)]
        backup: Option<PathBuf>,

        /// Print signals as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,

    /// Check an address against the configured network
    Address {
        /// Address to check
        address: String,
    },
}

fn load_config(path: Option<&Path>, overrides: &[String]) -> Result<CoordinatorConfig> {
    let mut config = match path {
        Some(path) => CoordinatorConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CoordinatorConfig::default(),
    };
    config.merge_with_env()?;
    for entry in overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("override {entry:?} is not KEY=VALUE"))?;
        config.set_from_string(key.trim(), value)?;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let config = load_config(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Commands::Demo {
            passphrase,
            backup,
            json,
        } => {
            let backup =
                backup.unwrap_or_else(|| std::env::temp_dir().join("wallet-view-demo.bak"));
            session::run(config, &passphrase, backup, json).await?;
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Address { address } => {
            let valid = config.network.address_format().is_valid(&address);
            println!("{address}: {}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
