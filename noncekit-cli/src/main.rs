//! Developer CLI for noncekit.
//!
//! Drives a single in-memory [`NonceStore`] for manual exploration. Nothing
//! outlives the process: every run starts with a fresh store and salt.

mod shell;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use noncekit_core::{NonceConfig, NonceStore};
use tracing_subscriber::EnvFilter;

/// Longest sleep the demo is willing to do.
const MAX_DEMO_WAIT: Duration = Duration::from_secs(10);

/// Issue and validate single-use nonces against an in-memory store.
#[derive(Debug, Parser)]
#[command(name = "noncekit", version)]
struct Cli {
    /// JSON file with store settings (`expiration_ms`, `sweep_multiplier`, `salt_len`).
    #[arg(long, env = "NONCEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Token lifetime in milliseconds, overrides the config file.
    #[arg(long, env = "NONCEKIT_EXPIRATION_MS")]
    expiration_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Walk a token through issue, peek, consume, expiry and reclamation.
    Demo {
        /// Action label the demo tokens are bound to.
        #[arg(long, default_value = "test")]
        action: String,
    },
    /// Read commands from stdin against one live store.
    Shell,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let store = NonceStore::with_config(&config).wrap_err("failed to create nonce store")?;

    match cli.command {
        Command::Demo { action } => {
            demo(&store, &action);
            Ok(())
        }
        Command::Shell => shell::run(&store, std::io::stdin().lock(), std::io::stdout()),
    }
}

fn load_config(cli: &Cli) -> Result<NonceConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .wrap_err_with(|| format!("invalid config in {}", path.display()))?
        }
        None => NonceConfig::default(),
    };
    if let Some(expiration_ms) = cli.expiration_ms {
        config.expiration_ms = expiration_ms;
    }
    config.validate()?;
    Ok(config)
}

fn demo(store: &NonceStore, action: &str) {
    let expiration = store.expiration();
    tracing::info!(?expiration, "starting demo");

    println!("consume(empty)        = {}", store.consume(b"", action));
    let token = store.issue(action);
    println!("issue                 = {}", token.to_hex());
    println!("peek                  = {}", store.peek(token, action));
    println!("peek again            = {}", store.peek(token, action));
    println!("consume wrong action  = {}", store.consume(token, "not-the-action"));
    println!("consume               = {}", store.consume(token, action));
    println!("consume again         = {}", store.consume(token, action));

    if expiration > MAX_DEMO_WAIT {
        println!("expiration {expiration:?} too long to wait for, rerun with --expiration-ms");
        return;
    }
    let token = store.issue(action);
    println!("issue                 = {}", token.to_hex());
    thread::sleep(expiration + Duration::from_millis(1));
    println!("consume after expiry  = {}", store.consume(token, action));
    println!("entries held          = {}", store.len());

    let wait = store.sweep_interval() + Duration::from_millis(50);
    if wait > MAX_DEMO_WAIT {
        println!("sweep interval {:?} too long to wait for, sweeping now", store.sweep_interval());
        println!("reclaimed             = {}", store.reclaim_expired());
    } else {
        thread::sleep(wait);
    }
    println!("entries held          = {}", store.len());
}
