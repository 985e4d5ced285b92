/*
[INPUT]:  CLI arguments, YAML configuration file, wallet key from the environment
[OUTPUT]: Restored, created or cleared delegated session and a JSON status report
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use delegate_bridge_cli::{AppConfig, StatusReport, login_with_key, logout, restore};
use delegate_bridge_core::{Chain, FileStorage, KeyValueStorage};

#[derive(Parser, Debug)]
#[command(name = "delegate-bridge", version, about = "Wallet sign-in to delegated session bridge")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore the persisted session and print its state
    Status,
    /// Sign in with a wallet key read from an environment variable
    Login {
        #[arg(long = "key-env", value_name = "VAR")]
        key_env: String,
        #[arg(long = "chain", value_enum)]
        chain: Option<ChainArg>,
    },
    /// Remove the persisted session
    Logout,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ChainArg {
    Ethereum,
    Solana,
}

impl From<ChainArg> for Chain {
    fn from(arg: ChainArg) -> Self {
        match arg {
            ChainArg::Ethereum => Chain::Ethereum,
            ChainArg::Solana => Chain::Solana,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = AppConfig::from_file(&args.config_path).context("load config")?;
    let storage_dir = config.storage_dir()?;
    info!(
        config_path = %args.config_path.display(),
        storage_dir = %storage_dir.display(),
        "starting delegate-bridge"
    );
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(&storage_dir));

    let report = match args.command {
        Command::Status => {
            let (store, outcome) = restore(storage.as_ref()).await;
            info!(?outcome, "session restore finished");
            StatusReport::from_store(&store)
        }
        Command::Login { key_env, chain } => {
            let private_key = std::env::var(&key_env)
                .with_context(|| format!("environment variable {key_env} is not set"))?;
            let chain = chain.map(Chain::from).unwrap_or(config.chain);
            let store = login_with_key(&config, chain, &private_key, storage.clone()).await?;
            StatusReport::from_store(&store)
        }
        Command::Logout => logout(storage.as_ref()).await?,
    };

    let json = serde_json::to_string_pretty(&report).context("serialize status report")?;
    println!("{json}");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
