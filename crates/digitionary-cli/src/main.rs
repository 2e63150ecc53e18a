/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Sign-in, logout and diagnostics against the auth backend
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use digitionary_auth::AuthConfig;

#[derive(Parser, Debug)]
#[command(name = "digitionary", version, about = "Digi-tionary sign-in client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Overrides `api_base_url` from the configuration
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    api_base_url: Option<String>,
    /// Validate configuration and exit
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with Ethereum using a local private key
    Login {
        #[arg(long = "private-key", env = "DIGITIONARY_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
        #[arg(long = "chain-id", default_value_t = 1)]
        chain_id: u64,
    },
    /// Print the canonical SIWE message for an address
    Message {
        #[arg(long)]
        address: String,
        #[arg(long = "chain-id", default_value_t = 1)]
        chain_id: u64,
    },
    /// Check a signed message locally
    Verify {
        #[arg(long = "message-file", value_name = "PATH")]
        message_file: PathBuf,
        #[arg(long)]
        signature: String,
    },
    /// Print the SSO handoff URL
    Sso {
        /// Ask the backend for the provider redirect instead
        #[arg(long)]
        resolve: bool,
    },
    /// End the backend session
    Logout,
    /// Query backend health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(args.config_path.as_ref(), args.api_base_url.as_deref())?;
    info!(
        api_base_url = %config.api_base_url,
        domain = %config.domain,
        dry_run = args.dry_run,
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let Some(command) = args.command else {
        return Err(anyhow!("no command given; see --help"));
    };

    match command {
        Command::Login {
            private_key,
            chain_id,
        } => {
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());
            cli::run_login(&config, private_key, chain_id, &shutdown).await
        }
        Command::Message { address, chain_id } => cli::run_message(&config, &address, chain_id),
        Command::Verify {
            message_file,
            signature,
        } => cli::run_verify(&message_file, &signature),
        Command::Sso { resolve } => cli::run_sso(&config, resolve).await,
        Command::Logout => cli::run_logout(&config).await,
        Command::Health => cli::run_health(&config).await,
    }
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

fn load_config(path: Option<&PathBuf>, api_base_url: Option<&str>) -> Result<AuthConfig> {
    let mut config = match path {
        Some(path) => AuthConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => AuthConfig::default(),
    };
    if let Some(api_base_url) = api_base_url {
        config.api_base_url = api_base_url.to_string();
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown.cancel();
    });
}
