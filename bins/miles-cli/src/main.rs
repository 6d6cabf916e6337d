//! miles-cli — Terminal front-end for a Miles rewards session.
//!
//! Connects a local wallet, loads the miles ledger from a JSON file, and
//! shows the balance, the next expiration, and which catalog products are
//! currently redeemable.

mod local;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use miles_core::traits::{Clock, SystemClock};
use miles_core::types::{AccountId, Network};
use miles_session::{AppConfig, SessionState};

use crate::local::{JsonFileLedger, LocalWallet};

/// Miles rewards command-line front-end.
#[derive(Parser)]
#[command(name = "miles-cli")]
#[command(version, about = "Check your miles and what they can buy.")]
struct Cli {
    /// Settings file (default: <config dir>/miles/settings.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the settings file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json"). Overrides the settings file.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, fetch the ledger, and show balance and product status.
    Status(StatusArgs),
    /// List the configured products.
    Catalog,
}

#[derive(Args)]
struct StatusArgs {
    /// JSON ledger file: a list of grants, or an object keyed by account.
    #[arg(short, long)]
    ledger: PathBuf,

    /// Wallet account to connect as.
    #[arg(short, long, default_value = "tz1local")]
    account: String,

    /// Network to connect on (default: from settings).
    #[arg(short, long)]
    network: Option<Network>,

    /// Networks the local wallet accepts (default: the configured network).
    #[arg(long, value_delimiter = ',')]
    wallet_networks: Vec<Network>,

    /// Also list every grant, soonest expiration first.
    #[arg(long)]
    view_miles: bool,

    /// Print the session snapshot as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load settings")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let format = cli.log_format.as_deref().unwrap_or(&config.log_format);
    init_logging(level, format);

    match cli.command {
        Commands::Status(args) => status(&config, args).await,
        Commands::Catalog => catalog(&config),
    }
}

/// Run one session: connect, fetch, render.
///
/// A failed connect is returned as an error after the status is printed.
async fn status(config: &AppConfig, args: StatusArgs) -> Result<()> {
    let network = args.network.unwrap_or(config.network);
    let wallet_networks = if args.wallet_networks.is_empty() {
        vec![config.network]
    } else {
        args.wallet_networks
    };

    info!(app = %config.app_name, %network, "starting session");

    let wallet = Arc::new(LocalWallet::new(AccountId::new(args.account), wallet_networks));
    let ledger = Arc::new(JsonFileLedger::new(args.ledger));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut session = SessionState::new(wallet, ledger, Arc::clone(&clock), config.catalog.clone());

    let connect_error = session.request_connect(network).await.err();
    if let Some(e) = &connect_error {
        warn!("connect failed: {e}");
    }

    session.toggle_detail_view(args.view_miles);
    let snapshot = session.snapshot();

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{json}");
    } else {
        let account = session.wallet_session().map(|s| s.account.to_string());
        let mut text = String::new();
        render::render_status(
            &mut text,
            &config.app_title,
            account.as_deref(),
            &snapshot,
            &config.catalog,
        )
        .context("Failed to render status")?;
        if snapshot.detail_view_open {
            text.push('\n');
            render::render_ledger(&mut text, &snapshot.ledger, clock.now())
                .context("Failed to render ledger")?;
        }
        print!("{text}");
    }

    // The disconnected status is still shown; the exit code reports the failure.
    match connect_error {
        Some(e) => Err(anyhow::Error::new(e).context("Wallet connection failed")),
        None => Ok(()),
    }
}

fn catalog(config: &AppConfig) -> Result<()> {
    if config.catalog.is_empty() {
        println!("No products configured.");
        return Ok(());
    }
    for product in &config.catalog {
        let image = if product.image.is_empty() { "-" } else { &product.image };
        println!(
            "{:>4}  {:<24} {:>8} miles  {}",
            product.id.0, product.title, product.required_miles, image
        );
    }
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
