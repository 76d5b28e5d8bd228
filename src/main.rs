//! `bridge-mint` command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   accounts.json ──▶ accounts ──┐
//!                                ▼
//!   config.toml ──▶ config ──▶ orchestration ──▶ blockchain ──▶ source / destination RPC
//!                                │   (batch → bridge / mint)         (per-account proxy)
//!                                ▼
//!                  observability (audit log, metrics)   lifecycle (Ctrl-C → cancel)
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bridge_mint::accounts::{AccountStore, JsonAccountStore};
use bridge_mint::blockchain::RpcConnector;
use bridge_mint::config::{load_config, LoadedConfig};
use bridge_mint::lifecycle::{signals, Shutdown};
use bridge_mint::observability::{logging, TracingAudit};
use bridge_mint::orchestration::{AccountOrder, BatchRunner, OperationKind, Timing};
use bridge_mint::quoting::AmountStrategy;

const DEFAULT_CONFIG: &str = "bridge-mint.toml";

#[derive(Parser)]
#[command(name = "bridge-mint")]
#[command(version, about = "Bridge funds to the destination network and mint, account by account", long_about = None)]
struct Cli {
    /// TOML config file. Built-in defaults apply when the default file is absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Account ledger (overrides `accounts.path`).
    #[arg(short, long)]
    accounts: Option<PathBuf>,

    /// Visit accounts in ledger order.
    #[arg(long)]
    no_shuffle: bool,

    /// Seed for shuffling and amount humanization (overrides `accounts.seed`).
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bridge every account flagged for bridging
    Bridge,
    /// Mint for every account flagged for minting
    Mint,
    /// Bridge where flagged, then mint, per account
    Run,
    /// Validate the configuration and print the resolved settings
    CheckConfig,
    /// List accounts and their pending steps
    Accounts,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let loaded = match load_config(&path, required) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::from(2);
        }
    };

    let observability = &loaded.config.observability;
    logging::init(&observability.log_level, observability.json_logs);
    tracing::info!(config = %path.display(), "bridge-mint v{} starting", env!("CARGO_PKG_VERSION"));

    if observability.metrics_enabled {
        if let Ok(addr) = observability.metrics_address.parse() {
            bridge_mint::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match run(cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, loaded: LoadedConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let LoadedConfig { config, settings } = loaded;
    let ledger = cli
        .accounts
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.accounts.path));

    let kind = match cli.command {
        Commands::Bridge => OperationKind::Bridge,
        Commands::Mint => OperationKind::Mint,
        Commands::Run => OperationKind::BridgeThenMint,
        Commands::CheckConfig => {
            print_settings(&config, &settings, &ledger);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Accounts => {
            let store = JsonAccountStore::new(&ledger);
            for account in store.load_all()? {
                println!(
                    "{:>4}  {}  bridge={:<5}  mint={:<5}  proxy={}",
                    account.id,
                    account.subject(),
                    account.needs_bridge,
                    account.needs_mint,
                    account
                        .proxy
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_ctrl_c_handler(shutdown.clone());

    let connector = RpcConnector::new(config.networks.clone(), config.rpc.clone(), &config.polling);
    let store = JsonAccountStore::new(&ledger);
    let audit = TracingAudit;

    let order = if cli.no_shuffle || !config.accounts.shuffle {
        AccountOrder::Ledger
    } else {
        AccountOrder::Shuffled
    };
    let mut runner = BatchRunner::new(
        &connector,
        &store,
        &settings,
        &audit,
        Timing::from_polling(&config.polling),
    )
    .with_cancellation(shutdown.cancellation())
    .with_order(order);
    if let Some(seed) = cli.seed.or(config.accounts.seed) {
        runner = runner.with_seed(seed);
    }

    let report = runner.run_batch(kind).await?;
    if let Some(halt) = &report.halted {
        eprintln!(
            "Batch halted at account {} ({}) during {}: {}",
            halt.account, halt.subject, halt.step, halt.reason
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_settings(
    config: &bridge_mint::AppConfig,
    settings: &bridge_mint::OperationSettings,
    ledger: &std::path::Path,
) {
    let amount = match settings.bridge_amount {
        AmountStrategy::Range { min, max } => format!("between {} and {} eth", min, max),
        AmountStrategy::Around { center, accuracy } => format!("{} ± {} eth", center, accuracy),
    };
    let network = |testnet: bool| if testnet { "testnet" } else { "mainnet" };

    println!("Configuration OK");
    println!("  mint price          {} eth", settings.mint_price);
    println!("  mint gas            {} units, quoted at {} gwei", settings.gas_for_mint, settings.gas_price_for_mint);
    println!("  bridge gas ceiling  {} gwei", settings.max_gas_in_gwei);
    println!("  bridge amount       {}", amount);
    println!("  bridge network      {} ({:?})", network(settings.bridge.testnet), settings.bridge.fee_scalar);
    println!("  mint network        {} ({:?})", network(settings.mint.testnet), settings.mint.fee_scalar);
    match settings.target.resolve() {
        Ok(target) => println!("  mint target         {}", target),
        Err(e) => println!("  mint target         {}", e),
    }
    println!("  account ledger      {}", ledger.display());
    println!(
        "  polling             gas {}s, balance {}s, receipt timeout {}s",
        config.polling.gas_poll_secs, config.polling.balance_poll_secs, config.polling.receipt_timeout_secs
    );
}
