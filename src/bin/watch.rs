//! `watch`: stream InferenceRecorded events from a settlement contract.
//!
//! Replays history from the start block, then follows the live
//! subscription until SIGINT or SIGTERM.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use dsverifier::blockchain::AlloyTransport;
use dsverifier::config::validation::{contract_address, validate_watcher};
use dsverifier::lifecycle::signals::spawn_signal_listener;
use dsverifier::lifecycle::startup::bootstrap;
use dsverifier::lifecycle::Shutdown;
use dsverifier::resilience::ReconnectBackoff;
use dsverifier::watcher::{EventWatcher, StartBlock, StdoutSink, WatchQuery};

#[derive(Parser, Debug)]
#[command(name = "watch")]
#[command(about = "Watch InferenceRecorded events on a settlement contract", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// RPC URL (ws:// for live streaming)
    #[arg(long, env = "RPC_URL")]
    rpc: Option<String>,

    /// Contract address (0x...)
    #[arg(long, env = "CONTRACT_ADDR")]
    contract: Option<String>,

    /// Start block (negative: latest block)
    #[arg(long, env = "START_BLOCK", allow_negative_numbers = true)]
    from: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = bootstrap(cli.config.as_deref())?;

    if let Some(rpc) = cli.rpc {
        config.rpc.url = rpc;
    }
    if let Some(contract) = cli.contract {
        config.settlement.contract_address = contract;
    }
    let start = match cli.from {
        Some(from) => StartBlock::from_signed(from),
        None => StartBlock::from(config.watcher.from_block),
    };

    if let Err(errors) = validate_watcher(&config) {
        for e in &errors {
            eprintln!("error: {}", e);
        }
        eprintln!();
        let _ = Cli::command().print_help();
        std::process::exit(2);
    }
    let contract = contract_address(&config)?;

    let transport = AlloyTransport::connect(&config.rpc.url)
        .await?
        .with_subscription_capacity(config.watcher.channel_capacity);

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let mut watcher = EventWatcher::new(
        transport,
        WatchQuery::new(contract, start),
        StdoutSink::for_endpoint(config.rpc.url.clone()),
    )
    .with_backoff(ReconnectBackoff::from_millis(config.watcher.reconnect_delay_ms));

    let report = watcher.run(shutdown.subscribe()).await?;
    println!("\nShutting down watcher.");

    tracing::info!(
        historical = report.historical,
        live = report.live,
        decode_failures = report.decode_failures,
        duplicates = report.duplicates,
        reconnects = report.reconnects,
        "Watch session finished"
    );
    Ok(())
}
