//! `mvdserver`: mock x402 pay-per-request server for demos.
//!
//! Mock-only: payments are never verified and receipts are fabricated.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tokio::net::TcpListener;

use dsverifier::config::validation::validate_mock_server;
use dsverifier::http::MockServer;
use dsverifier::lifecycle::signals::spawn_signal_listener;
use dsverifier::lifecycle::startup::bootstrap;
use dsverifier::lifecycle::Shutdown;

#[derive(Parser, Debug)]
#[command(name = "mvdserver")]
#[command(about = "Mock x402 server for the DeltaSignal demo insight card", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    bind: Option<String>,

    /// Address advertised as payTo
    #[arg(long, env = "RECEIVING_ADDRESS")]
    receiving_address: Option<String>,

    /// Payment network
    #[arg(long, env = "NETWORK")]
    network: Option<String>,

    /// Price in atomic units (100000 = 0.10 USDC)
    #[arg(long, env = "MAX_AMOUNT")]
    max_amount: Option<String>,

    /// Asset symbol or token address
    #[arg(long, env = "ASSET_ADDRESS")]
    asset: Option<String>,

    /// Pipeline tag hashed into the reported model id
    #[arg(long, env = "PIPELINE_TAG")]
    tag: Option<String>,

    /// Seed for fake transaction hashes
    #[arg(long, env = "MOCK_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = bootstrap(cli.config.as_deref())?;

    let server_config = &mut config.mock_server;
    let overrides = [
        (&mut server_config.bind_address, cli.bind),
        (&mut server_config.receiving_address, cli.receiving_address),
        (&mut server_config.network, cli.network),
        (&mut server_config.max_amount, cli.max_amount),
        (&mut server_config.asset, cli.asset),
        (&mut server_config.pipeline_tag, cli.tag),
    ];
    for (field, value) in overrides {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *field = value;
        }
    }
    if cli.seed.is_some() {
        server_config.rng_seed = cli.seed;
    }

    if let Err(errors) = validate_mock_server(&config) {
        for e in &errors {
            eprintln!("error: {}", e);
        }
        eprintln!();
        let _ = Cli::command().print_help();
        std::process::exit(2);
    }

    let listener = TcpListener::bind(&config.mock_server.bind_address).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = MockServer::new(config.mock_server);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
