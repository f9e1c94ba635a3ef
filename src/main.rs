//! `dsverifier`: record one inference attestation on chain.
//!
//! Hashes the input and output files, derives the model id from the
//! pipeline tag, signs a `verifyAndRecord` transaction and broadcasts it.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use dsverifier::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use dsverifier::blockchain::{AlloyTransport, AttestationRequest, AttestationSubmitter, Wallet};
use dsverifier::config::validation::{contract_address, validate_chain_access};
use dsverifier::config::{AttestConfig, ValidationError};
use dsverifier::identity::{hash_file, model_id_from_tag};
use dsverifier::lifecycle::startup::bootstrap;

#[derive(Parser, Debug)]
#[command(name = "dsverifier")]
#[command(about = "Record a DeltaSignal inference attestation on chain", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// RPC URL
    #[arg(long, env = "RPC_URL")]
    rpc: Option<String>,

    /// Settlement contract address (0x...)
    #[arg(long, env = "CONTRACT_ADDR")]
    contract: Option<String>,

    /// Private key (0x...)
    #[arg(long, env = PRIVATE_KEY_ENV_VAR, hide_env_values = true)]
    key: Option<String>,

    /// Input file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pipeline/model tag
    #[arg(long, env = "PIPELINE_TAG")]
    tag: Option<String>,
}

/// Everything a submission needs, after validation.
struct Invocation {
    config: AttestConfig,
    key: String,
    input: PathBuf,
    output: PathBuf,
}

impl Cli {
    fn apply(&self, config: &mut AttestConfig) {
        if let Some(rpc) = &self.rpc {
            config.rpc.url = rpc.clone();
        }
        if let Some(contract) = &self.contract {
            config.settlement.contract_address = contract.clone();
        }
        if let Some(tag) = &self.tag {
            config.attestation.pipeline_tag = tag.clone();
        }
    }

    fn into_invocation(self, mut config: AttestConfig) -> Result<Invocation, Vec<ValidationError>> {
        self.apply(&mut config);

        let mut errors = validate_chain_access(&config).err().unwrap_or_default();
        let key = self.key.filter(|k| !k.trim().is_empty());
        if key.is_none() {
            errors.push(ValidationError::Missing("key"));
        }
        if self.input.is_none() {
            errors.push(ValidationError::Missing("input"));
        }
        if self.output.is_none() {
            errors.push(ValidationError::Missing("output"));
        }

        match (key, self.input, self.output) {
            (Some(key), Some(input), Some(output)) if errors.is_empty() => Ok(Invocation {
                config,
                key,
                input,
                output,
            }),
            _ => Err(errors),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = bootstrap(cli.config.as_deref())?;

    let invocation = match cli.into_invocation(config) {
        Ok(invocation) => invocation,
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {}", e);
            }
            eprintln!();
            let _ = Cli::command().print_help();
            std::process::exit(2);
        }
    };
    let config = &invocation.config;

    // Reject a malformed key before touching the network
    let wallet = Wallet::from_private_key(&invocation.key)?;
    let contract = contract_address(config)?;

    let input_hash = hash_file(&invocation.input)?;
    let output_commitment = hash_file(&invocation.output)?;
    let model_id = model_id_from_tag(&config.attestation.pipeline_tag);

    println!("RPC              : {}", config.rpc.url);
    println!("Contract         : {}", contract);
    println!("Pipeline Tag     : {}", config.attestation.pipeline_tag);
    println!("Model ID         : {}", model_id);
    println!("Input Hash       : {}", input_hash);
    println!("Output Commitment: {}", output_commitment);

    let transport = AlloyTransport::connect(&config.rpc.url).await?;
    let submitter = AttestationSubmitter::new(&transport, contract)
        .with_expected_chain_id(config.rpc.chain_id);

    let request = AttestationRequest {
        model_id,
        input_hash,
        output_commitment,
    };
    let tx_hash = submitter.submit(&wallet, &request).await?;

    println!("TX Hash          : {}", tx_hash);
    Ok(())
}
