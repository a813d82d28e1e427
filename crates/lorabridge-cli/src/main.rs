//! Command-line entry point for the LoRa discovery bridge.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lorabridge_core::{service, BridgeConfig};

/// Bridge raw LoRa gateway telemetry onto Home Assistant MQTT discovery.
#[derive(Parser, Debug)]
#[command(name = "lorabridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the options file.
    #[arg(long, default_value = "/data/options.json")]
    options: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_directives = if args.verbose {
        "lorabridge=debug"
    } else {
        "lorabridge=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(default_directives)
                .add_directive(tracing::Level::INFO.into())
        });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    let config = BridgeConfig::load(&args.options)?;
    service::run(config).await?;
    Ok(())
}
