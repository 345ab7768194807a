use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use gridwatch_models::config::GridwatchConfig;
use gridwatch_tools::envelope;
use gridwatch_tools::ToolCall;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gridwatch",
    about = "Building energy query and forecast tools over a meter-reading store"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/gridwatch.toml")]
    config: String,

    /// Read the tool call JSON from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config: {}", cli.config))?;
    let config: GridwatchConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    let call_json = if let Some(input_path) = &cli.input {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input: {input_path}"))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };

    let call: ToolCall =
        serde_json::from_str(&call_json).context("Failed to parse tool call JSON")?;

    let service = gridwatch::build_service(&config).context("Failed to build tool service")?;

    // Every outcome, success or failure, is a well-formed envelope.
    let result = service.dispatch(&call).await;
    println!("{}", envelope::render(&result, cli.pretty));

    Ok(())
}
