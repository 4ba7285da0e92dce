//! Revshare daemon: inspect host configuration and run scripted simulations.

mod script;

use anyhow::Context;
use clap::Parser;
use revshare_node::{init_logging, LogFormat, NodeConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "revshare-daemon", about = "Revenue-sharing host")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file; `RUST_LOG` overrides both.
    #[arg(long, env = "REVSHARE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REVSHARE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML configuration file. Defaults apply when omitted.
        #[arg(long, env = "REVSHARE_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Run a simulation script against a fresh host and print a JSON report.
    Simulate {
        /// TOML script: an optional `[config]` table and `[[step]]` entries.
        #[arg(long)]
        script: PathBuf,

        /// Record failing steps and continue instead of aborting.
        #[arg(long)]
        keep_going: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<NodeConfig> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            NodeConfig::from_toml_str(&contents)?
        }
        None => NodeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn start_logging(cli: &Cli, config: &NodeConfig) -> anyhow::Result<()> {
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(&config.log_format)
        .parse::<LogFormat>()?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(format, level)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Config { config } => {
            let config = load_config(config.as_ref())?;
            start_logging(&cli, &config)?;
            print!("{}", config.to_toml_string()?);
        }
        Command::Simulate { script, keep_going } => {
            let contents = std::fs::read_to_string(script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let parsed = script::Script::from_toml_str(&contents)?;
            start_logging(&cli, &parsed.config)?;
            tracing::info!(
                script = %script.display(),
                steps = parsed.steps.len(),
                "starting simulation"
            );

            let report = script::run(parsed, *keep_going)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            tracing::info!("simulation finished");
        }
    }

    Ok(())
}
