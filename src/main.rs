use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lumen_ability::config::Config;
use lumen_ability::gateway;

#[derive(Parser)]
#[command(name = "lumen-ability", version, about = "Quickstart webhook ability for the Lumen platform")]
struct Cli {
    /// Path to the TOML config file (default: ./ability.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the gateway bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the gateway bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    config.validate()?;

    gateway::run_gateway(config).await
}
