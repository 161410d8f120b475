//! notus CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `agents` — List built-in agent roles and their defaults
//! - `init`   — Write a default notus.toml

use clap::{Parser, Subcommand};
use notus_core::AgentRole;

#[derive(Parser)]
#[command(
    name = "notus",
    about = "notus — knowledge-grounded content pipeline",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long, env = "NOTUS_PORT")]
        port: Option<u16>,
    },

    /// List built-in agent roles and their default configurations
    Agents,

    /// Write a default notus.toml to the working directory
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = notus_config::AppConfig::load()?;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            notus_gateway::start(config).await?;
        }
        Commands::Agents => {
            for name in notus_agents::BUILTIN_ROLES {
                let config = notus_agents::default_for(&AgentRole::from(name));
                println!(
                    "{:<20} {:<10} {:<28} temp={:.1} max_tokens={}",
                    name,
                    config.provider.as_str(),
                    config.model,
                    config.temperature,
                    config.max_tokens
                );
            }
        }
        Commands::Init => {
            let path = std::path::Path::new("notus.toml");
            if path.exists() {
                anyhow::bail!("notus.toml already exists, not overwriting");
            }
            std::fs::write(path, notus_config::AppConfig::default_toml())?;
            println!("Wrote notus.toml");
        }
    }

    Ok(())
}
