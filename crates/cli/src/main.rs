//! Frontdesk CLI — the main entry point.
//!
//! Commands:
//! - `init`   — Write a default config file
//! - `serve`  — Start the HTTP gateway

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "frontdesk",
    about = "Frontdesk — multi-tenant conversational agent backend",
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
    /// Write a default frontdesk.toml
    Init {
        /// Target path
        #[arg(long, default_value = "frontdesk.toml")]
        path: String,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Config file path (overrides FRONTDESK_CONFIG)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(&path)?,
        Commands::Serve { config, port } => commands::serve::run(config, port).await?,
    }

    Ok(())
}
