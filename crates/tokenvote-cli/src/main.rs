//! # tokenvote CLI
//!
//! Entry point for the `tokenvote` binary.
//!
//! Subcommands:
//! - `tokenvote serve`: start the HTTP API server
//! - `tokenvote address`: print the address of the signing key

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tokenvote_core::config::PRIVATE_KEY_ENV;

mod commands;

/// tokenvote: HTTP gateway for a voting token, its ballot, and claimable payment orders.
#[derive(Parser)]
#[command(name = "tokenvote", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Path to config.yaml (default: ~/.tokenvote/config.yaml if present).
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Address to bind the HTTP server (overrides the config file).
        #[arg(long, short)]
        addr: Option<SocketAddr>,

        /// Environment variable holding the hex private key.
        #[arg(long, default_value = PRIVATE_KEY_ENV)]
        private_key_env: String,
    },

    /// Print the address derived from the signing key.
    Address {
        /// Environment variable holding the hex private key.
        #[arg(long, default_value = PRIVATE_KEY_ENV)]
        private_key_env: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOKENVOTE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            addr,
            private_key_env,
        } => commands::serve::run(config, addr, &private_key_env).await,
        Commands::Address { private_key_env } => commands::address::run(&private_key_env),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
