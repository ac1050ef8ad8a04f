//! `tokenvote serve`: start the HTTP API server.
//!
//! Loads config, reads the signing key from the environment, connects to the
//! chain node and serves until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokenvote_core::TokenVoteService;
use tokenvote_evm::wallet::signer_from_var;
use tokenvote_evm::EvmChainClient;
use tokenvote_rpc::server::{shutdown_signal, RpcServer};

/// Run the `serve` subcommand.
pub async fn run(
    config_path: Option<PathBuf>,
    addr: Option<SocketAddr>,
    private_key_env: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let signer = signer_from_var(private_key_env)?;

    let chain = EvmChainClient::new(&config, signer)?;
    tracing::info!(
        rpc_url = %config.rpc_url,
        token = %config.token_address,
        ballot = %config.ballot_address,
        signer = %chain.adapter().signer_address(),
        "connected chain client"
    );

    let service = TokenVoteService::new(Arc::new(chain));
    let listen = addr.unwrap_or(config.listen_addr);

    println!("tokenvote listening on {listen}");
    RpcServer::new(service, listen).run(shutdown_signal()).await?;

    Ok(())
}
