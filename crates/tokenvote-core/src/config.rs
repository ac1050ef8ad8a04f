//! Service configuration.
//!
//! Every field has a default, so a missing or partial `config.yaml` is
//! valid. The signing key is deliberately not part of this file; it is read
//! from the environment at startup.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default JSON-RPC endpoint of the chain node.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-goerli-rpc.publicnode.com";

/// Deployed voting token.
pub const DEFAULT_TOKEN_ADDRESS: Address = address!("1a6B025ad0bA0005901813D32b7f8A421C905986");

/// Deployed tokenized ballot.
pub const DEFAULT_BALLOT_ADDRESS: Address = address!("0AAB4B203ef2B6e82922A55C69361BA7dA3C343f");

/// Environment variable holding the signer's private key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: String, reason: String },
}

/// Runtime configuration of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the chain node.
    pub rpc_url: String,
    /// Voting token contract.
    pub token_address: Address,
    /// Tokenized ballot contract.
    pub ballot_address: Address,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Upper bound on waiting for a transaction receipt.
    pub receipt_timeout_secs: u64,
    /// Interval between receipt polls.
    pub receipt_poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            token_address: DEFAULT_TOKEN_ADDRESS,
            ballot_address: DEFAULT_BALLOT_ADDRESS,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            receipt_timeout_secs: 120,
            receipt_poll_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Apply `TOKENVOTE_RPC_URL` and `TOKENVOTE_LISTEN_ADDR` overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("TOKENVOTE_RPC_URL") {
            self.rpc_url = url;
        }
        if let Some(addr) = lookup("TOKENVOTE_LISTEN_ADDR") {
            self.listen_addr = addr.parse().map_err(|e| ConfigError::InvalidEnv {
                var: "TOKENVOTE_LISTEN_ADDR".to_string(),
                reason: format!("{e}"),
            })?;
        }
        Ok(self)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}
