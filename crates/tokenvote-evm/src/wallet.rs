//! Loading the service signing key.

use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

/// Errors from loading the signing key.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("environment variable {0} is not set")]
    MissingKey(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

/// Parse a hex-encoded secp256k1 private key, with or without `0x`.
///
/// The key material is never echoed back in the error.
pub fn signer_from_hex(key: &str) -> Result<PrivateKeySigner, WalletError> {
    let key = key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    if key.len() != 64 {
        return Err(WalletError::InvalidKey(format!(
            "expected 32 bytes of hex, got {} characters",
            key.len()
        )));
    }
    key.parse::<PrivateKeySigner>()
        .map_err(|_| WalletError::InvalidKey("not a valid secp256k1 key".to_string()))
}

/// Load the signer from the environment variable `var`, normally
/// [`tokenvote_core::config::PRIVATE_KEY_ENV`].
pub fn signer_from_var(var: &str) -> Result<PrivateKeySigner, WalletError> {
    let key = std::env::var(var).map_err(|_| WalletError::MissingKey(var.to_string()))?;
    signer_from_hex(&key)
}
