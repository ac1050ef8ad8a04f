//! # tokenvote-evm
//!
//! EVM chain access for the voting token and ballot contracts.
//!
//! ## Modules
//!
//! - [`abi`]: contract ABI definitions using alloy's `sol!` macro
//! - [`adapter`]: JSON-RPC adapter for typed contract reads
//! - [`tx`]: transaction building and broadcasting
//! - [`wallet`]: loading the service signing key
//! - [`client`]: the [`tokenvote_core::ChainClient`] implementation

pub mod abi;
pub mod adapter;
pub mod client;
pub mod tx;
pub mod wallet;

pub use adapter::{EvmAdapter, EvmAdapterError};
pub use client::EvmChainClient;
pub use tx::TxError;
pub use wallet::{signer_from_hex, signer_from_var, WalletError};

pub use alloy::primitives::{Address, U256};
pub use alloy::signers::local::PrivateKeySigner;
