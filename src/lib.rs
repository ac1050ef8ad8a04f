//! # tokenvote
//!
//! HTTP gateway for an ERC-20 voting token, its tokenized ballot, and
//! claimable payment orders.
//!
//! The workspace is split the usual way:
//!
//! - [`tokenvote_core`]: order ledger, vote log, service facade, chain trait
//! - [`tokenvote_evm`]: alloy-backed chain client
//! - [`tokenvote_rpc`]: axum HTTP API

pub use tokenvote_core;
pub use tokenvote_evm;
pub use tokenvote_rpc;

/// Returns the library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
