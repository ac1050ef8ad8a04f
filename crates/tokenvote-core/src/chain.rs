//! Chain client abstraction.
//!
//! The ledger and the service facade talk to the token and ballot contracts
//! only through [`ChainClient`]. The production implementation lives in
//! `tokenvote-evm`; tests use [`crate::mock::MockChain`].

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by a chain client.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("ABI decode error: {0}")]
    AbiDecode(String),
    #[error("transaction {0} not found")]
    TransactionNotFound(B256),
    #[error("timed out waiting for receipt of {0}")]
    ReceiptTimeout(B256),
}

/// Result alias for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// A submitted, not necessarily mined, transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTx {
    /// Transaction hash.
    pub hash: B256,
    /// Sender (the service signer).
    pub from: Address,
    /// Contract the call was sent to.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
}

/// Read and write surface of the token and ballot contracts.
///
/// Writes are signed by the client's own key and return as soon as the node
/// accepts the transaction.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the key that signs every write.
    fn signer_address(&self) -> Address;

    /// `totalSupply()` of the token, in base units.
    async fn total_supply(&self) -> Result<U256>;

    /// `allowance(owner, spender)` of the token, in base units.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Whether `account` holds the token's `MINTER_ROLE`.
    async fn has_minter_role(&self, account: Address) -> Result<bool>;

    /// Raw transaction object, or `None` when the node does not know the hash.
    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<serde_json::Value>>;

    /// Receipt of a known transaction; waits until it is mined.
    async fn transaction_receipt_by_hash(&self, hash: B256) -> Result<serde_json::Value>;

    /// Submit `mint(to, amount)` on the token.
    async fn mint(&self, to: Address, amount: U256) -> Result<PendingTx>;

    /// Submit `delegate(delegatee)` on the token.
    async fn delegate(&self, delegatee: Address) -> Result<PendingTx>;

    /// Current voting weight of `account`, in base units.
    async fn get_votes(&self, account: Address) -> Result<U256>;

    /// Submit `vote(proposal, amount)` on the ballot.
    async fn vote(&self, proposal: U256, amount: U256) -> Result<PendingTx>;

    /// `proposals(index).voteCount` on the ballot, in base units.
    async fn proposal_vote_count(&self, index: U256) -> Result<U256>;
}
