//! [`ChainClient`] backed by a live JSON-RPC node.

use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use tokenvote_core::chain::Result;
use tokenvote_core::config::Config;
use tokenvote_core::{ChainClient, ChainError, PendingTx};

use crate::adapter::{EvmAdapter, EvmAdapterError};
use crate::tx;

/// Chain client for the deployed voting token and ballot.
#[derive(Debug)]
pub struct EvmChainClient {
    adapter: EvmAdapter,
    token: Address,
    ballot: Address,
    minter_role: OnceCell<B256>,
    receipt_timeout: Duration,
    receipt_poll_interval: Duration,
}

impl EvmChainClient {
    /// Connects to `config.rpc_url`, signing writes with `signer`.
    pub fn new(
        config: &Config,
        signer: PrivateKeySigner,
    ) -> std::result::Result<Self, EvmAdapterError> {
        let adapter = EvmAdapter::new(&config.rpc_url, signer)?;
        Ok(Self {
            adapter,
            token: config.token_address,
            ballot: config.ballot_address,
            minter_role: OnceCell::new(),
            receipt_timeout: config.receipt_timeout(),
            receipt_poll_interval: config.receipt_poll_interval(),
        })
    }

    pub fn adapter(&self) -> &EvmAdapter {
        &self.adapter
    }

    /// `MINTER_ROLE()` is constant for a deployed token; fetch it once.
    async fn minter_role(&self) -> Result<B256> {
        let role = self
            .minter_role
            .get_or_try_init(|| self.adapter.get_minter_role(self.token))
            .await?;
        Ok(*role)
    }

    async fn poll_receipt(&self, hash: B256) -> Result<serde_json::Value> {
        loop {
            let receipt = self
                .adapter
                .provider()
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            if let Some(receipt) = receipt {
                return to_json(&receipt);
            }
            debug!(%hash, "receipt not yet available");
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ChainError::AbiDecode(e.to_string()))
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn signer_address(&self) -> Address {
        self.adapter.signer_address()
    }

    async fn total_supply(&self) -> Result<U256> {
        Ok(self.adapter.get_total_supply(self.token).await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.adapter.get_allowance(self.token, owner, spender).await?)
    }

    async fn has_minter_role(&self, account: Address) -> Result<bool> {
        let role = self.minter_role().await?;
        Ok(self.adapter.has_role(self.token, role, account).await?)
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<serde_json::Value>> {
        let tx = self
            .adapter
            .provider()
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        tx.as_ref().map(to_json).transpose()
    }

    async fn transaction_receipt_by_hash(&self, hash: B256) -> Result<serde_json::Value> {
        if self.transaction_by_hash(hash).await?.is_none() {
            return Err(ChainError::TransactionNotFound(hash));
        }
        tokio::time::timeout(self.receipt_timeout, self.poll_receipt(hash))
            .await
            .map_err(|_| {
                warn!(%hash, timeout = ?self.receipt_timeout, "gave up waiting for receipt");
                ChainError::ReceiptTimeout(hash)
            })?
    }

    async fn mint(&self, to: Address, amount: U256) -> Result<PendingTx> {
        let request = tx::build_mint(self.token, to, amount);
        Ok(tx::send_transaction(&self.adapter, request).await?)
    }

    async fn delegate(&self, delegatee: Address) -> Result<PendingTx> {
        let request = tx::build_delegate(self.token, delegatee);
        Ok(tx::send_transaction(&self.adapter, request).await?)
    }

    async fn get_votes(&self, account: Address) -> Result<U256> {
        Ok(self.adapter.get_votes(self.token, account).await?)
    }

    async fn vote(&self, proposal: U256, amount: U256) -> Result<PendingTx> {
        let request = tx::build_vote(self.ballot, proposal, amount);
        Ok(tx::send_transaction(&self.adapter, request).await?)
    }

    async fn proposal_vote_count(&self, index: U256) -> Result<U256> {
        Ok(self
            .adapter
            .get_proposal_vote_count(self.ballot, index)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> PrivateKeySigner {
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn uses_configured_contracts_and_timeouts() {
        let config = Config {
            rpc_url: "http://127.0.0.1:8545".into(),
            receipt_timeout_secs: 7,
            receipt_poll_interval_ms: 50,
            ..Config::default()
        };
        let client = EvmChainClient::new(&config, signer()).unwrap();
        assert_eq!(client.token, config.token_address);
        assert_eq!(client.ballot, config.ballot_address);
        assert_eq!(client.receipt_timeout, Duration::from_secs(7));
        assert_eq!(client.receipt_poll_interval, Duration::from_millis(50));
        assert_eq!(client.adapter().rpc_url(), "http://127.0.0.1:8545");
    }

    #[tokio::test]
    async fn unreachable_node_is_rpc_error() {
        let config = Config {
            // Port 9 (discard) is not an RPC endpoint.
            rpc_url: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let client = EvmChainClient::new(&config, signer()).unwrap();
        let err = client.total_supply().await.unwrap_err();
        assert!(matches!(err, ChainError::Rpc(_)));
    }
}
