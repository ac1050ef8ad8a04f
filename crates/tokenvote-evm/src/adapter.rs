//! Chain adapter implementation.
//!
//! Connects to an EVM-compatible JSON-RPC endpoint with a signing wallet
//! attached, and provides typed reads against the token and ballot contracts.

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use thiserror::Error;

use tokenvote_core::ChainError;

use crate::abi::{ITokenizedBallot, IVoteToken};

/// Errors from EVM adapter operations.
#[derive(Debug, Error)]
pub enum EvmAdapterError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("URL parse error: {0}")]
    UrlParse(String),
    #[error("ABI decode error: {0}")]
    AbiDecode(String),
}

impl From<EvmAdapterError> for ChainError {
    fn from(e: EvmAdapterError) -> Self {
        match e {
            EvmAdapterError::Rpc(msg) | EvmAdapterError::UrlParse(msg) => ChainError::Rpc(msg),
            EvmAdapterError::AbiDecode(msg) => ChainError::AbiDecode(msg),
        }
    }
}

/// Result alias for adapter operations.
pub type Result<T> = std::result::Result<T, EvmAdapterError>;

/// An EVM chain adapter connected to a specific RPC endpoint.
pub struct EvmAdapter {
    provider: DynProvider<Ethereum>,
    rpc_url: String,
    signer: Address,
}

impl std::fmt::Debug for EvmAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAdapter")
            .field("rpc_url", &self.rpc_url)
            .field("signer", &self.signer)
            .finish()
    }
}

impl EvmAdapter {
    /// Creates a new adapter that signs outgoing transactions with `signer`.
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self> {
        let url: alloy::transports::http::reqwest::Url = rpc_url
            .parse()
            .map_err(|e| EvmAdapterError::UrlParse(format!("{e}")))?;

        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            signer: address,
        })
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &DynProvider<Ethereum> {
        &self.provider
    }

    /// Returns the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Address of the attached signing wallet.
    pub fn signer_address(&self) -> Address {
        self.signer
    }

    /// `eth_call` a contract and decode the return data as `C`'s returns.
    async fn read<C: SolCall>(&self, contract: Address, call: C) -> Result<C::Return> {
        let result: Bytes = self
            .provider
            .call(
                TransactionRequest::default()
                    .to(contract)
                    .input(call.abi_encode().into()),
            )
            .await
            .map_err(|e| EvmAdapterError::Rpc(e.to_string()))?;

        C::abi_decode_returns(&result).map_err(|e| EvmAdapterError::AbiDecode(e.to_string()))
    }

    /// Queries the token's total supply in base units.
    pub async fn get_total_supply(&self, token: Address) -> Result<U256> {
        self.read(token, IVoteToken::totalSupplyCall {}).await
    }

    /// Queries the ERC-20 allowance granted by `owner` to `spender`.
    pub async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.read(token, IVoteToken::allowanceCall { owner, spender })
            .await
    }

    /// Fetches the token's minter role identifier.
    pub async fn get_minter_role(&self, token: Address) -> Result<B256> {
        self.read(token, IVoteToken::MINTER_ROLECall {}).await
    }

    pub async fn has_role(&self, token: Address, role: B256, account: Address) -> Result<bool> {
        self.read(token, IVoteToken::hasRoleCall { role, account })
            .await
    }

    /// Queries the current voting power of `account`.
    pub async fn get_votes(&self, token: Address, account: Address) -> Result<U256> {
        self.read(token, IVoteToken::getVotesCall { account }).await
    }

    /// Queries the accumulated vote count of a ballot proposal.
    pub async fn get_proposal_vote_count(&self, ballot: Address, index: U256) -> Result<U256> {
        let proposal = self
            .read(ballot, ITokenizedBallot::proposalsCall { index })
            .await?;
        Ok(proposal.voteCount)
    }

    /// Gets the chain ID from the connected node.
    pub async fn get_chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| EvmAdapterError::Rpc(e.to_string()))
    }
}
