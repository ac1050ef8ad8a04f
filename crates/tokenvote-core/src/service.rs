//! Service facade behind the HTTP API.
//!
//! Owns the chain client, the order ledger and the vote log. Reads are
//! passed through to the chain and formatted in token units; writes return
//! the pending transaction without waiting for it to be mined.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use chrono::Utc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::chain::{ChainClient, ChainError, PendingTx};
use crate::ledger::{ClaimPayment, LedgerError, NewOrder, OrderLedger, OrderSummary};
use crate::units::{format_token, to_base_units};
use crate::votes::{Vote, VoteForm, VoteLog};

/// Ballot proposals reported by `list_votes`.
pub const LISTED_PROPOSALS: [u64; 3] = [0, 1, 2];

/// Suffix appended to formatted vote tallies.
const TALLY_UNIT: &str = "ETH";

/// Errors from service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid transaction hash '{0}'")]
    InvalidHash(String),
    #[error("invalid proposal '{0}'")]
    InvalidProposal(String),
    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },
}

/// Result alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Request body for delegating voting power.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelegateVote {
    /// Delegatee address (hex, 0x-prefixed).
    pub to: String,
}

/// The token/ballot gateway.
#[derive(Clone)]
pub struct TokenVoteService {
    chain: Arc<dyn ChainClient>,
    orders: Arc<OrderLedger>,
    votes: Arc<VoteLog>,
}

impl fmt::Debug for TokenVoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVoteService")
            .field("signer", &self.chain.signer_address())
            .field("orders", &self.orders)
            .finish()
    }
}

impl TokenVoteService {
    /// Creates a service with an empty ledger and vote log.
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self::with_state(chain, Arc::new(OrderLedger::new()), Arc::new(VoteLog::new()))
    }

    pub fn with_state(
        chain: Arc<dyn ChainClient>,
        orders: Arc<OrderLedger>,
        votes: Arc<VoteLog>,
    ) -> Self {
        Self {
            chain,
            orders,
            votes,
        }
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.orders
    }

    pub fn signer_address(&self) -> Address {
        self.chain.signer_address()
    }

    // ---- Token reads ----

    pub async fn total_supply(&self) -> Result<String> {
        Ok(format_token(self.chain.total_supply().await?))
    }

    pub async fn allowance(&self, from: &str, to: &str) -> Result<String> {
        let owner = parse_address(from)?;
        let spender = parse_address(to)?;
        Ok(format_token(self.chain.allowance(owner, spender).await?))
    }

    pub async fn has_minter_role(&self, address: &str) -> Result<bool> {
        let account = parse_address(address)?;
        Ok(self.chain.has_minter_role(account).await?)
    }

    pub async fn transaction_by_hash(&self, hash: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.chain.transaction_by_hash(parse_hash(hash)?).await?)
    }

    pub async fn transaction_receipt_by_hash(&self, hash: &str) -> Result<serde_json::Value> {
        Ok(self
            .chain
            .transaction_receipt_by_hash(parse_hash(hash)?)
            .await?)
    }

    /// Voting weight currently held by the service signer.
    pub async fn check_voting_power(&self) -> Result<String> {
        let votes = self.chain.get_votes(self.chain.signer_address()).await?;
        Ok(format_token(votes))
    }

    // ---- Token writes ----

    pub async fn delegate_voting_power(&self, req: DelegateVote) -> Result<PendingTx> {
        let delegatee = parse_address(&req.to)?;
        let tx = self.chain.delegate(delegatee).await?;
        info!(to = %delegatee, tx = %tx.hash, "voting power delegated");
        Ok(tx)
    }

    // ---- Payment orders ----

    pub fn create_order(&self, order: NewOrder) -> Result<()> {
        Ok(self.orders.create(order)?)
    }

    pub fn list_orders(&self) -> Result<Vec<OrderSummary>> {
        Ok(self.orders.list()?)
    }

    pub fn get_order(&self, id: &str) -> Result<OrderSummary> {
        Ok(self.orders.get(id)?)
    }

    pub async fn claim_payment(&self, claim: ClaimPayment) -> Result<PendingTx> {
        Ok(self.orders.claim(self.chain.as_ref(), claim).await?)
    }

    /// Accepted for API compatibility; has no effect.
    pub fn request_voting_tokens(&self, _req: ClaimPayment) -> bool {
        true
    }

    // ---- Ballot ----

    /// Cast a vote from the service signer and record it.
    pub async fn cast_vote(&self, form: VoteForm) -> Result<PendingTx> {
        let proposal = U256::from_str_radix(form.proposal.trim(), 10)
            .map_err(|_| ServiceError::InvalidProposal(form.proposal.clone()))?;
        let weight = to_base_units(form.amount).map_err(|reason| ServiceError::InvalidAmount {
            value: form.amount.to_string(),
            reason,
        })?;

        let tx = self.chain.vote(proposal, weight).await?;
        info!(proposal = %proposal, weight = %form.amount, tx = %tx.hash, "vote cast");

        let recorded = self.votes.record(Vote {
            proposal: form.proposal,
            amount: form.amount,
            from: self.chain.signer_address(),
            tx_hash: tx.hash,
            cast_at: Utc::now(),
        });
        if let Err(e) = recorded {
            error!(tx = %tx.hash, "vote submitted but not recorded: {e}");
        }
        Ok(tx)
    }

    /// Vote tallies of proposals 0, 1 and 2, e.g. `"12.5 ETH"`.
    pub async fn list_votes(&self) -> Result<Vec<String>> {
        let tallies = try_join_all(
            LISTED_PROPOSALS
                .iter()
                .map(|&index| self.chain.proposal_vote_count(U256::from(index))),
        )
        .await?;

        Ok(tallies
            .into_iter()
            .map(|count| format!("{} {TALLY_UNIT}", format_token(count)))
            .collect())
    }

    /// Votes cast through this service since startup.
    pub fn recent_votes(&self) -> Result<Vec<Vote>> {
        Ok(self.votes.list()?)
    }
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|_| ServiceError::InvalidAddress(value.to_string()))
}

fn parse_hash(value: &str) -> Result<B256> {
    value
        .trim()
        .parse()
        .map_err(|_| ServiceError::InvalidHash(value.to_string()))
}
