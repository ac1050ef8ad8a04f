//! In-memory [`ChainClient`] for tests.
//!
//! Records every write so tests can assert on what would have been sent to
//! the chain. Reads return whatever was configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::json;

use crate::chain::{ChainClient, ChainError, PendingTx, Result};

/// Fake token contract address used in [`PendingTx::to`].
pub const MOCK_TOKEN: Address = Address::repeat_byte(0x70);
/// Fake ballot contract address used in [`PendingTx::to`].
pub const MOCK_BALLOT: Address = Address::repeat_byte(0xba);

/// A write recorded by [`MockChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Mint { to: Address, amount: U256 },
    Delegate { to: Address },
    Vote { proposal: U256, amount: U256 },
}

type SubmitHook = Box<dyn Fn() + Send + Sync>;

/// Scriptable chain client.
pub struct MockChain {
    signer: Address,
    minter: AtomicBool,
    fail_writes: AtomicBool,
    total_supply: Mutex<U256>,
    votes: Mutex<U256>,
    tallies: Mutex<Vec<U256>>,
    known_txs: Mutex<HashMap<B256, serde_json::Value>>,
    calls: Mutex<Vec<MockCall>>,
    role_checks: AtomicU64,
    queried_proposals: Mutex<Vec<U256>>,
    nonce: AtomicU64,
    on_submit: Mutex<Option<SubmitHook>>,
}

impl std::fmt::Debug for MockChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockChain")
            .field("signer", &self.signer)
            .field("calls", &lock(&self.calls).len())
            .finish_non_exhaustive()
    }
}

impl MockChain {
    /// A chain whose signer holds the minter role.
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            minter: AtomicBool::new(true),
            fail_writes: AtomicBool::new(false),
            total_supply: Mutex::new(U256::ZERO),
            votes: Mutex::new(U256::ZERO),
            tallies: Mutex::new(Vec::new()),
            known_txs: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            role_checks: AtomicU64::new(0),
            queried_proposals: Mutex::new(Vec::new()),
            nonce: AtomicU64::new(0),
            on_submit: Mutex::new(None),
        }
    }

    pub fn set_minter(&self, minter: bool) {
        self.minter.store(minter, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with an RPC error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_total_supply(&self, value: U256) {
        *lock(&self.total_supply) = value;
    }

    pub fn set_votes(&self, value: U256) {
        *lock(&self.votes) = value;
    }

    /// Vote counts returned for proposals 0, 1, 2, ... in order.
    pub fn set_tallies(&self, tallies: Vec<U256>) {
        *lock(&self.tallies) = tallies;
    }

    /// Run `hook` each time a write is accepted, after it is recorded.
    pub fn on_submit(&self, hook: impl Fn() + Send + Sync + 'static) {
        *lock(&self.on_submit) = Some(Box::new(hook));
    }

    /// Writes recorded so far.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn mint_calls(&self) -> Vec<(Address, U256)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Mint { to, amount } => Some((to, amount)),
                _ => None,
            })
            .collect()
    }

    /// Number of `has_minter_role` queries served.
    pub fn role_checks(&self) -> u64 {
        self.role_checks.load(Ordering::SeqCst)
    }

    /// Proposal indices queried through `proposal_vote_count`, in call order.
    pub fn queried_proposals(&self) -> Vec<U256> {
        lock(&self.queried_proposals).clone()
    }

    fn submit(&self, call: MockCall, to: Address, data: Bytes) -> Result<PendingTx> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("execution reverted".to_string()));
        }
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = B256::left_padding_from(&n.to_be_bytes());
        lock(&self.known_txs).insert(
            hash,
            json!({ "hash": hash, "from": self.signer, "to": to, "nonce": n }),
        );
        lock(&self.calls).push(call);
        if let Some(hook) = lock(&self.on_submit).as_ref() {
            hook();
        }
        Ok(PendingTx {
            hash,
            from: self.signer,
            to,
            data,
        })
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ChainClient for MockChain {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn total_supply(&self) -> Result<U256> {
        Ok(*lock(&self.total_supply))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        // Whole tokens equal to the sum of both addresses' last bytes.
        let units = u64::from(owner.0[19]) + u64::from(spender.0[19]);
        Ok(U256::from(units) * U256::from(10u64).pow(U256::from(18u64)))
    }

    async fn has_minter_role(&self, account: Address) -> Result<bool> {
        self.role_checks.fetch_add(1, Ordering::SeqCst);
        // Suspend like a real RPC round-trip so concurrent claims interleave.
        tokio::task::yield_now().await;
        Ok(account == self.signer && self.minter.load(Ordering::SeqCst))
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<serde_json::Value>> {
        Ok(lock(&self.known_txs).get(&hash).cloned())
    }

    async fn transaction_receipt_by_hash(&self, hash: B256) -> Result<serde_json::Value> {
        let known = lock(&self.known_txs).contains_key(&hash);
        if !known {
            return Err(ChainError::TransactionNotFound(hash));
        }
        Ok(json!({ "transactionHash": hash, "status": "0x1", "blockNumber": "0x1" }))
    }

    async fn mint(&self, to: Address, amount: U256) -> Result<PendingTx> {
        self.submit(MockCall::Mint { to, amount }, MOCK_TOKEN, Bytes::new())
    }

    async fn delegate(&self, delegatee: Address) -> Result<PendingTx> {
        self.submit(MockCall::Delegate { to: delegatee }, MOCK_TOKEN, Bytes::new())
    }

    async fn get_votes(&self, account: Address) -> Result<U256> {
        if account == self.signer {
            Ok(*lock(&self.votes))
        } else {
            Ok(U256::ZERO)
        }
    }

    async fn vote(&self, proposal: U256, amount: U256) -> Result<PendingTx> {
        self.submit(MockCall::Vote { proposal, amount }, MOCK_BALLOT, Bytes::new())
    }

    async fn proposal_vote_count(&self, index: U256) -> Result<U256> {
        lock(&self.queried_proposals).push(index);
        let tallies = lock(&self.tallies);
        let i: usize = index
            .try_into()
            .map_err(|_| ChainError::Rpc("execution reverted".to_string()))?;
        tallies
            .get(i)
            .copied()
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }
}
