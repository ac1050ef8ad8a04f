//! Payment-order ledger.
//!
//! Orders are created by an operator and later claimed by whoever holds the
//! order's secret. A successful claim mints `amount` tokens to an address of
//! the claimant's choosing, signed by the service's own key.
//!
//! Each order moves through [`OrderStatus`]:
//!
//! ```text
//! Created ──claim──▶ Claiming ──mint submitted──▶ Claimed
//!    ▲                  │
//!    └──────────────────┘  no minter role / chain failure / dropped before mint
//! ```
//!
//! The `Claiming` reservation is taken under the ledger lock before the first
//! chain call, so two concurrent claims for the same order cannot both reach
//! the mint. The lock itself is never held across an `.await`.

use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::chain::{ChainClient, ChainError, PendingTx};
use crate::units::to_base_units;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Not found")]
    NotFound(String),
    #[error("address {address} has no minter role")]
    Unauthorized { address: String },
    #[error("invalid secret for order {0}")]
    InvalidSecret(String),
    #[error("order {0} has already been claimed")]
    AlreadyClaimed(String),
    #[error("order {0} already exists")]
    DuplicateOrder(String),
    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("internal lock error")]
    LockPoisoned,
}

/// Result alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Lifecycle state of a payment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting to be claimed.
    Created,
    /// A claim is in flight; other claims are rejected.
    Claiming,
    /// The mint transaction has been submitted.
    Claimed,
}

/// Request body for creating an order.
#[derive(Clone, Deserialize, Serialize)]
pub struct NewOrder {
    /// Caller-chosen order identifier.
    pub id: String,
    /// Credential the claimant must present.
    pub secret: String,
    /// Amount to mint, in token units.
    #[serde(with = "crate::units::exact_amount")]
    pub amount: Decimal,
}

impl fmt::Debug for NewOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewOrder")
            .field("id", &self.id)
            .field("amount", &self.amount)
            .finish_non_exhaustive()
    }
}

/// Request body for claiming an order.
#[derive(Clone, Deserialize, Serialize)]
pub struct ClaimPayment {
    /// Order to claim.
    pub id: String,
    /// Secret supplied when the order was created.
    pub secret: String,
    /// Recipient of the minted tokens (hex, 0x-prefixed).
    pub address: String,
}

impl fmt::Debug for ClaimPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimPayment")
            .field("id", &self.id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Public projection of an order. The secret never leaves the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    #[serde(with = "crate::units::exact_amount")]
    pub amount: Decimal,
}

/// A stored payment order.
#[derive(Clone)]
pub struct PaymentOrder {
    pub id: String,
    secret_hash: [u8; 32],
    pub amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    /// Hash of the mint transaction, once claimed.
    pub claim_tx: Option<B256>,
}

impl fmt::Debug for PaymentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentOrder")
            .field("id", &self.id)
            .field("amount", &self.amount)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("claimed_at", &self.claimed_at)
            .field("claim_tx", &self.claim_tx)
            .finish_non_exhaustive()
    }
}

impl PaymentOrder {
    fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id.clone(),
            amount: self.amount,
        }
    }

    fn secret_matches(&self, secret: &str) -> bool {
        hash_secret(secret) == self.secret_hash
    }
}

/// In-memory, insertion-ordered collection of payment orders.
#[derive(Default)]
pub struct OrderLedger {
    orders: RwLock<Vec<PaymentOrder>>,
}

impl fmt::Debug for OrderLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.orders.read().map(|o| o.len()).unwrap_or_default();
        f.debug_struct("OrderLedger").field("orders", &len).finish()
    }
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new order.
    ///
    /// Rejects ids already present in the ledger and amounts that cannot be
    /// minted (negative, or finer than 18 decimals).
    pub fn create(&self, order: NewOrder) -> Result<()> {
        to_base_units(order.amount).map_err(|reason| LedgerError::InvalidAmount {
            value: order.amount.to_string(),
            reason,
        })?;

        let mut orders = self.write()?;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(LedgerError::DuplicateOrder(order.id));
        }

        info!(id = %order.id, amount = %order.amount, "payment order created");
        orders.push(PaymentOrder {
            id: order.id,
            secret_hash: hash_secret(&order.secret),
            amount: order.amount,
            status: OrderStatus::Created,
            created_at: Utc::now(),
            claimed_at: None,
            claim_tx: None,
        });
        Ok(())
    }

    /// All orders in insertion order.
    pub fn list(&self) -> Result<Vec<OrderSummary>> {
        Ok(self.read()?.iter().map(PaymentOrder::summary).collect())
    }

    /// Look up a single order.
    pub fn get(&self, id: &str) -> Result<OrderSummary> {
        self.read()?
            .iter()
            .find(|o| o.id == id)
            .map(PaymentOrder::summary)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    /// Full record of an order, including its status.
    pub fn order(&self, id: &str) -> Result<PaymentOrder> {
        self.read()?
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    /// Number of orders in the ledger.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Claim an order: verify the secret, check that the service signer can
    /// mint, and submit a mint of the order amount to `claim.address`.
    ///
    /// Unknown ids and wrong secrets are rejected before any chain call. If
    /// the returned future is dropped before the mint is sent, the order goes
    /// back to `Created`; once the mint is in flight it stays `Claiming`.
    pub async fn claim(&self, chain: &dyn ChainClient, claim: ClaimPayment) -> Result<PendingTx> {
        let (recipient, amount) = self.reserve(&claim)?;
        let reservation = Reservation::new(self, &claim.id);

        self.check_minter(chain, &claim).await?;

        reservation.disarm();
        let tx = match chain.mint(recipient, amount).await {
            Ok(tx) => tx,
            Err(e) => {
                error!(id = %claim.id, "mint submission failed: {e}");
                if let Err(release_err) = self.release(&claim.id) {
                    error!(id = %claim.id, "failed to release claim reservation: {release_err}");
                }
                return Err(LedgerError::Chain(e));
            }
        };

        if let Err(e) = self.finish(&claim.id, tx.hash) {
            error!(id = %claim.id, tx = %tx.hash, "mint submitted but order not marked claimed: {e}");
        }
        info!(id = %claim.id, to = %recipient, tx = %tx.hash, "payment order claimed");
        Ok(tx)
    }

    /// Validate the claim and move the order to `Claiming`.
    fn reserve(&self, claim: &ClaimPayment) -> Result<(Address, U256)> {
        let mut orders = self.write()?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == claim.id)
            .ok_or_else(|| LedgerError::NotFound(claim.id.clone()))?;

        if !order.secret_matches(&claim.secret) {
            warn!(id = %claim.id, "claim rejected: secret mismatch");
            return Err(LedgerError::InvalidSecret(claim.id.clone()));
        }

        let recipient: Address = claim
            .address
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidAddress(claim.address.clone()))?;

        if order.status != OrderStatus::Created {
            return Err(LedgerError::AlreadyClaimed(claim.id.clone()));
        }

        let amount = to_base_units(order.amount).map_err(|reason| LedgerError::InvalidAmount {
            value: order.amount.to_string(),
            reason,
        })?;

        order.status = OrderStatus::Claiming;
        Ok((recipient, amount))
    }

    async fn check_minter(&self, chain: &dyn ChainClient, claim: &ClaimPayment) -> Result<()> {
        let signer = chain.signer_address();
        let is_minter = chain.has_minter_role(signer).await.map_err(|e| {
            error!(id = %claim.id, "minter role check failed: {e}");
            LedgerError::Chain(e)
        })?;

        if !is_minter {
            warn!(id = %claim.id, signer = %signer, "claim rejected: signer has no minter role");
            return Err(LedgerError::Unauthorized {
                address: claim.address.clone(),
            });
        }
        Ok(())
    }

    fn finish(&self, id: &str, tx: B256) -> Result<()> {
        let mut orders = self.write()?;
        if let Some(order) = orders.iter_mut().find(|o| o.id == id) {
            order.status = OrderStatus::Claimed;
            order.claimed_at = Some(Utc::now());
            order.claim_tx = Some(tx);
        }
        Ok(())
    }

    fn release(&self, id: &str) -> Result<()> {
        let mut orders = self.write()?;
        if let Some(order) = orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Claiming)
        {
            order.status = OrderStatus::Created;
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<PaymentOrder>>> {
        self.orders.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<PaymentOrder>>> {
        self.orders.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

/// A `Claiming` reservation that is handed back to `Created` when dropped,
/// unless disarmed first.
struct Reservation<'a> {
    ledger: &'a OrderLedger,
    id: &'a str,
    armed: bool,
}

impl<'a> Reservation<'a> {
    fn new(ledger: &'a OrderLedger, id: &'a str) -> Self {
        Self {
            ledger,
            id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.ledger.release(self.id) {
            error!(id = %self.id, "failed to release claim reservation: {e}");
        }
    }
}

/// SHA-256 of an order secret; only the digest is kept in memory.
fn hash_secret(secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}
