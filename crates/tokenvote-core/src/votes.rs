//! Record of votes cast through this service.

use std::sync::RwLock;

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Request body for casting a vote.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoteForm {
    /// Proposal index on the ballot, as a decimal string.
    pub proposal: String,
    /// Voting weight in token units.
    #[serde(with = "crate::units::exact_amount")]
    pub amount: Decimal,
}

/// A vote submitted by the service signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub proposal: String,
    #[serde(with = "crate::units::exact_amount")]
    pub amount: Decimal,
    /// Signer that cast the vote.
    pub from: Address,
    pub tx_hash: B256,
    pub cast_at: DateTime<Utc>,
}

/// Append-only, in-memory vote log.
#[derive(Debug, Default)]
pub struct VoteLog {
    votes: RwLock<Vec<Vote>>,
}

impl VoteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, vote: Vote) -> Result<(), LedgerError> {
        self.votes
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?
            .push(vote);
        Ok(())
    }

    /// Votes in the order they were cast.
    pub fn list(&self) -> Result<Vec<Vote>, LedgerError> {
        Ok(self
            .votes
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?
            .clone())
    }
}

#[cfg(test)]
impl VoteLog {
    /// Leave the lock poisoned, as a writer that panicked would.
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.votes.write();
                panic!("poisoning vote log");
            })
            .join()
        });
    }
}
