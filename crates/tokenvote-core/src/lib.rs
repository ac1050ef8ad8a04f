//! # tokenvote-core
//!
//! Payment-order ledger, vote log, and the service facade that backs the
//! tokenvote HTTP API. Chain access goes through the [`chain::ChainClient`]
//! trait so everything here can be exercised without a node.

pub mod chain;
pub mod config;
pub mod ledger;
pub mod service;
pub mod units;
pub mod votes;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use chain::{ChainClient, ChainError, PendingTx};
pub use ledger::{ClaimPayment, LedgerError, NewOrder, OrderLedger, OrderStatus, OrderSummary};
pub use service::{DelegateVote, ServiceError, TokenVoteService};
pub use votes::{Vote, VoteForm, VoteLog};
