//! Transaction building and broadcasting.
//!
//! Builders produce unsigned requests carrying only target and calldata.
//! Nonce, gas, fees and the signature are filled in by the adapter's wallet
//! provider when the request is sent.

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use thiserror::Error;
use tracing::debug;

use tokenvote_core::{ChainError, PendingTx};

use crate::abi::{ITokenizedBallot, IVoteToken};
use crate::adapter::EvmAdapter;

/// Errors from transaction operations.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("RPC send error: {0}")]
    Send(String),
    #[error("transaction has no call target")]
    MissingTarget,
}

impl From<TxError> for ChainError {
    fn from(e: TxError) -> Self {
        ChainError::Rpc(e.to_string())
    }
}

/// Result alias for transaction operations.
pub type Result<T> = std::result::Result<T, TxError>;

fn contract_call(contract: Address, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest::default()
        .to(contract)
        .input(Bytes::from(data).into())
}

/// Builds a token `mint(to, amount)` transaction request.
pub fn build_mint(token: Address, to: Address, amount: U256) -> TransactionRequest {
    contract_call(token, IVoteToken::mintCall { to, amount }.abi_encode())
}

/// Builds a token `delegate(delegatee)` transaction request.
pub fn build_delegate(token: Address, delegatee: Address) -> TransactionRequest {
    contract_call(token, IVoteToken::delegateCall { delegatee }.abi_encode())
}

/// Builds a ballot `vote(proposal, amount)` transaction request.
pub fn build_vote(ballot: Address, proposal: U256, amount: U256) -> TransactionRequest {
    contract_call(ballot, ITokenizedBallot::voteCall { proposal, amount }.abi_encode())
}

/// Signs and broadcasts a transaction through the adapter's wallet.
///
/// Returns as soon as the node accepts the transaction; the receipt is not
/// awaited.
pub async fn send_transaction(adapter: &EvmAdapter, tx: TransactionRequest) -> Result<PendingTx> {
    let from = adapter.signer_address();
    let to = tx
        .to
        .and_then(|kind| kind.to().copied())
        .ok_or(TxError::MissingTarget)?;
    let data = tx.input.input().cloned().unwrap_or_default();

    let pending = adapter
        .provider()
        .send_transaction(tx.from(from))
        .await
        .map_err(|e| TxError::Send(e.to_string()))?;

    let hash = *pending.tx_hash();
    debug!(%hash, %to, "transaction submitted");

    Ok(PendingTx {
        hash,
        from,
        to,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::TxKind;

    #[test]
    fn build_mint_encodes_calldata() {
        let token = Address::repeat_byte(0x70);
        let to = Address::with_last_byte(1);
        let amount = U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64));

        let tx = build_mint(token, to, amount);

        // Sent to the token contract with no ETH value
        assert_eq!(tx.to, Some(TxKind::Call(token)));
        assert!(tx.value.is_none());
        let input = tx.input.input().unwrap();
        // mint selector = 0x40c10f19
        assert_eq!(hex::encode(&input[..4]), "40c10f19");
        assert_eq!(input.len(), 68);
        assert_eq!(&input[16..36], to.as_slice());
    }

    #[test]
    fn build_delegate_encodes_calldata() {
        let token = Address::repeat_byte(0x70);
        let delegatee = Address::with_last_byte(7);

        let tx = build_delegate(token, delegatee);

        assert_eq!(tx.to, Some(TxKind::Call(token)));
        let input = tx.input.input().unwrap();
        assert_eq!(hex::encode(&input[..4]), "5c19a95c");
        assert_eq!(input.len(), 36);
    }

    #[test]
    fn build_vote_targets_ballot() {
        let ballot = Address::repeat_byte(0xba);

        let tx = build_vote(ballot, U256::from(2u64), U256::from(5u64));

        assert_eq!(tx.to, Some(TxKind::Call(ballot)));
        let input = tx.input.input().unwrap();
        assert_eq!(hex::encode(&input[..4]), "b384abef");
        // proposal index is the first word
        assert_eq!(input[35], 2);
        assert_eq!(input[67], 5);
    }

    #[test]
    fn builders_leave_gas_and_nonce_to_the_provider() {
        let tx = build_mint(Address::ZERO, Address::ZERO, U256::from(1u64));
        assert!(tx.nonce.is_none());
        assert!(tx.gas.is_none());
        assert!(tx.chain_id.is_none());
    }

    #[test]
    fn tx_errors_map_to_chain_errors() {
        let e: ChainError = TxError::Send("nonce too low".into()).into();
        assert!(matches!(e, ChainError::Rpc(m) if m.contains("nonce too low")));
        let e: ChainError = TxError::MissingTarget.into();
        assert!(matches!(e, ChainError::Rpc(m) if m.contains("no call target")));
    }
}
