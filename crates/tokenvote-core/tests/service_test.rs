use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use rust_decimal::Decimal;

use tokenvote_core::mock::{MockCall, MockChain};
use tokenvote_core::{
    ChainError, ClaimPayment, DelegateVote, LedgerError, NewOrder, ServiceError, TokenVoteService,
    VoteForm,
};

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn setup() -> (Arc<MockChain>, TokenVoteService) {
    let chain = Arc::new(MockChain::new(Address::with_last_byte(0x51)));
    let service = TokenVoteService::new(chain.clone());
    (chain, service)
}

#[tokio::test]
async fn total_supply_is_formatted_in_token_units() {
    let (chain, service) = setup();
    chain.set_total_supply(ether(1500) + U256::from(250_000_000_000_000_000u64));
    assert_eq!(service.total_supply().await.unwrap(), "1500.25");
}

#[tokio::test]
async fn allowance_parses_both_addresses() {
    let (_chain, service) = setup();
    let owner = format!("{}", Address::with_last_byte(2));
    let spender = format!("{}", Address::with_last_byte(3));
    assert_eq!(service.allowance(&owner, &spender).await.unwrap(), "5.0");

    let err = service.allowance("nope", &spender).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidAddress(v) if v == "nope"));
}

#[tokio::test]
async fn has_minter_role_reports_signer_role() {
    let (chain, service) = setup();
    let signer = format!("{}", service.signer_address());
    assert!(service.has_minter_role(&signer).await.unwrap());

    chain.set_minter(false);
    assert!(!service.has_minter_role(&signer).await.unwrap());
}

#[tokio::test]
async fn check_voting_power_reads_signer_votes() {
    let (chain, service) = setup();
    chain.set_votes(ether(42));
    assert_eq!(service.check_voting_power().await.unwrap(), "42.0");
}

#[tokio::test]
async fn delegate_submits_delegation() {
    let (chain, service) = setup();
    let to = Address::with_last_byte(7);

    let tx = service
        .delegate_voting_power(DelegateVote {
            to: format!("{to}"),
        })
        .await
        .unwrap();

    assert_eq!(chain.calls(), vec![MockCall::Delegate { to }]);
    assert_eq!(tx.from, service.signer_address());
}

#[tokio::test]
async fn delegate_rejects_bad_address_without_submitting() {
    let (chain, service) = setup();
    let err = service
        .delegate_voting_power(DelegateVote { to: "0x12".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidAddress(_)));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn transaction_lookup_round_trips_submitted_hash() {
    let (_chain, service) = setup();
    let tx = service
        .delegate_voting_power(DelegateVote {
            to: format!("{}", Address::with_last_byte(7)),
        })
        .await
        .unwrap();
    let hash = format!("{}", tx.hash);

    let found = service.transaction_by_hash(&hash).await.unwrap().unwrap();
    assert_eq!(found["hash"], serde_json::json!(tx.hash));

    let receipt = service.transaction_receipt_by_hash(&hash).await.unwrap();
    assert_eq!(receipt["status"], "0x1");
}

#[tokio::test]
async fn unknown_transaction_is_none_and_receipt_errors() {
    let (_chain, service) = setup();
    let hash = format!("{}", B256::repeat_byte(0xee));

    assert!(service.transaction_by_hash(&hash).await.unwrap().is_none());
    let err = service.transaction_receipt_by_hash(&hash).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Chain(ChainError::TransactionNotFound(_))
    ));
}

#[tokio::test]
async fn order_lifecycle_through_service() {
    let (chain, service) = setup();
    service
        .create_order(NewOrder {
            id: "a".into(),
            secret: "pw".into(),
            amount: Decimal::from(3),
        })
        .unwrap();

    let listed = service.list_orders().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(service.get_order("a").unwrap().amount, Decimal::from(3));

    let to = Address::with_last_byte(0x99);
    service
        .claim_payment(ClaimPayment {
            id: "a".into(),
            secret: "pw".into(),
            address: format!("{to}"),
        })
        .await
        .unwrap();
    assert_eq!(chain.mint_calls(), vec![(to, ether(3))]);
}

#[tokio::test]
async fn get_unknown_order_is_not_found() {
    let (_chain, service) = setup();
    let err = service.get_order("missing").unwrap_err();
    assert!(matches!(err, ServiceError::Ledger(LedgerError::NotFound(_))));
    assert_eq!(err.to_string(), "Not found");
}

#[tokio::test]
async fn request_voting_tokens_is_accepted_without_effect() {
    let (chain, service) = setup();
    let ok = service.request_voting_tokens(ClaimPayment {
        id: "any".into(),
        secret: "any".into(),
        address: "whatever".into(),
    });
    assert!(ok);
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn cast_vote_submits_and_records() {
    let (chain, service) = setup();

    let tx = service
        .cast_vote(VoteForm {
            proposal: "1".into(),
            amount: "2.5".parse().unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(
        chain.calls(),
        vec![MockCall::Vote {
            proposal: U256::from(1),
            amount: U256::from(2_500_000_000_000_000_000u64),
        }]
    );
    let recent = service.recent_votes().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].proposal, "1");
    assert_eq!(recent[0].tx_hash, tx.hash);
    assert_eq!(recent[0].from, service.signer_address());
}

#[tokio::test]
async fn cast_vote_rejects_non_numeric_proposal() {
    let (chain, service) = setup();
    let err = service
        .cast_vote(VoteForm {
            proposal: "first".into(),
            amount: Decimal::ONE,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidProposal(p) if p == "first"));
    assert!(chain.calls().is_empty());
    assert!(service.recent_votes().unwrap().is_empty());
}

#[tokio::test]
async fn failed_vote_is_not_recorded() {
    let (chain, service) = setup();
    chain.set_fail_writes(true);
    let result = service
        .cast_vote(VoteForm {
            proposal: "0".into(),
            amount: Decimal::ONE,
        })
        .await;
    assert!(result.is_err());
    assert!(service.recent_votes().unwrap().is_empty());
}

#[tokio::test]
async fn list_votes_queries_first_three_proposals_in_order() {
    let (chain, service) = setup();
    chain.set_tallies(vec![
        ether(12) + U256::from(500_000_000_000_000_000u64),
        U256::ZERO,
        ether(3),
    ]);

    let tallies = service.list_votes().await.unwrap();

    assert_eq!(tallies, vec!["12.5 ETH", "0.0 ETH", "3.0 ETH"]);
    assert_eq!(
        chain.queried_proposals(),
        vec![U256::from(0), U256::from(1), U256::from(2)]
    );
}

#[tokio::test]
async fn list_votes_fails_when_any_proposal_read_fails() {
    let (chain, service) = setup();
    chain.set_tallies(vec![ether(1), ether(2)]);
    let err = service.list_votes().await.unwrap_err();
    assert!(matches!(err, ServiceError::Chain(_)));
}
