//! API route definitions.
//!
//! Maps HTTP paths to handler functions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    handle_address, handle_allowance, handle_cast_vote, handle_check_voting_power,
    handle_claim_payment, handle_create_order, handle_delegate_voting_power, handle_has_minter_role,
    handle_health, handle_list_payment_orders, handle_list_votes, handle_payment_order,
    handle_recent_votes, handle_request_voting_tokens, handle_total_supply,
    handle_transaction_by_hash, handle_transaction_receipt_by_hash,
};
use crate::server::AppState;

/// Builds the axum router with all API routes.
///
/// Routes:
/// - `GET /health`, `GET /address`: service status and signer
/// - `GET /get-total-supply`, `GET /allowance?from=&to=`, `GET /has-minter-role/:address`
/// - `GET /transaction-by-hash/:hash`, `GET /transaction-receipt-by-hash/:hash`
/// - `GET /list-payment-orders`, `GET /payment-order/:id`
/// - `POST /create-order`, `POST /claim-payment`, `POST /request-voting-tokens`
/// - `GET /check-voting-power`, `POST /delegate-voting-power`
/// - `GET /list-votes`, `POST /cast-vote`, `GET /recent-votes`
pub fn build_router(state: AppState) -> Router {
    let token = Router::new()
        .route("/get-total-supply", get(handle_total_supply))
        .route("/allowance", get(handle_allowance))
        .route("/has-minter-role/:address", get(handle_has_minter_role))
        .route("/transaction-by-hash/:hash", get(handle_transaction_by_hash))
        .route(
            "/transaction-receipt-by-hash/:hash",
            get(handle_transaction_receipt_by_hash),
        )
        .route("/check-voting-power", get(handle_check_voting_power))
        .route("/delegate-voting-power", post(handle_delegate_voting_power));

    let orders = Router::new()
        .route("/list-payment-orders", get(handle_list_payment_orders))
        .route("/payment-order/:id", get(handle_payment_order))
        .route("/create-order", post(handle_create_order))
        .route("/claim-payment", post(handle_claim_payment))
        .route("/request-voting-tokens", post(handle_request_voting_tokens));

    let ballot = Router::new()
        .route("/list-votes", get(handle_list_votes))
        .route("/cast-vote", post(handle_cast_vote))
        .route("/recent-votes", get(handle_recent_votes));

    let public = Router::new()
        .route("/health", get(handle_health))
        .route("/address", get(handle_address));

    public
        .merge(token)
        .merge(orders)
        .merge(ballot)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
