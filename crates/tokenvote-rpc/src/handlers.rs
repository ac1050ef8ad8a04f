//! Request handlers for the HTTP API.
//!
//! Each handler extracts its inputs, calls into [`TokenVoteService`] and
//! serializes the result as JSON. Failures are mapped to
//! `{"statusCode", "message"}` bodies by [`HandlerError`].
//!
//! [`TokenVoteService`]: tokenvote_core::TokenVoteService

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use tokenvote_core::{
    ChainError, ClaimPayment, DelegateVote, LedgerError, NewOrder, OrderSummary, PendingTx,
    ServiceError, Vote, VoteForm,
};

use crate::server::AppState;
use crate::types::{AddressResponse, AllowanceQuery, ErrorBody, HealthResponse};

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Chain(ChainError::TransactionNotFound(_)) => {
                HandlerError::BadRequest(e.to_string())
            }
            ServiceError::Chain(_) | ServiceError::Ledger(LedgerError::Chain(_)) => {
                HandlerError::Upstream(e.to_string())
            }
            ServiceError::Ledger(LedgerError::LockPoisoned) => {
                HandlerError::Internal(e.to_string())
            }
            _ => HandlerError::BadRequest(e.to_string()),
        }
    }
}

impl From<JsonRejection> for HandlerError {
    fn from(e: JsonRejection) -> Self {
        HandlerError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for HandlerError {
    fn from(e: QueryRejection) -> Self {
        HandlerError::BadRequest(e.body_text())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {self}");
        }
        let body = ErrorBody {
            status_code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type HandlerResult<T> = Result<Json<T>, HandlerError>;

// ---- Handlers ----

/// Health check. Always returns `{"status": "ok"}`.
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Returns the address that signs every transaction sent by this service.
pub async fn handle_address(State(state): State<AppState>) -> Json<AddressResponse> {
    Json(AddressResponse {
        address: state.service.signer_address().to_string(),
    })
}

pub async fn handle_total_supply(State(state): State<AppState>) -> HandlerResult<String> {
    Ok(Json(state.service.total_supply().await?))
}

pub async fn handle_allowance(
    State(state): State<AppState>,
    query: Result<Query<AllowanceQuery>, QueryRejection>,
) -> HandlerResult<String> {
    let Query(query) = query?;
    Ok(Json(state.service.allowance(&query.from, &query.to).await?))
}

/// Raw transaction object, or `null` for an unknown hash.
pub async fn handle_transaction_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> HandlerResult<Option<serde_json::Value>> {
    Ok(Json(state.service.transaction_by_hash(&hash).await?))
}

/// Receipt of a transaction. Blocks until it is mined or the wait times out.
pub async fn handle_transaction_receipt_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> HandlerResult<serde_json::Value> {
    Ok(Json(state.service.transaction_receipt_by_hash(&hash).await?))
}

pub async fn handle_has_minter_role(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> HandlerResult<bool> {
    Ok(Json(state.service.has_minter_role(&address).await?))
}

pub async fn handle_check_voting_power(State(state): State<AppState>) -> HandlerResult<String> {
    Ok(Json(state.service.check_voting_power().await?))
}

pub async fn handle_delegate_voting_power(
    State(state): State<AppState>,
    body: Result<Json<DelegateVote>, JsonRejection>,
) -> HandlerResult<PendingTx> {
    let Json(req) = body?;
    Ok(Json(state.service.delegate_voting_power(req).await?))
}

pub async fn handle_list_payment_orders(
    State(state): State<AppState>,
) -> HandlerResult<Vec<OrderSummary>> {
    Ok(Json(state.service.list_orders()?))
}

pub async fn handle_payment_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<OrderSummary> {
    Ok(Json(state.service.get_order(&id)?))
}

/// Stores a new order. Responds `204 No Content`.
pub async fn handle_create_order(
    State(state): State<AppState>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<StatusCode, HandlerError> {
    let Json(order) = body?;
    state.service.create_order(order)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_claim_payment(
    State(state): State<AppState>,
    body: Result<Json<ClaimPayment>, JsonRejection>,
) -> HandlerResult<PendingTx> {
    let Json(claim) = body?;
    info!(id = %claim.id, to = %claim.address, "claim requested");
    Ok(Json(state.service.claim_payment(claim).await?))
}

pub async fn handle_request_voting_tokens(
    State(state): State<AppState>,
    body: Result<Json<ClaimPayment>, JsonRejection>,
) -> HandlerResult<bool> {
    let Json(req) = body?;
    Ok(Json(state.service.request_voting_tokens(req)))
}

pub async fn handle_cast_vote(
    State(state): State<AppState>,
    body: Result<Json<VoteForm>, JsonRejection>,
) -> HandlerResult<PendingTx> {
    let Json(form) = body?;
    Ok(Json(state.service.cast_vote(form).await?))
}

/// Tallies of the listed proposals, e.g. `["12.5 ETH", "0.0 ETH", "3.0 ETH"]`.
pub async fn handle_list_votes(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.service.list_votes().await?))
}

pub async fn handle_recent_votes(State(state): State<AppState>) -> HandlerResult<Vec<Vote>> {
    Ok(Json(state.service.recent_votes()?))
}
