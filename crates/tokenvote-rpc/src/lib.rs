//! # tokenvote-rpc
//!
//! HTTP API exposing the token, ballot and payment-order operations of
//! [`tokenvote_core::TokenVoteService`].

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::HandlerError;
pub use routes::build_router;
pub use server::{AppState, RpcServer, ServerError};
