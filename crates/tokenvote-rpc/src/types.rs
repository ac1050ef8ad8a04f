//! Request and response types specific to the HTTP layer.
//!
//! Domain request bodies (`NewOrder`, `ClaimPayment`, `VoteForm`,
//! `DelegateVote`) live in `tokenvote-core` and are deserialized directly.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /allowance`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllowanceQuery {
    /// Token owner (hex, 0x-prefixed).
    pub from: String,
    /// Spender (hex, 0x-prefixed).
    pub to: String,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Response for `GET /address`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    /// The service signer address (hex, 0x-prefixed).
    pub address: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_uses_camel_case_status() {
        let body = ErrorBody {
            status_code: 400,
            message: "Not found".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"statusCode": 400, "message": "Not found"}));
    }

    #[test]
    fn allowance_query_deserializes() {
        let q: AllowanceQuery =
            serde_json::from_str(r#"{"from":"0x01","to":"0x02"}"#).unwrap();
        assert_eq!(q.from, "0x01");
        assert_eq!(q.to, "0x02");
    }
}
