use crate::domain::model::UpstreamPayload;
use crate::utils::error::{ProxyError, Result};
use crate::utils::redact::CredentialRedactor;
use serde::{Deserialize, Serialize};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// `{"error": "..."}` body of every failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Status and JSON body handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    /// Upstream body, byte for byte.
    pub fn success(payload: UpstreamPayload) -> Self {
        Self {
            status: 200,
            body: payload.into_string(),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        // A struct with one string field always serializes.
        let body = serde_json::to_string(&body).unwrap_or_else(|_| {
            format!("{{\"error\":\"{}\"}}", INTERNAL_ERROR_MESSAGE)
        });
        Self { status, body }
    }

    pub fn internal_error() -> Self {
        Self::error(500, INTERNAL_ERROR_MESSAGE)
    }

    pub fn from_error(err: &ProxyError, redactor: &CredentialRedactor) -> Self {
        Self::error(err.status_code(), redactor.redact(&err.to_string()))
    }

    pub fn from_result(result: Result<UpstreamPayload>, redactor: &CredentialRedactor) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::from_error(&err, redactor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_keeps_body_verbatim() {
        let raw = r#"{ "trademarks": [ {"wordmark": "STARBUCKS"} ], "count": 1 }"#;
        let relay = RelayResponse::success(UpstreamPayload::new(raw.to_string()));

        assert_eq!(relay.status, 200);
        assert_eq!(relay.body, raw);
    }

    #[test]
    fn test_missing_parameter_maps_to_400() {
        let redactor = CredentialRedactor::new("secret");
        let relay = RelayResponse::from_result(
            Err(ProxyError::missing_parameter("Search parameter is required")),
            &redactor,
        );

        assert_eq!(relay.status, 400);
        assert_eq!(relay.body, r#"{"error":"Search parameter is required"}"#);
    }

    #[test]
    fn test_server_error_is_redacted() {
        let redactor = CredentialRedactor::new("secret");
        let err = ProxyError::UpstreamExhausted {
            last_error: "bad url /password/secret".to_string(),
        };
        let relay = RelayResponse::from_error(&err, &redactor);

        assert_eq!(relay.status, 500);
        let body: ErrorBody = serde_json::from_str(&relay.body).unwrap();
        assert_eq!(body.error, "All API endpoints failed. Last error: bad url /password/***");
    }
}
