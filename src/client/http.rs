//! Status mapping for service responses.
//!
//! This is the only place that interprets HTTP status codes; `client/mod.rs`
//! hands every response through `check_status`.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Operation, ServiceError, ServiceResult};

/// Error body shape. The service sends `message` for its own errors and
/// `detail` for framework-level validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Pass 2xx responses through; turn everything else into a `ServiceError`.
pub(crate) async fn check_status(
    response: Response,
    operation: Operation,
) -> ServiceResult<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::BAD_GATEWAY {
        warn!(?operation, "service unavailable (502)");
        return Err(ServiceError::ServiceUnavailable);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(?operation, status = status.as_u16(), body = %body, "request failed");

    Err(ServiceError::Request {
        operation,
        status,
        message: parse_error_message(&body),
    })
}

/// Best available human-readable message from an error body.
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    [parsed.message, parsed.detail]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
}
