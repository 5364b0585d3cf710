//! HTTP error mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marketq_data::DataError;
use marketq_interpreter::InterpretError;
use serde_json::json;
use tracing::error;

/// API-level error, mapped to a status code and a JSON body
#[derive(Debug)]
pub enum ApiError {
    /// Missing or empty required parameter
    BadRequest(String),

    /// Provider distinguishably has no data for the request
    NotFound(String),

    /// Unexpected upstream data failure; the provider message is echoed
    Upstream(String),

    /// Interpretation failure; the client only ever sees a generic message
    Interpretation,
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::EmptySymbol
            | DataError::InvalidDate(_)
            | DataError::InvalidDateRange { .. } => Self::BadRequest(err.to_string()),
            DataError::DataUnavailable { .. } => Self::NotFound(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<InterpretError> for ApiError {
    fn from(err: InterpretError) -> Self {
        match err {
            InterpretError::EmptyQuery => Self::BadRequest("no query provided".to_string()),
            other => {
                // Detail goes to the log only; the raw completion-service
                // failure text must not reach the client.
                error!(error = %other, "query interpretation failed");
                Self::Interpretation
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Upstream(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::Interpretation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process query".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_map_to_statuses() {
        assert!(matches!(
            ApiError::from(DataError::EmptySymbol),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(DataError::DataUnavailable {
                symbol: "X".to_string(),
                reason: "gone".to_string(),
            }),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(DataError::ProviderError("boom".to_string())),
            ApiError::Upstream(_)
        ));
    }

    #[test]
    fn interpreter_failures_hide_detail() {
        let err = ApiError::from(InterpretError::MalformedReply(
            "secret provider text".to_string(),
        ));
        assert!(matches!(err, ApiError::Interpretation));

        let err = ApiError::from(InterpretError::EmptyQuery);
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
