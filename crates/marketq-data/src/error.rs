//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum DataError {
    /// No symbol supplied where one is required
    #[error("no symbol provided")]
    EmptySymbol,

    /// A date string did not parse
    #[error("invalid date '{0}': expected YYYY-MM-DD or 'current'")]
    InvalidDate(String),

    /// Start date after resolved end date
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        start: String,
        end: String,
    },

    /// Provider has no data for the requested symbol
    #[error("data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Provider returned an error or an unreadable payload
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Network or HTTP error
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::EmptySymbol;
        assert_eq!(err.to_string(), "no symbol provided");

        let err = DataError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "no rows in range".to_string(),
        };
        assert_eq!(err.to_string(), "data not available for AAPL: no rows in range");
    }
}
