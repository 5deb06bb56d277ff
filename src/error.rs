use crate::diagnostics::{summarize, InvariantViolation};
use thiserror::Error;

/// Fatal errors that abort an evaluation.
///
/// Everything recoverable (provenance mismatches, invalid model inputs,
/// low-confidence favorites, lenient-mode invariant breaks) is recorded in
/// [`crate::diagnostics::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum TrustlineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Market errors
    #[error("No spread quote available for contest {contest_id}")]
    MissingMandatoryMarket { contest_id: String },

    #[error("Unable to resolve favorite: {0}")]
    UnresolvedFavorite(String),

    #[error("Invariant violation ({count} failed): {summary}")]
    InvariantViolation { count: usize, summary: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TrustlineError
pub type Result<T> = std::result::Result<T, TrustlineError>;

impl TrustlineError {
    /// Fatal error for a non-empty set of broken invariants
    pub fn invariants(violations: &[InvariantViolation]) -> Self {
        TrustlineError::InvariantViolation {
            count: violations.len(),
            summary: summarize(violations),
        }
    }

    /// Whether this error came from the market data rather than from setup.
    pub fn is_market_error(&self) -> bool {
        matches!(
            self,
            TrustlineError::MissingMandatoryMarket { .. }
                | TrustlineError::UnresolvedFavorite(_)
                | TrustlineError::InvariantViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_market_message_names_contest() {
        let err = TrustlineError::MissingMandatoryMarket {
            contest_id: "401547".to_string(),
        };
        assert!(err.to_string().contains("401547"));
        assert!(err.is_market_error());
    }

    #[test]
    fn test_config_errors_are_not_market_errors() {
        let err = TrustlineError::InvalidConfig("cap_spread must be positive".into());
        assert!(!err.is_market_error());
    }
}
