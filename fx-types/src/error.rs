//! Error types for the exchange-rate cache.

use crate::domain::CurrencyCode;

/// Remote rate source failures.
///
/// Carries the cause verbatim; the cache policy passes it to callers unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate service returned HTTP {0}")]
    Status(u16),

    #[error("Rate service error: {0}")]
    Api(String),

    #[error("Malformed rate payload: {0}")]
    Payload(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Cache-policy errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    /// Cache miss (or stale) and the remote fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Rate store error: {0}")]
    Store(#[from] RepoError),

    #[error("Rate worker is not running")]
    WorkerStopped,
}

/// Conversion use-case errors.
///
/// The display text is what the caller shows to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("empty amount")]
    EmptyAmount,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("no connectivity")]
    NoConnectivity,

    #[error("target currency not available")]
    TargetUnavailable(CurrencyCode),

    #[error(transparent)]
    Rate(#[from] RateError),
}

impl ConvertError {
    /// Returns true for errors caused by the caller's input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConvertError::EmptyAmount
                | ConvertError::InvalidAmount
                | ConvertError::NonPositiveAmount
                | ConvertError::InvalidCurrency(_)
        )
    }
}
