//! Remote rate source port.
//!
//! Implementations can be HTTP clients, fixed tables, test doubles, etc.

use crate::domain::{CurrencyCode, RateTable};
use crate::error::FetchError;

/// Port trait for remote exchange-rate providers.
///
/// No retries happen here; callers decide whether to try again.
#[async_trait::async_trait]
pub trait RemoteRateSource: Send + Sync + 'static {
    /// Fetches every target rate for `base` as of now.
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError>;
}

#[async_trait::async_trait]
impl<T: RemoteRateSource + ?Sized> RemoteRateSource for std::sync::Arc<T> {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
        (**self).fetch(base).await
    }
}
