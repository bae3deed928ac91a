//! Storage port traits.
//!
//! Adapters (SQLite, in-memory) implement these. Neither trait promises any
//! serialization between callers beyond the per-call atomicity documented
//! on each method; the cache policy provides the single-writer discipline.

use crate::domain::{
    CachedRate, CurrencyCode, FavoriteConversion, FavoriteId, NewFavorite, RateTable,
};
use crate::error::RepoError;

/// Persistent `(base, target) -> (rate, fetched_at)` table.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Point lookup.
    async fn get(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<CachedRate>, RepoError>;

    /// All cached targets for a base currency.
    async fn get_all_for_base(&self, base: &CurrencyCode) -> Result<Vec<CachedRate>, RepoError>;

    /// Replaces the row set of `base` with one row per entry of `rates`,
    /// all stamped `fetched_at`.
    ///
    /// MUST be atomic: readers of `base` see the old set or the new set.
    async fn put_many(
        &self,
        base: &CurrencyCode,
        rates: &RateTable,
        fetched_at: i64,
    ) -> Result<usize, RepoError>;

    /// Removes rows with `fetched_at < cutoff`. Returns the number removed.
    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, RepoError>;

    /// Drops every row. Returns the number removed.
    async fn clear(&self) -> Result<u64, RepoError>;
}

#[async_trait::async_trait]
impl<T: RateStore + ?Sized> RateStore for std::sync::Arc<T> {
    async fn get(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<CachedRate>, RepoError> {
        (**self).get(base, target).await
    }

    async fn get_all_for_base(&self, base: &CurrencyCode) -> Result<Vec<CachedRate>, RepoError> {
        (**self).get_all_for_base(base).await
    }

    async fn put_many(
        &self,
        base: &CurrencyCode,
        rates: &RateTable,
        fetched_at: i64,
    ) -> Result<usize, RepoError> {
        (**self).put_many(base, rates, fetched_at).await
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, RepoError> {
        (**self).delete_older_than(cutoff).await
    }

    async fn clear(&self) -> Result<u64, RepoError> {
        (**self).clear().await
    }
}

/// Persistence for saved favorite conversions.
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync + 'static {
    /// Stores a favorite under a freshly generated id.
    async fn insert(&self, favorite: NewFavorite) -> Result<FavoriteConversion, RepoError>;

    /// Deletes the given record. Returns whether it existed.
    async fn delete(&self, favorite: &FavoriteConversion) -> Result<bool, RepoError>;

    /// Deletes by id. Returns whether it existed.
    async fn delete_by_id(&self, id: FavoriteId) -> Result<bool, RepoError>;

    /// Every favorite, newest first.
    async fn list_recent(&self) -> Result<Vec<FavoriteConversion>, RepoError>;
}
