//! In-process adapters backed by `DashMap`.
//!
//! Rates are keyed by base currency, so replacing a base's row set is a
//! single map-entry swap and readers never see a half-written set.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use fx_types::{
    CachedRate, CurrencyCode, FavoriteConversion, FavoriteId, FavoriteStore, NewFavorite,
    RateStore, RateTable, RepoError,
};

/// In-memory rate store.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    rows: DashMap<CurrencyCode, Vec<CachedRate>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all bases.
    pub fn len(&self) -> usize {
        self.rows.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<CachedRate>, RepoError> {
        Ok(self
            .rows
            .get(base)
            .and_then(|rows| rows.iter().find(|r| &r.target == target).cloned()))
    }

    async fn get_all_for_base(&self, base: &CurrencyCode) -> Result<Vec<CachedRate>, RepoError> {
        Ok(self
            .rows
            .get(base)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    async fn put_many(
        &self,
        base: &CurrencyCode,
        rates: &RateTable,
        fetched_at: i64,
    ) -> Result<usize, RepoError> {
        let rows: Vec<CachedRate> = rates
            .iter()
            .map(|(target, rate)| CachedRate {
                base: base.clone(),
                target: target.clone(),
                rate,
                fetched_at,
            })
            .collect();
        let written = rows.len();

        if rows.is_empty() {
            self.rows.remove(base);
        } else {
            self.rows.insert(base.clone(), rows);
        }
        Ok(written)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, RepoError> {
        let mut removed = 0u64;
        self.rows.retain(|_, rows| {
            let before = rows.len();
            rows.retain(|r| r.fetched_at >= cutoff);
            removed += (before - rows.len()) as u64;
            !rows.is_empty()
        });
        Ok(removed)
    }

    async fn clear(&self) -> Result<u64, RepoError> {
        let removed = self.len() as u64;
        self.rows.clear();
        Ok(removed)
    }
}

/// In-memory favorites store.
///
/// Each entry carries its insertion sequence, which breaks `created_at` ties
/// the same way SQLite's `rowid` does.
#[derive(Debug, Default)]
pub struct MemoryFavoriteStore {
    favorites: DashMap<FavoriteId, (u64, FavoriteConversion)>,
    next_seq: AtomicU64,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn insert(&self, favorite: NewFavorite) -> Result<FavoriteConversion, RepoError> {
        let stored = FavoriteConversion::from_new(FavoriteId::new(), favorite);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.favorites.insert(stored.id, (seq, stored.clone()));
        Ok(stored)
    }

    async fn delete(&self, favorite: &FavoriteConversion) -> Result<bool, RepoError> {
        self.delete_by_id(favorite.id).await
    }

    async fn delete_by_id(&self, id: FavoriteId) -> Result<bool, RepoError> {
        Ok(self.favorites.remove(&id).is_some())
    }

    async fn list_recent(&self) -> Result<Vec<FavoriteConversion>, RepoError> {
        let mut all: Vec<(u64, FavoriteConversion)> = self
            .favorites
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(all.into_iter().map(|(_, favorite)| favorite).collect())
    }
}
