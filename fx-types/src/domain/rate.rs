//! Cached exchange-rate rows and the snapshots built from them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::currency::{CurrencyCode, RateTable};

/// One persisted `(base, target)` rate.
///
/// `1 base == rate target`. `fetched_at` is epoch milliseconds; every row
/// of a base is written with the same stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRate {
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    pub rate: f64,
    pub fetched_at: i64,
}

impl CachedRate {
    /// Milliseconds elapsed between `fetched_at` and `now_millis`.
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.fetched_at)
    }

    /// Returns true while the row is younger than `window`.
    pub fn is_fresh(&self, now_millis: i64, window: Duration) -> bool {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now_millis) < window_ms
    }
}

/// Where a snapshot's rates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Cache,
    Remote,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOrigin::Cache => f.write_str("cache"),
            RateOrigin::Remote => f.write_str("remote"),
        }
    }
}

/// Full rate set for a base currency as resolved by the cache policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: CurrencyCode,
    pub rates: RateTable,
    pub fetched_at: i64,
    pub origin: RateOrigin,
}

impl RateSnapshot {
    /// Builds a cache-origin snapshot from stored rows.
    ///
    /// Returns `None` for an empty row set. The stamp is taken from the
    /// first row.
    pub fn from_rows(base: CurrencyCode, rows: &[CachedRate]) -> Option<Self> {
        let fetched_at = rows.first()?.fetched_at;
        let rates = rows.iter().map(|r| (r.target.clone(), r.rate)).collect();
        Some(Self {
            base,
            rates,
            fetched_at,
            origin: RateOrigin::Cache,
        })
    }

    pub fn rate_for(&self, target: &CurrencyCode) -> Option<f64> {
        self.rates.get(target)
    }

    pub fn fetched_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.fetched_at).single()
    }
}
