//! # FX Hex
//!
//! Application services for the exchange-rate cache.
//!
//! ## Architecture
//!
//! - `policy` - cache policy worker (fresh cache vs. remote fetch)
//! - `converter` - validated conversion use-case on top of the policy
//! - `refresher` - background refresh of a fixed list of base currencies
//! - `favorites` - saved conversions
//!
//! Everything is generic over the ports in `fx_types`, so the SQLite and
//! in-memory adapters plug in the same way.

pub mod converter;
pub mod favorites;
pub mod policy;
pub mod refresher;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod converter_tests;

pub use converter::{Converter, parse_amount};
pub use favorites::FavoritesService;
pub use policy::{DEFAULT_FRESHNESS, PolicyConfig, RatePolicy, RateRequest};
pub use refresher::{DEFAULT_REFRESH_BASES, RateRefresher};
