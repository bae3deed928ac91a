//! # FX Types
//!
//! Domain types and port traits for the offline-first exchange-rate cache.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, CachedRate, Conversion)
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Fetch, storage, policy and conversion error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    BatchOutcome, CachedRate, Conversion, ConversionState, CurrencyCode, FavoriteConversion,
    FavoriteId, JobStatus, NewFavorite, RateOrigin, RateSnapshot, RateTable, RefreshNotice,
    RefreshReport, Resource,
};
pub use error::{ConvertError, FetchError, RateError, RepoError};
pub use ports::{
    Clock, Connectivity, FavoriteStore, RateStore, RefreshNotifier, RemoteRateSource, SystemClock,
};
