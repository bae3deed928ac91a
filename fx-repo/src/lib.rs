//! # FX Repository
//!
//! Concrete storage adapters for the exchange-rate cache.
//! This crate provides adapters that implement the `RateStore` and
//! `FavoriteStore` ports:
//! - `SqliteRepo` (feature `sqlite`, on by default) persists both tables
//! - `MemoryRateStore` / `MemoryFavoriteStore` keep everything in process

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;


pub use memory::{MemoryFavoriteStore, MemoryRateStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

/// Build and initialize a repository from a database URL.
///
/// This function:
/// 1. Connects to the database (creating the file if needed)
/// 2. Resets the schema if it was written by an incompatible version
/// 3. Creates the tables and returns a ready-to-use `SqliteRepo`
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://fx-cache.db").await?;
/// let repo = build_repo("sqlite::memory:").await?;
/// ```
#[cfg(feature = "sqlite")]
pub async fn build_repo(database_url: &str) -> anyhow::Result<SqliteRepo> {
    SqliteRepo::new(database_url).await
}
