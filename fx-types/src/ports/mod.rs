//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod remote;
mod store;
mod system;

pub use remote::RemoteRateSource;
pub use store::{FavoriteStore, RateStore};
pub use system::{Clock, Connectivity, RefreshNotifier, SystemClock};
