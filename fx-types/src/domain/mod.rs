//! Domain models for the exchange-rate cache.

pub mod conversion;
pub mod currency;
pub mod favorite;
pub mod rate;
pub mod refresh;

pub use conversion::{Conversion, ConversionState, Resource};
pub use currency::{CurrencyCode, RateTable};
pub use favorite::{FavoriteConversion, FavoriteId, NewFavorite};
pub use rate::{CachedRate, RateOrigin, RateSnapshot};
pub use refresh::{BatchOutcome, JobStatus, RefreshNotice, RefreshReport};
