//! Database row structs and their mapping to domain types.

use sqlx::FromRow;

use fx_types::{CachedRate, CurrencyCode, FavoriteConversion, FavoriteId, RepoError};

fn parse_code(column: &str, raw: &str) -> Result<CurrencyCode, RepoError> {
    CurrencyCode::parse(raw)
        .ok_or_else(|| RepoError::Corrupt(format!("{} holds invalid currency code {:?}", column, raw)))
}

/// Cached rate row from database.
#[derive(FromRow)]
pub struct DbCachedRate {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub fetched_at: i64,
}

impl DbCachedRate {
    pub fn into_domain(self) -> Result<CachedRate, RepoError> {
        Ok(CachedRate {
            base: parse_code("base", &self.base)?,
            target: parse_code("target", &self.target)?,
            rate: self.rate,
            fetched_at: self.fetched_at,
        })
    }
}

/// Favorite conversion row from database.
#[derive(FromRow)]
pub struct DbFavorite {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
    pub result: f64,
    pub created_at: i64,
}

impl DbFavorite {
    pub fn into_domain(self) -> Result<FavoriteConversion, RepoError> {
        let id: FavoriteId = self
            .id
            .parse()
            .map_err(|e| RepoError::Corrupt(format!("favorite id {:?}: {}", self.id, e)))?;

        Ok(FavoriteConversion {
            id,
            from: parse_code("from_currency", &self.from_currency)?,
            to: parse_code("to_currency", &self.to_currency)?,
            amount: self.amount,
            result: self.result,
            created_at: self.created_at,
        })
    }
}
