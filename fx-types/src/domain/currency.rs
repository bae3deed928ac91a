//! Currency codes and rate tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An ISO-4217-like currency code: exactly three ASCII letters, upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalises a currency code.
    ///
    /// Surrounding whitespace is ignored and letters are upper-cased, so
    /// `" usd "` becomes `USD`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(trimmed.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid currency code: {}", s))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Rates for one base currency, keyed by target currency.
///
/// Every stored rate is positive and finite; anything else is dropped on
/// the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable(BTreeMap<CurrencyCode, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `rate` can be used as a conversion multiplier.
    pub fn is_valid_rate(rate: f64) -> bool {
        rate.is_finite() && rate > 0.0
    }

    /// Inserts a rate, ignoring invalid multipliers. Returns whether it was kept.
    pub fn insert(&mut self, target: CurrencyCode, rate: f64) -> bool {
        if Self::is_valid_rate(rate) {
            self.0.insert(target, rate);
            true
        } else {
            false
        }
    }

    pub fn get(&self, target: &CurrencyCode) -> Option<f64> {
        self.0.get(target).copied()
    }

    pub fn contains(&self, target: &CurrencyCode) -> bool {
        self.0.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.0.iter().map(|(code, rate)| (code, *rate))
    }
}

impl FromIterator<(CurrencyCode, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, f64)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (target, rate) in iter {
            table.insert(target, rate);
        }
        table
    }
}
