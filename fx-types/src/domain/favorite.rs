//! Saved favorite conversions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversion::Conversion;
use super::currency::CurrencyCode;

/// Unique identifier for a FavoriteConversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(Uuid);

impl FavoriteId {
    /// Creates a new random FavoriteId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a FavoriteId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FavoriteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FavoriteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A favorite conversion before it has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFavorite {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub result: f64,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl NewFavorite {
    pub fn from_conversion(conversion: &Conversion, created_at: i64) -> Self {
        Self {
            from: conversion.from.clone(),
            to: conversion.to.clone(),
            amount: conversion.amount,
            result: conversion.result,
            created_at,
        }
    }
}

/// A persisted favorite conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteConversion {
    pub id: FavoriteId,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub result: f64,
    pub created_at: i64,
}

impl FavoriteConversion {
    pub fn from_new(id: FavoriteId, new: NewFavorite) -> Self {
        Self {
            id,
            from: new.from,
            to: new.to,
            amount: new.amount,
            result: new.result,
            created_at: new.created_at,
        }
    }
}
