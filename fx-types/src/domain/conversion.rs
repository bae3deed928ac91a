//! Conversion results and the observable states around them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::CurrencyCode;
use crate::error::{ConvertError, RateError};

/// A completed conversion: `result = amount * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub rate: f64,
    pub result: f64,
}

impl Conversion {
    pub fn new(from: CurrencyCode, to: CurrencyCode, amount: f64, rate: f64) -> Self {
        Self {
            from,
            to,
            amount,
            rate,
            result: amount * rate,
        }
    }

    /// Like `new`, but `None` when `amount * rate` is not a finite number.
    pub fn checked(from: CurrencyCode, to: CurrencyCode, amount: f64, rate: f64) -> Option<Self> {
        let conversion = Self::new(from, to, amount, rate);
        conversion.result.is_finite().then_some(conversion)
    }

    /// Same-currency conversion: rate 1, result equals the amount.
    pub fn identity(code: CurrencyCode, amount: f64) -> Self {
        Self::new(code.clone(), code, amount, 1.0)
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {} = {:.2} {}",
            self.amount, self.from, self.result, self.to
        )
    }
}

/// State of the conversion use-case.
///
/// Starts `Idle`; a submission ends in `Success` or `Error` and stays there
/// until the next submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Idle,
    Loading,
    Success(Conversion),
    Error(ConvertError),
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversionState::Success(_) | ConversionState::Error(_))
    }
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionState::Idle => f.write_str("idle"),
            ConversionState::Loading => f.write_str("loading"),
            ConversionState::Success(conversion) => write!(f, "{}", conversion),
            ConversionState::Error(err) => write!(f, "{}", err),
        }
    }
}

/// Progress of a single cache-policy request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(RateError),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    /// Converts a terminal state into a `Result`; `None` while loading.
    pub fn into_result(self) -> Option<Result<T, RateError>> {
        match self {
            Resource::Loading => None,
            Resource::Success(value) => Some(Ok(value)),
            Resource::Error(err) => Some(Err(err)),
        }
    }
}
