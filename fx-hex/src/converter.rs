//! Conversion use-case.
//!
//! Validates user input, checks connectivity and asks the cache policy for
//! the base currency's rates. Every submission ends in `Success` or `Error`.

use tokio::sync::watch;
use tracing::{debug, instrument};

use fx_types::{Connectivity, Conversion, ConversionState, ConvertError, CurrencyCode};

use crate::policy::RatePolicy;

pub struct Converter<N: Connectivity> {
    policy: RatePolicy,
    connectivity: N,
    state: watch::Sender<ConversionState>,
    last: watch::Sender<Option<Conversion>>,
}

impl<N: Connectivity> Converter<N> {
    pub fn new(policy: RatePolicy, connectivity: N) -> Self {
        let (state, _) = watch::channel(ConversionState::Idle);
        let (last, _) = watch::channel(None);
        Self {
            policy,
            connectivity,
            state,
            last,
        }
    }

    /// Observes every state transition, starting from the current one.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Most recent successful conversion, if any.
    pub fn last_conversion(&self) -> Option<Conversion> {
        self.last.borrow().clone()
    }

    /// Runs one conversion and returns its terminal state.
    #[instrument(skip(self))]
    pub async fn submit(&self, from: &str, to: &str, amount_text: &str) -> ConversionState {
        let state = match self.convert(from, to, amount_text).await {
            Ok(conversion) => {
                self.last.send_replace(Some(conversion.clone()));
                ConversionState::Success(conversion)
            }
            Err(e) => {
                debug!("Conversion failed: {}", e);
                ConversionState::Error(e)
            }
        };
        self.state.send_replace(state.clone());
        state
    }

    async fn convert(
        &self,
        from: &str,
        to: &str,
        amount_text: &str,
    ) -> Result<Conversion, ConvertError> {
        let amount = parse_amount(amount_text)?;
        let from = parse_code(from)?;
        let to = parse_code(to)?;

        if from == to {
            return Ok(Conversion::identity(from, amount));
        }

        if !self.connectivity.is_online().await {
            return Err(ConvertError::NoConnectivity);
        }

        self.state.send_replace(ConversionState::Loading);
        let snapshot = self.policy.resolve_rates(from.clone()).outcome().await?;
        let rate = snapshot
            .rate_for(&to)
            .ok_or_else(|| ConvertError::TargetUnavailable(to.clone()))?;

        Conversion::checked(from, to, amount, rate).ok_or(ConvertError::InvalidAmount)
    }
}

/// Parses a user-entered amount. Must be a finite number greater than zero.
pub fn parse_amount(text: &str) -> Result<f64, ConvertError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ConvertError::EmptyAmount);
    }

    let amount: f64 = text.parse().map_err(|_| ConvertError::InvalidAmount)?;
    if !amount.is_finite() {
        return Err(ConvertError::InvalidAmount);
    }
    if amount <= 0.0 {
        return Err(ConvertError::NonPositiveAmount);
    }
    Ok(amount)
}

fn parse_code(text: &str) -> Result<CurrencyCode, ConvertError> {
    CurrencyCode::parse(text).ok_or_else(|| ConvertError::InvalidCurrency(text.trim().to_string()))
}
