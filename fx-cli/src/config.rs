//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;

use fx_hex::{DEFAULT_FRESHNESS, DEFAULT_REFRESH_BASES};
use fx_types::CurrencyCode;

/// Tuning knobs that are not worth a CLI flag.
#[derive(Debug, Clone)]
pub struct Settings {
    pub freshness: Duration,
    pub http_timeout: Duration,
    pub refresh_bases: Vec<CurrencyCode>,
    /// Treat the network as unreachable without probing.
    pub offline: bool,
}

impl Settings {
    /// Loads settings from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let freshness = match lookup("FX_FRESHNESS_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .context("FX_FRESHNESS_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_FRESHNESS,
        };

        let http_timeout = Duration::from_secs(
            lookup("FX_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .trim()
                .parse()
                .context("FX_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
        );

        let refresh_bases = match lookup("FX_REFRESH_BASES") {
            Some(v) => parse_bases(&v)?,
            None => DEFAULT_REFRESH_BASES
                .iter()
                .filter_map(|c| CurrencyCode::parse(c))
                .collect(),
        };

        let offline = lookup("FX_OFFLINE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            freshness,
            http_timeout,
            refresh_bases,
            offline,
        })
    }
}

fn parse_bases(list: &str) -> anyhow::Result<Vec<CurrencyCode>> {
    let bases = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            CurrencyCode::parse(s)
                .ok_or_else(|| anyhow::anyhow!("Invalid currency in FX_REFRESH_BASES: {}", s))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if bases.is_empty() {
        anyhow::bail!("FX_REFRESH_BASES must name at least one currency");
    }
    Ok(bases)
}
