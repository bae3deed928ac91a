//! Background rate refresh.
//!
//! Pulls the full rate set of a fixed list of base currencies and writes each
//! one through the cache policy worker. Meant to be triggered periodically by
//! an external scheduler that honours the returned `JobStatus`.

use tracing::{error, info, instrument, warn};

use fx_types::{
    CurrencyCode, JobStatus, RateError, RefreshNotice, RefreshNotifier, RefreshReport,
    RemoteRateSource,
};

use crate::policy::RatePolicy;

pub const DEFAULT_REFRESH_BASES: [&str; 4] = ["USD", "EUR", "GBP", "TRY"];

pub struct RateRefresher<R: RemoteRateSource, N: RefreshNotifier> {
    policy: RatePolicy,
    source: R,
    notifier: N,
    bases: Vec<CurrencyCode>,
}

impl<R: RemoteRateSource, N: RefreshNotifier> RateRefresher<R, N> {
    pub fn new(policy: RatePolicy, source: R, notifier: N) -> Self {
        let bases = DEFAULT_REFRESH_BASES
            .iter()
            .filter_map(|code| CurrencyCode::parse(code))
            .collect();
        Self {
            policy,
            source,
            notifier,
            bases,
        }
    }

    pub fn with_bases(mut self, bases: Vec<CurrencyCode>) -> Self {
        self.bases = bases;
        self
    }

    pub fn bases(&self) -> &[CurrencyCode] {
        &self.bases
    }

    /// One refresh run: refresh every base, notify, report the job status.
    #[instrument(skip(self), fields(bases = self.bases.len()))]
    pub async fn run(&self) -> JobStatus {
        let notice = match self.refresh_all().await {
            Ok(report) => {
                info!(
                    "Refreshed {} of {} base currencies",
                    report.success_count(),
                    self.bases.len()
                );
                RefreshNotice::for_report(&report)
            }
            Err(e) => {
                error!("Rate refresh aborted: {}", e);
                RefreshNotice::for_error(&e.to_string())
            }
        };

        self.notifier.notify(&notice);
        notice.status
    }

    /// Refreshes each base in order. A failed fetch is recorded and the loop
    /// moves on; a failed store write aborts the run.
    pub async fn refresh_all(&self) -> Result<RefreshReport, RateError> {
        let mut report = RefreshReport::default();

        for base in &self.bases {
            match self.source.fetch(base).await {
                Ok(rates) => {
                    let written = self.policy.store_rates(base.clone(), rates).await?;
                    info!("Stored {} rates for {}", written, base);
                    report.succeeded.push(base.clone());
                }
                Err(e) => {
                    warn!("Failed to refresh {}: {}", base, e);
                    report.failed.push((base.clone(), e.to_string()));
                }
            }
        }

        Ok(report)
    }
}
