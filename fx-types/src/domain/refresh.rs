//! Outcome types for the background rate refresh.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::CurrencyCode;

/// What the refresh job tells its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    /// Nothing was refreshed; run again later.
    Retry,
    /// The run aborted on an unexpected error; no retry for this invocation.
    Failure,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Success => f.write_str("success"),
            JobStatus::Retry => f.write_str("retry"),
            JobStatus::Failure => f.write_str("failure"),
        }
    }
}

/// Aggregate result over the refreshed base currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOutcome {
    All,
    Partial,
    None,
}

/// Per-base results of one refresh run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub succeeded: Vec<CurrencyCode>,
    pub failed: Vec<(CurrencyCode, String)>,
}

impl RefreshReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (true, _) => BatchOutcome::None,
            (false, true) => BatchOutcome::All,
            (false, false) => BatchOutcome::Partial,
        }
    }

    pub fn job_status(&self) -> JobStatus {
        if self.succeeded.is_empty() {
            JobStatus::Retry
        } else {
            JobStatus::Success
        }
    }
}

/// User-facing summary of one refresh run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshNotice {
    pub status: JobStatus,
    /// Absent when the run aborted before finishing the batch.
    pub outcome: Option<BatchOutcome>,
    pub title: String,
    pub message: String,
}

impl RefreshNotice {
    /// Builds the notice for a run that went through the whole base list.
    pub fn for_report(report: &RefreshReport) -> Self {
        let outcome = report.outcome();
        let total = report.succeeded.len() + report.failed.len();
        let (title, message) = match outcome {
            BatchOutcome::All => (
                "Exchange Rates Updated".to_string(),
                format!(
                    "Successfully updated rates for {} currencies",
                    report.success_count()
                ),
            ),
            BatchOutcome::Partial => {
                let failed: Vec<&str> = report.failed.iter().map(|(c, _)| c.as_str()).collect();
                (
                    "Exchange Rates Updated".to_string(),
                    format!(
                        "Successfully updated rates for {} of {} currencies (failed: {})",
                        report.success_count(),
                        total,
                        failed.join(", ")
                    ),
                )
            }
            BatchOutcome::None => (
                "Update Failed".to_string(),
                "Could not update exchange rates. Will retry later.".to_string(),
            ),
        };

        Self {
            status: report.job_status(),
            outcome: Some(outcome),
            title,
            message,
        }
    }

    /// Builds the notice for a run aborted by an unexpected error.
    pub fn for_error(error: &str) -> Self {
        Self {
            status: JobStatus::Failure,
            outcome: None,
            title: "Update Error".to_string(),
            message: format!("Error updating rates: {}", error),
        }
    }
}
