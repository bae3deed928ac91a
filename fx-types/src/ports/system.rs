//! Environment ports: time, network reachability, user notifications.

use crate::domain::RefreshNotice;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Answers whether a network path is currently available.
#[async_trait::async_trait]
pub trait Connectivity: Send + Sync + 'static {
    async fn is_online(&self) -> bool;
}

/// Receives the refresh job's user-facing summary.
pub trait RefreshNotifier: Send + Sync + 'static {
    fn notify(&self, notice: &RefreshNotice);
}
