//! Cache policy.
//!
//! Decides, per base currency, whether to answer from the local store or to
//! fetch from the remote source and write the result back. All store and
//! network work runs on one worker task, so concurrent requests are handled
//! strictly one after another and a fetch-then-write is never interleaved
//! with another request's read.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

use fx_types::{
    Clock, CurrencyCode, RateError, RateOrigin, RateSnapshot, RateStore, RateTable,
    RemoteRateSource, RepoError, Resource,
};

/// Cached rates younger than this are served without a network call.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    pub freshness: Duration,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
        }
    }
}

enum Command {
    Resolve {
        base: CurrencyCode,
        reply: watch::Sender<Resource<RateSnapshot>>,
    },
    Peek {
        base: CurrencyCode,
        target: CurrencyCode,
        reply: oneshot::Sender<Option<f64>>,
    },
    Store {
        base: CurrencyCode,
        rates: RateTable,
        reply: oneshot::Sender<Result<usize, RepoError>>,
    },
    Prune {
        reply: oneshot::Sender<Result<u64, RepoError>>,
    },
    Clear {
        reply: oneshot::Sender<Result<u64, RepoError>>,
    },
}

/// Handle to the cache policy worker.
///
/// Cheap to clone; the worker stops once every handle is dropped and the
/// queued commands are drained.
#[derive(Clone)]
pub struct RatePolicy {
    commands: mpsc::UnboundedSender<Command>,
    freshness: Duration,
}

impl RatePolicy {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn<S, R, C>(store: S, source: R, clock: C, config: PolicyConfig) -> Self
    where
        S: RateStore,
        R: RemoteRateSource,
        C: Clock,
    {
        let (commands, queue) = mpsc::unbounded_channel();
        let worker = RateWorker {
            store,
            source,
            clock,
            freshness: config.freshness,
        };
        tokio::spawn(worker.run(queue));

        Self {
            commands,
            freshness: config.freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Starts resolving the full rate set for `base`.
    ///
    /// The returned request reports `Loading` right away and later exactly
    /// one terminal state. Dropping it does not cancel the work: a fetched
    /// result is still written to the store.
    pub fn resolve_rates(&self, base: CurrencyCode) -> RateRequest {
        let (reply, updates) = watch::channel(Resource::Loading);
        let command = Command::Resolve {
            base: base.clone(),
            reply,
        };
        if let Err(mpsc::error::SendError(Command::Resolve { reply, .. })) =
            self.commands.send(command)
        {
            reply.send_replace(Resource::Error(RateError::WorkerStopped));
        }

        RateRequest { base, updates }
    }

    /// Fresh cached rate for a single pair. Never touches the network.
    pub async fn get_cached_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Option<f64> {
        self.request(|reply| Command::Peek {
            base: base.clone(),
            target: target.clone(),
            reply,
        })
        .await
        .ok()
        .flatten()
    }

    /// Replaces the cached rate set of `base`, stamped with the current time.
    pub async fn store_rates(
        &self,
        base: CurrencyCode,
        rates: RateTable,
    ) -> Result<usize, RateError> {
        Ok(self
            .request(|reply| Command::Store { base, rates, reply })
            .await??)
    }

    /// Deletes rows older than the freshness window.
    pub async fn prune_expired(&self) -> Result<u64, RateError> {
        Ok(self.request(|reply| Command::Prune { reply }).await??)
    }

    /// Deletes every cached rate.
    pub async fn clear_cache(&self) -> Result<u64, RateError> {
        Ok(self.request(|reply| Command::Clear { reply }).await??)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RateError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| RateError::WorkerStopped)?;
        response.await.map_err(|_| RateError::WorkerStopped)
    }
}

/// Observable progress of one `resolve_rates` call.
pub struct RateRequest {
    base: CurrencyCode,
    updates: watch::Receiver<Resource<RateSnapshot>>,
}

impl RateRequest {
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Latest state without waiting.
    pub fn current(&self) -> Resource<RateSnapshot> {
        self.updates.borrow().clone()
    }

    /// Receiver for callers that want to observe the transitions themselves.
    pub fn subscribe(&self) -> watch::Receiver<Resource<RateSnapshot>> {
        self.updates.clone()
    }

    /// Waits for the terminal state.
    pub async fn outcome(mut self) -> Result<RateSnapshot, RateError> {
        loop {
            let state = self.updates.borrow_and_update().clone();
            if let Some(result) = state.into_result() {
                return result;
            }
            if self.updates.changed().await.is_err() {
                let last = self.updates.borrow().clone();
                return last.into_result().unwrap_or(Err(RateError::WorkerStopped));
            }
        }
    }
}

struct RateWorker<S, R, C> {
    store: S,
    source: R,
    clock: C,
    freshness: Duration,
}

impl<S, R, C> RateWorker<S, R, C>
where
    S: RateStore,
    R: RemoteRateSource,
    C: Clock,
{
    #[instrument(skip_all)]
    async fn run(self, mut queue: mpsc::UnboundedReceiver<Command>) {
        info!(
            "Starting rate worker (freshness {}s)",
            self.freshness.as_secs()
        );

        while let Some(command) = queue.recv().await {
            match command {
                Command::Resolve { base, reply } => {
                    let state = match self.resolve(&base).await {
                        Ok(snapshot) => Resource::Success(snapshot),
                        Err(e) => Resource::Error(e),
                    };
                    reply.send_replace(state);
                }
                Command::Peek {
                    base,
                    target,
                    reply,
                } => {
                    let _ = reply.send(self.peek(&base, &target).await);
                }
                Command::Store { base, rates, reply } => {
                    let now = self.clock.now_millis();
                    let _ = reply.send(self.store.put_many(&base, &rates, now).await);
                }
                Command::Prune { reply } => {
                    let _ = reply.send(self.prune().await);
                }
                Command::Clear { reply } => {
                    let result = self.store.clear().await;
                    if let Ok(removed) = &result {
                        info!("Cleared {} cached rates", removed);
                    }
                    let _ = reply.send(result);
                }
            }
        }

        info!("Rate worker stopped");
    }

    #[instrument(skip_all, fields(base = %base))]
    async fn resolve(&self, base: &CurrencyCode) -> Result<RateSnapshot, RateError> {
        if let Some(snapshot) = self.fresh_snapshot(base).await {
            return Ok(snapshot);
        }

        let rates = self.source.fetch(base).await.map_err(|e| {
            warn!("Rate fetch failed: {}", e);
            RateError::from(e)
        })?;

        let fetched_at = self.clock.now_millis();
        match self.store.put_many(base, &rates, fetched_at).await {
            Ok(written) => info!("Fetched and cached {} rates", written),
            Err(e) => warn!("Fetched {} rates but caching failed: {}", rates.len(), e),
        }

        Ok(RateSnapshot {
            base: base.clone(),
            rates,
            fetched_at,
            origin: RateOrigin::Remote,
        })
    }

    /// Cached snapshot if present and inside the window. The age of a set is
    /// the age of its first row; all rows of a base share one stamp.
    async fn fresh_snapshot(&self, base: &CurrencyCode) -> Option<RateSnapshot> {
        let rows = match self.store.get_all_for_base(base).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Rate store read failed, treating as miss: {}", e);
                return None;
            }
        };

        let now = self.clock.now_millis();
        let first = rows.first()?;
        if !first.is_fresh(now, self.freshness) {
            debug!(age_ms = first.age_millis(now), "Cached rates are stale");
            return None;
        }

        debug!(
            age_ms = first.age_millis(now),
            rates = rows.len(),
            "Serving rates from cache"
        );
        RateSnapshot::from_rows(base.clone(), &rows)
    }

    async fn peek(&self, base: &CurrencyCode, target: &CurrencyCode) -> Option<f64> {
        match self.store.get(base, target).await {
            Ok(Some(row)) if row.is_fresh(self.clock.now_millis(), self.freshness) => {
                Some(row.rate)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Rate store read failed for {}/{}: {}", base, target, e);
                None
            }
        }
    }

    async fn prune(&self) -> Result<u64, RepoError> {
        let window = i64::try_from(self.freshness.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.clock.now_millis().saturating_sub(window);
        let removed = self.store.delete_older_than(cutoff).await?;
        if removed > 0 {
            info!("Pruned {} expired rates", removed);
        }
        Ok(removed)
    }
}
