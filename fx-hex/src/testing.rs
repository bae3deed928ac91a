//! Fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fx_repo::MemoryRateStore;
use fx_types::{
    CachedRate, Clock, Connectivity, CurrencyCode, FetchError, RateStore, RateTable,
    RefreshNotice, RefreshNotifier, RemoteRateSource, RepoError,
};

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const START_MS: i64 = 1_700_000_000_000;

pub fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

pub fn table(entries: &[(&str, f64)]) -> RateTable {
    entries.iter().map(|(c, r)| (code(c), *r)).collect()
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(millis)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now()
    }
}

#[derive(Default)]
struct SourceState {
    responses: Mutex<HashMap<CurrencyCode, Result<RateTable, FetchError>>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Scripted remote source that counts calls and overlapping fetches.
#[derive(Clone, Default)]
pub struct FakeSource(Arc<SourceState>);

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, base: &str, rates: &[(&str, f64)]) {
        self.0
            .responses
            .lock()
            .unwrap()
            .insert(code(base), Ok(table(rates)));
    }

    pub fn fail(&self, base: &str, err: FetchError) {
        self.0.responses.lock().unwrap().insert(code(base), Err(err));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.0.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.0.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteRateSource for FakeSource {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.0.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.0
            .responses
            .lock()
            .unwrap()
            .get(base)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no route for {}", base))))
    }
}

#[derive(Default)]
struct StoreState {
    inner: MemoryRateStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory store that counts accesses and can be told to fail.
#[derive(Clone, Default)]
pub struct TestStore(Arc<StoreState>);

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, base: &str, rates: &[(&str, f64)], fetched_at: i64) {
        self.0
            .inner
            .put_many(&code(base), &table(rates), fetched_at)
            .await
            .unwrap();
    }

    pub async fn rows(&self, base: &str) -> Vec<CachedRate> {
        self.0.inner.get_all_for_base(&code(base)).await.unwrap()
    }

    pub fn reads(&self) -> usize {
        self.0.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.0.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.0.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.0.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), RepoError> {
        self.0.reads.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::Database("disk I/O error".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), RepoError> {
        self.0.writes.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Database("database is locked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RateStore for TestStore {
    async fn get(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<CachedRate>, RepoError> {
        self.check_read()?;
        self.0.inner.get(base, target).await
    }

    async fn get_all_for_base(&self, base: &CurrencyCode) -> Result<Vec<CachedRate>, RepoError> {
        self.check_read()?;
        self.0.inner.get_all_for_base(base).await
    }

    async fn put_many(
        &self,
        base: &CurrencyCode,
        rates: &RateTable,
        fetched_at: i64,
    ) -> Result<usize, RepoError> {
        self.check_write()?;
        self.0.inner.put_many(base, rates, fetched_at).await
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, RepoError> {
        self.check_write()?;
        self.0.inner.delete_older_than(cutoff).await
    }

    async fn clear(&self) -> Result<u64, RepoError> {
        self.check_write()?;
        self.0.inner.clear().await
    }
}

#[derive(Clone)]
pub struct FakeConnectivity {
    online: Arc<AtomicBool>,
    checks: Arc<AtomicUsize>,
}

impl FakeConnectivity {
    pub fn online() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn offline() -> Self {
        let fake = Self::online();
        fake.online.store(false, Ordering::SeqCst);
        fake
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connectivity for FakeConnectivity {
    async fn is_online(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.online.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier(Arc<Mutex<Vec<RefreshNotice>>>);

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<RefreshNotice> {
        self.0.lock().unwrap().clone()
    }
}

impl RefreshNotifier for RecordingNotifier {
    fn notify(&self, notice: &RefreshNotice) {
        self.0.lock().unwrap().push(notice.clone());
    }
}
