//! ConcurrentCaller - bounded-concurrency dispatcher with a shared pause.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use super::{Dispatcher, Job};
use crate::error::ClientError;
use crate::transport::HttpResponse;

/// Runs at most `max_concurrent` jobs at a time.
///
/// The pause deadline is stored as milliseconds since the caller was
/// created and only ever moves forward (`fetch_max`), so concurrent
/// `pause()` calls need no lock. Jobs check the deadline both before and
/// after acquiring a permit, so a pause armed while a job was queued still
/// holds it back.
#[derive(Debug)]
pub struct ConcurrentCaller {
    permits: Semaphore,
    max_concurrent: usize,
    epoch: Instant,
    paused_until_ms: AtomicU64,
}

impl ConcurrentCaller {
    /// Create a caller allowing `max_concurrent` jobs in flight.
    ///
    /// A limit of zero is raised to one.
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Semaphore::new(max_concurrent),
            max_concurrent,
            epoch: Instant::now(),
            paused_until_ms: AtomicU64::new(0),
        }
    }

    /// Configured concurrency limit.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Permits not currently held by a running job.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Time left before new jobs may start, if paused.
    pub fn paused_for(&self) -> Option<Duration> {
        let until = self.paused_until_ms.load(Ordering::Acquire);
        let now = self.now_ms();
        (until > now).then(|| Duration::from_millis(until - now))
    }

    /// Stop accepting jobs. Queued and future `start()` calls fail with
    /// [`ClientError::DispatcherClosed`]; running jobs finish normally.
    pub fn close(&self) {
        self.permits.close();
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    async fn wait_out_pause(&self) {
        loop {
            let until = self.paused_until_ms.load(Ordering::Acquire);
            if until <= self.now_ms() {
                return;
            }
            tokio::time::sleep_until(self.epoch + Duration::from_millis(until)).await;
        }
    }
}

#[async_trait]
impl Dispatcher for ConcurrentCaller {
    async fn start<'a>(&self, job: Job<'a>) -> Result<HttpResponse, ClientError> {
        self.wait_out_pause().await;
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ClientError::DispatcherClosed)?;
        self.wait_out_pause().await;
        job.await
    }

    fn pause(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let until = self.now_ms().saturating_add(millis);
        self.paused_until_ms.fetch_max(until, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::join_all;
    use futures_util::FutureExt;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn ok_job<'a>() -> Job<'a> {
        async { Ok(HttpResponse::new(200)) }.boxed()
    }

    // ===========================================
    // Concurrency Tests
    // ===========================================

    #[tokio::test]
    async fn runs_job_and_returns_result() {
        let caller = ConcurrentCaller::new(2);
        let response = caller.start(ok_job()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(caller.available_permits(), 2);
    }

    #[tokio::test]
    async fn zero_limit_is_raised_to_one() {
        let caller = ConcurrentCaller::new(0);
        assert_eq!(caller.max_concurrent(), 1);
        assert!(caller.start(ok_job()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn bounds_jobs_in_flight() {
        let caller = ConcurrentCaller::new(2);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6).map(|_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            caller.start(
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(HttpResponse::new(200))
                }
                .boxed(),
            )
        });
        let results = join_all(jobs).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn job_errors_propagate() {
        let caller = ConcurrentCaller::new(1);
        let result = caller
            .start(async { Err(ClientError::DispatcherClosed) }.boxed())
            .await;
        assert!(matches!(result, Err(ClientError::DispatcherClosed)));
        assert_eq!(caller.available_permits(), 1);
    }

    #[tokio::test]
    async fn closed_caller_rejects_jobs() {
        let caller = ConcurrentCaller::new(1);
        caller.close();
        let result = caller.start(ok_job()).await;
        assert!(matches!(result, Err(ClientError::DispatcherClosed)));
    }

    // ===========================================
    // Pause Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn pause_delays_next_job() {
        let caller = ConcurrentCaller::new(1);
        caller.pause(Duration::from_secs(100));
        assert!(caller.paused_for().is_some());

        let start = Instant::now();
        caller.start(ok_job()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(100));
        assert_eq!(caller.paused_for(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_pauses_keep_later_deadline() {
        let caller = ConcurrentCaller::new(1);
        caller.pause(Duration::from_secs(30));
        caller.pause(Duration::from_secs(5));

        let remaining = caller.paused_for().unwrap();
        assert!(remaining > Duration::from_secs(29));

        let start = Instant::now();
        caller.start(ok_job()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_armed_while_queued_holds_job_back() {
        let caller = Arc::new(ConcurrentCaller::new(1));

        let blocker = {
            let caller = Arc::clone(&caller);
            tokio::spawn(async move {
                caller
                    .start(
                        async {
                            tokio::time::sleep(Duration::from_secs(1)).await;
                            Ok(HttpResponse::new(200))
                        }
                        .boxed(),
                    )
                    .await
            })
        };
        tokio::task::yield_now().await;

        let queued = {
            let caller = Arc::clone(&caller);
            tokio::spawn(async move {
                let start = Instant::now();
                caller.start(ok_job()).await.map(|_| start.elapsed())
            })
        };
        tokio::task::yield_now().await;
        caller.pause(Duration::from_secs(60));

        blocker.await.unwrap().unwrap();
        let waited = queued.await.unwrap().unwrap();
        assert!(waited >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn not_paused_initially() {
        let caller = ConcurrentCaller::new(1);
        assert_eq!(caller.paused_for(), None);
    }
}
