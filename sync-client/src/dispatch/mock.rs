//! Mock dispatcher for testing.
//!
//! Runs every job immediately and records the pauses it is asked for.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Dispatcher, Job};
use crate::error::ClientError;
use crate::transport::HttpResponse;

/// Pass-through dispatcher that records calls.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    inner: Arc<Mutex<MockDispatcherInner>>,
}

#[derive(Debug, Default)]
struct MockDispatcherInner {
    started: usize,
    pauses: Vec<Duration>,
}

impl MockDispatcher {
    /// Create a new mock dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs started.
    pub fn started(&self) -> usize {
        self.inner.lock().unwrap().started
    }

    /// Every pause requested, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().pauses.clone()
    }

    /// The most recent pause requested.
    pub fn last_pause(&self) -> Option<Duration> {
        self.inner.lock().unwrap().pauses.last().copied()
    }
}

impl Clone for MockDispatcher {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn start<'a>(&self, job: Job<'a>) -> Result<HttpResponse, ClientError> {
        self.inner.lock().unwrap().started += 1;
        job.await
    }

    fn pause(&self, duration: Duration) {
        self.inner.lock().unwrap().pauses.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    #[tokio::test]
    async fn records_started_jobs_and_pauses() {
        let dispatcher = MockDispatcher::new();
        let clone = dispatcher.clone();

        dispatcher
            .start(async { Ok(HttpResponse::new(204)) }.boxed())
            .await
            .unwrap();
        dispatcher.pause(Duration::from_millis(100_000));

        assert_eq!(clone.started(), 1);
        assert_eq!(clone.pauses(), vec![Duration::from_millis(100_000)]);
        assert_eq!(clone.last_pause(), Some(Duration::from_secs(100)));
    }
}
