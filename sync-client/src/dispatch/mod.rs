//! Dispatcher abstraction for versync.
//!
//! Every request the client makes is handed to a [`Dispatcher`] as a boxed
//! future. The dispatcher decides when it may run, which is how the number of
//! requests in flight is bounded across all operations of a client, and it
//! owns the process-wide pause state armed by server `Backoff` signals.
//!
//! # Design
//!
//! - `start()` runs one job, possibly after waiting for capacity or a pause
//! - `pause()` stops new jobs from starting for a while; overlapping pauses
//!   keep the later deadline
//!
//! Share one dispatcher between clients by wrapping it in an `Arc`.

mod caller;
mod mock;

pub use caller::ConcurrentCaller;
pub use mock::MockDispatcher;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::time::Duration;

use crate::error::ClientError;
use crate::transport::HttpResponse;

/// One request, ready to run.
pub type Job<'a> = BoxFuture<'a, Result<HttpResponse, ClientError>>;

/// Schedules requests and honors backoff pauses.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Run `job` once the dispatcher allows it, and return its result.
    async fn start<'a>(&self, job: Job<'a>) -> Result<HttpResponse, ClientError>;

    /// Do not start new jobs until `duration` from now has passed.
    fn pause(&self, duration: Duration);
}

#[async_trait]
impl<D: Dispatcher + ?Sized> Dispatcher for std::sync::Arc<D> {
    async fn start<'a>(&self, job: Job<'a>) -> Result<HttpResponse, ClientError> {
        (**self).start(job).await
    }

    fn pause(&self, duration: Duration) {
        (**self).pause(duration)
    }
}
