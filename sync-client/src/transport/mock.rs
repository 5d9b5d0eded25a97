//! Mock transport for testing.
//!
//! Allows queueing responses, answering requests from a handler, and
//! capturing sent requests for verification.

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;
type Latency = Arc<dyn Fn(&HttpRequest) -> Option<Duration> + Send + Sync>;

/// Mock transport for testing.
///
/// Replies are chosen in this order: a pending forced failure, then the
/// next queued reply, then the handler. With none of these a request fails
/// with [`TransportError::ConnectionFailed`].
#[derive(Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    requests: Vec<HttpRequest>,
    replies: VecDeque<Result<HttpResponse, TransportError>>,
    handler: Option<Handler>,
    latency: Option<Latency>,
    fail_next_request: Option<TransportError>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned by the next unanswered request.
    pub fn queue_response(&self, response: HttpResponse) {
        let mut inner = self.inner.lock().unwrap();
        inner.replies.push_back(Ok(response));
    }

    /// Queue a transport failure to be returned by the next unanswered request.
    pub fn queue_error(&self, error: TransportError) {
        let mut inner = self.inner.lock().unwrap();
        inner.replies.push_back(Err(error));
    }

    /// Answer requests with `handler` once the queue is empty.
    pub fn respond_with<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        inner.handler = Some(Arc::new(handler));
    }

    /// Delay each reply by the duration `latency` returns for its request.
    pub fn delay_with<F>(&self, latency: F)
    where
        F: Fn(&HttpRequest) -> Option<Duration> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        inner.latency = Some(Arc::new(latency));
    }

    /// Cause the next request to fail with the given error.
    pub fn fail_next_request(&self, error: TransportError) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_request = Some(error);
    }

    /// Get all requests that were sent, in send order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the last request that was sent.
    pub fn last_request(&self) -> Option<HttpRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requests.len()
    }

    /// Clear all state (requests, queue, handler).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockTransportInner::default();
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("MockTransport")
            .field("requests", &inner.requests.len())
            .field("queued", &inner.replies.len())
            .field("has_handler", &inner.handler.is_some())
            .finish()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (reply, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(request.clone());

            let reply = if let Some(error) = inner.fail_next_request.take() {
                Err(error)
            } else if let Some(reply) = inner.replies.pop_front() {
                reply
            } else if let Some(handler) = &inner.handler {
                handler(&request)
            } else {
                Err(TransportError::ConnectionFailed(
                    "no response queued".to_string(),
                ))
            };
            let delay = inner.latency.as_ref().and_then(|latency| latency(&request));
            (reply, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}
