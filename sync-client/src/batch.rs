//! Fan-out of large key sets into bounded, independently reported requests.

use futures_util::future::join_all;
use std::future::Future;
use tracing::error;
use versync_core::split_keys;

use crate::error::ClientError;

/// Outcome of one chunk of a batched operation.
#[derive(Debug)]
pub enum BatchOutcome<T> {
    /// The chunk was retrieved.
    Objects(T),
    /// The server rejected the chunk with a 4xx status.
    Rejected(ClientError),
    /// The chunk failed for any other reason.
    Failed(ClientError),
}

impl<T> BatchOutcome<T> {
    /// Classify a chunk result, logging failures.
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => Self::Objects(value),
            Err(e) if e.is_client_error() => {
                error!("batch request rejected: {e}");
                Self::Rejected(e)
            }
            Err(e) => {
                error!("batch request failed: {e}");
                Self::Failed(e)
            }
        }
    }

    /// Whether the chunk was retrieved.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Objects(_))
    }

    /// Retrieved value, if any.
    pub fn objects(&self) -> Option<&T> {
        match self {
            Self::Objects(value) => Some(value),
            _ => None,
        }
    }

    /// Error, if the chunk was not retrieved.
    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Objects(_) => None,
            Self::Rejected(e) | Self::Failed(e) => Some(e),
        }
    }

    /// Convert back into a plain result.
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Self::Objects(value) => Ok(value),
            Self::Rejected(e) | Self::Failed(e) => Err(e),
        }
    }
}

/// Split `keys` into chunks of at most `max_batch` and run `make_request`
/// for each, concurrently.
///
/// Outcome `i` always belongs to chunk `i`, whatever order the requests
/// complete in. An empty key set makes no requests.
///
/// # Errors
///
/// Fails only if `max_batch` is zero; per-chunk failures are reported in
/// the returned outcomes.
pub async fn split_and_dispatch<'k, K, T, F, Fut>(
    keys: &'k [K],
    max_batch: usize,
    make_request: F,
) -> Result<Vec<BatchOutcome<T>>, ClientError>
where
    F: Fn(&'k [K]) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let chunks = split_keys(keys, max_batch)?;
    let results = join_all(chunks.into_iter().map(make_request)).await;
    Ok(results.into_iter().map(BatchOutcome::from_result).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use versync_core::RequestError;
    use versync_types::Method;

    fn rejected(status: u16) -> ClientError {
        ClientError::UnexpectedStatus {
            method: Method::Get,
            uri: "https://api.example.org/users/1/items".into(),
            status,
            body: String::new(),
        }
    }

    // ===========================================
    // Splitting Tests
    // ===========================================

    #[tokio::test]
    async fn empty_keys_make_no_requests() {
        let calls = AtomicUsize::new(0);
        let keys: Vec<String> = Vec::new();

        let outcomes = split_and_dispatch(&keys, 100, |chunk: &[String]| {
            calls.fetch_add(1, Ordering::SeqCst);
            let n = chunk.len();
            async move { Ok::<_, ClientError>(n) }
        })
        .await
        .unwrap();

        assert!(outcomes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn small_key_set_is_one_request() {
        let keys = vec!["A", "B", "C"];
        let outcomes = split_and_dispatch(&keys, 100, |chunk: &[&str]| {
            let n = chunk.len();
            async move { Ok::<_, ClientError>(n) }
        })
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].objects(), Some(&3));
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let keys = vec!["A"];
        let result = split_and_dispatch(&keys, 0, |_: &[&str]| async {
            Ok::<_, ClientError>(())
        })
        .await;

        assert!(matches!(
            result,
            Err(ClientError::InvalidRequest(RequestError::InvalidBatchSize))
        ));
    }

    // ===========================================
    // Ordering and Isolation Tests
    // ===========================================

    #[tokio::test(start_paused = true)]
    async fn preserves_chunk_order_when_completing_out_of_order() {
        let keys: Vec<u32> = (0..10).collect();

        let outcomes = split_and_dispatch(&keys, 3, |chunk: &[u32]| {
            let first = chunk[0];
            let chunk = chunk.to_vec();
            async move {
                // Earlier chunks finish last.
                tokio::time::sleep(Duration::from_millis(100 - u64::from(first) * 10)).await;
                Ok::<_, ClientError>(chunk)
            }
        })
        .await
        .unwrap();

        let chunks: Vec<Vec<u32>> = outcomes.into_iter().map(|o| o.into_result().unwrap()).collect();
        assert_eq!(
            chunks,
            vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8], vec![9]]
        );
    }

    #[tokio::test]
    async fn failures_are_isolated_per_chunk() {
        let keys: Vec<u32> = (0..6).collect();

        let outcomes = split_and_dispatch(&keys, 2, |chunk: &[u32]| {
            let first = chunk[0];
            async move {
                match first {
                    2 => Err(rejected(400)),
                    4 => Err(ClientError::Transport(TransportError::Timeout)),
                    _ => Ok(first),
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].objects(), Some(&0));
        assert!(matches!(outcomes[1], BatchOutcome::Rejected(_)));
        assert!(matches!(outcomes[2], BatchOutcome::Failed(_)));
        assert_eq!(outcomes[1].error().and_then(|e| e.status()), Some(400));
    }

    #[test]
    fn classification() {
        assert!(BatchOutcome::from_result(Ok::<_, ClientError>(1)).is_ok());
        assert!(matches!(
            BatchOutcome::<()>::from_result(Err(rejected(404))),
            BatchOutcome::Rejected(_)
        ));
        assert!(matches!(
            BatchOutcome::<()>::from_result(Err(rejected(503))),
            BatchOutcome::Failed(_)
        ));
    }
}
