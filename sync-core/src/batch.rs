//! Partitioning of object key sets into bounded requests.
//!
//! The server caps how many objects one request may name. Larger key sets
//! are split into consecutive chunks that together cover every key exactly
//! once, in the original order.

use crate::RequestError;

/// Default maximum number of object keys per request.
pub const DEFAULT_MAX_OBJECTS_PER_REQUEST: usize = 100;

/// Split `keys` into consecutive chunks of at most `max_batch` keys.
///
/// An empty input yields no chunks. An input no longer than `max_batch`
/// yields exactly one chunk.
///
/// # Errors
///
/// Returns [`RequestError::InvalidBatchSize`] when `max_batch` is zero.
pub fn split_keys<T>(keys: &[T], max_batch: usize) -> Result<Vec<&[T]>, RequestError> {
    if max_batch == 0 {
        return Err(RequestError::InvalidBatchSize);
    }
    Ok(keys.chunks(max_batch).collect())
}

/// Number of chunks [`split_keys`] produces for `len` keys.
pub fn batch_count(len: usize, max_batch: usize) -> usize {
    if max_batch == 0 {
        return 0;
    }
    len.div_ceil(max_batch)
}
