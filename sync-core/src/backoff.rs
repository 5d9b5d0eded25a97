//! Interpretation of server `Backoff` signals.
//!
//! A `Backoff: N` response header asks the client to stop issuing new
//! requests for `N` seconds. Values over [`MAX_BACKOFF_SECS`] fail a sanity
//! check and are ignored outright (not clamped), so a misconfigured server
//! cannot stall the client indefinitely.

use std::time::Duration;
use versync_types::Headers;

use crate::headers::BACKOFF;

/// Longest backoff, in seconds, that will be honored.
pub const MAX_BACKOFF_SECS: u64 = 3600;

/// What a response's `Backoff` header asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffSignal {
    /// No `Backoff` header.
    Absent,
    /// Pause dispatch for this long.
    Pause(Duration),
    /// Requested seconds exceed [`MAX_BACKOFF_SECS`]; ignored.
    ExceedsLimit(u64),
    /// Header value is not a non-negative integer; ignored.
    Unparseable(String),
}

impl BackoffSignal {
    /// Read the `Backoff` header from response headers.
    pub fn from_headers(headers: &Headers) -> Self {
        match headers.get(BACKOFF) {
            Some(value) => Self::parse(value),
            None => BackoffSignal::Absent,
        }
    }

    /// Interpret a raw `Backoff` header value.
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<u64>() {
            Ok(secs) if secs > MAX_BACKOFF_SECS => BackoffSignal::ExceedsLimit(secs),
            Ok(secs) => BackoffSignal::Pause(Duration::from_secs(secs)),
            Err(_) => BackoffSignal::Unparseable(value.to_string()),
        }
    }

    /// How long to pause, if this signal should be honored.
    pub fn pause_duration(&self) -> Option<Duration> {
        match self {
            BackoffSignal::Pause(d) => Some(*d),
            _ => None,
        }
    }
}
