//! `Last-Modified-Version` handling.
//!
//! Every successful library-scoped response carries the library's current
//! version. A missing or malformed value is a contract violation, never an
//! empty result.

use versync_types::{Headers, LibraryVersion};

use crate::headers::LAST_MODIFIED_VERSION;
use crate::ProtocolError;

/// Read the library version from response headers.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the header is absent, empty, or not a
/// non-negative integer.
pub fn library_version(headers: &Headers) -> Result<LibraryVersion, ProtocolError> {
    let value = headers
        .get(LAST_MODIFIED_VERSION)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ProtocolError::MissingVersionHeader(LAST_MODIFIED_VERSION))?;
    value
        .parse()
        .map_err(|_| ProtocolError::InvalidVersionHeader {
            header: LAST_MODIFIED_VERSION,
            value: value.to_string(),
        })
}

/// Check that a write did not move the library version backwards.
///
/// # Errors
///
/// Returns [`ProtocolError::VersionRegressed`] if `received < sent`.
pub fn ensure_not_regressed(
    sent: LibraryVersion,
    received: LibraryVersion,
) -> Result<LibraryVersion, ProtocolError> {
    if received < sent {
        return Err(ProtocolError::VersionRegressed { sent, received });
    }
    Ok(received)
}
