//! # sync-core
//!
//! Pure protocol logic for versync (no I/O, instant tests).
//!
//! This crate implements the request-shaping and response-interpreting rules
//! of the versioned library sync API without any network access:
//!
//! - [`uri`]: canonical endpoint URIs and allow-listed query strings
//! - [`headers`]: protocol header injection
//! - [`backoff`]: interpretation of server `Backoff` signals
//! - [`batch`]: partitioning of key sets into bounded requests
//! - [`version`]: `Last-Modified-Version` extraction and checks
//!
//! The actual I/O is performed by `sync-client`, which feeds responses
//! through these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backoff;
pub mod batch;
pub mod error;
pub mod headers;
pub mod uri;
pub mod version;

pub use backoff::{BackoffSignal, MAX_BACKOFF_SECS};
pub use batch::{batch_count, split_keys, DEFAULT_MAX_OBJECTS_PER_REQUEST};
pub use error::{ProtocolError, RequestError};
pub use headers::HeaderPolicy;
pub use uri::{
    build_query_string, build_request_uri, join_url, QueryParams, QueryValue, RequestParams,
    QUERY_PARAM_ALLOW_LIST,
};
pub use version::{ensure_not_regressed, library_version};
