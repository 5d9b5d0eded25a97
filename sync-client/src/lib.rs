//! # sync-client
//!
//! Client library for versioned library sync REST APIs.
//!
//! This is the main library that sync engines use to exchange versioned
//! object batches with the server.
//!
//! ## Features
//!
//! - **Optimistic concurrency**: writes carry `If-Unmodified-Since-Version`;
//!   conflicts surface as [`ClientError::PreconditionFailed`]
//! - **Conditional reads**: unchanged data comes back as `None`, not an error
//! - **Bounded fan-out**: large key sets are split into order-preserving,
//!   independently failing requests
//! - **Backpressure**: server `Backoff` signals pause the shared [`Dispatcher`]
//! - **Transport Abstraction**: Pluggable transport layer (reqwest, mock)
//!
//! ## Example
//!
//! ```ignore
//! use versync_client::{ApiClient, ClientConfig};
//! use versync_types::{LibraryRef, LibraryVersion, Method, ObjectType};
//!
//! let config = ClientConfig::from_file(Path::new("versync.toml"))?;
//! let client = ApiClient::with_defaults(&config)?;
//!
//! let library = LibraryRef::user(12345);
//! let result = client
//!     .upload_objects(library, Method::Patch, LibraryVersion::new(42), ObjectType::Item, &objects)
//!     .await?;
//! println!("library now at version {}", result.library_version);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use batch::{split_and_dispatch, BatchOutcome};
pub use client::{ApiClient, SendOptions};
pub use config::{ClientConfig, ConfigError};
pub use dispatch::{ConcurrentCaller, Dispatcher, Job, MockDispatcher};
pub use error::ClientError;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, HttpTransportConfig, MockTransport, ResponseType,
    Transport, TransportError,
};
