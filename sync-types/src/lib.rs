//! # sync-types
//!
//! Shared types for the versync versioned library sync client.
//!
//! This crate provides the foundational types used across all versync crates:
//! - [`LibraryRef`], [`LibraryType`], [`LibraryVersion`] - Library scope and ordering
//! - [`ObjectType`] - The kinds of objects a library holds
//! - [`Method`], [`Headers`] - Minimal HTTP vocabulary shared with transports
//! - [`SettingsResponse`], [`VersionsResponse`], [`UploadResponse`], ... - Decoded payloads
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod http;
mod library;
mod object;
mod responses;

pub use error::TypesError;
pub use http::{Headers, Method};
pub use library::{LibraryRef, LibraryType, LibraryVersion};
pub use object::ObjectType;
pub use responses::{
    DeletedObjects, DeletedResponse, FailedWrite, SettingsResponse, UploadResponse,
    VersionsResponse, WriteResults,
};
