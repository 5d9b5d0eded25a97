//! Library scope and ordering types for versync.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The kind of remote library a request is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    /// A user's personal library.
    User,
    /// A shared group library.
    Group,
    /// A user's "My Publications" library. Addressed under the owning user.
    Publications,
}

impl LibraryType {
    /// The lowercase wire name of this library type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::User => "user",
            LibraryType::Group => "group",
            LibraryType::Publications => "publications",
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(LibraryType::User),
            "group" => Ok(LibraryType::Group),
            "publications" => Ok(LibraryType::Publications),
            other => Err(TypesError::UnknownLibraryType(other.to_string())),
        }
    }
}

/// Identifies the remote collection scope of a request.
///
/// For [`LibraryType::Publications`] the id is the owning user's id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryRef {
    /// Kind of library.
    pub library_type: LibraryType,
    /// userID or groupID.
    pub id: u64,
}

impl LibraryRef {
    /// Create a library reference.
    pub fn new(library_type: LibraryType, id: u64) -> Self {
        Self { library_type, id }
    }

    /// A user library.
    pub fn user(user_id: u64) -> Self {
        Self::new(LibraryType::User, user_id)
    }

    /// A group library.
    pub fn group(group_id: u64) -> Self {
        Self::new(LibraryType::Group, group_id)
    }

    /// The publications library of a user.
    pub fn publications(user_id: u64) -> Self {
        Self::new(LibraryType::Publications, user_id)
    }

    /// Path prefix for this library, without leading or trailing slash.
    ///
    /// `users/{id}`, `groups/{id}`, or `users/{id}/publications`.
    pub fn path(&self) -> String {
        match self.library_type {
            LibraryType::Publications => format!("users/{}/publications", self.id),
            other => format!("{}s/{}", other.as_str(), self.id),
        }
    }
}

impl fmt::Display for LibraryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.library_type, self.id)
    }
}

/// A library version number assigned by the server.
///
/// Versions never decrease for a given library. They serve both as a
/// conditional-read token and as a conditional-write precondition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LibraryVersion(u64);

impl LibraryVersion {
    /// Create a LibraryVersion with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this version.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The version of a library that has never been modified.
    pub fn zero() -> Self {
        Self(0)
    }
}

impl From<u64> for LibraryVersion {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for LibraryVersion {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibraryVersion({})", self.0)
    }
}
