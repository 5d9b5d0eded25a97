//! Decoded response payloads for versioned library operations.
//!
//! Every payload that comes from a library-scoped endpoint is paired with
//! the `Last-Modified-Version` the server reported alongside it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::LibraryVersion;

/// Library settings, as of `library_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    /// Library version reported by the server.
    pub library_version: LibraryVersion,
    /// Settings keyed by setting name.
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// Keys deleted since a given version, grouped by object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedObjects {
    /// Deleted collection keys
    #[serde(default)]
    pub collections: Vec<String>,
    /// Deleted search keys
    #[serde(default)]
    pub searches: Vec<String>,
    /// Deleted item keys
    #[serde(default)]
    pub items: Vec<String>,
    /// Deleted tag names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deleted setting names
    #[serde(default)]
    pub settings: Vec<String>,
}

impl DeletedObjects {
    /// Whether nothing was deleted.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
            && self.searches.is_empty()
            && self.items.is_empty()
            && self.tags.is_empty()
            && self.settings.is_empty()
    }
}

/// Deletion log contents, as of `library_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// Library version reported by the server.
    pub library_version: LibraryVersion,
    /// Objects deleted since the requested version.
    pub deleted: DeletedObjects,
}

/// Map of object key to object version, as of `library_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsResponse {
    /// Library version reported by the server.
    pub library_version: LibraryVersion,
    /// Object key to object version.
    pub versions: BTreeMap<String, LibraryVersion>,
}

/// A single object the server refused to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedWrite {
    /// Key of the rejected object, when the server could determine it.
    #[serde(default)]
    pub key: Option<String>,
    /// HTTP-like status code for this object.
    #[serde(default)]
    pub code: u16,
    /// Human-readable reason.
    #[serde(default)]
    pub message: String,
    /// Any extra data the server attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Per-object outcome of a write request, keyed by index in the upload batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResults {
    /// Full JSON of objects written successfully
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub successful: BTreeMap<usize, serde_json::Value>,
    /// Keys of objects written successfully
    #[serde(default)]
    pub success: BTreeMap<usize, String>,
    /// Keys of objects that were already up to date
    #[serde(default)]
    pub unchanged: BTreeMap<usize, String>,
    /// Objects the server refused
    #[serde(default)]
    pub failed: BTreeMap<usize, FailedWrite>,
}

/// Result of an upload, stamped with the library version after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// New library version reported by the server.
    pub library_version: LibraryVersion,
    /// Per-object results.
    pub results: WriteResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_results_decode_index_keys() {
        let body = r#"{"success":{"0":"AAAAAAAA","1":"BBBBBBBB"}}"#;
        let results: WriteResults = serde_json::from_str(body).unwrap();

        assert_eq!(results.success.get(&0).map(String::as_str), Some("AAAAAAAA"));
        assert_eq!(results.success.get(&1).map(String::as_str), Some("BBBBBBBB"));
        assert!(results.unchanged.is_empty());
        assert!(results.failed.is_empty());
    }

    #[test]
    fn write_results_decode_failures() {
        let body = r#"{
            "success": {},
            "unchanged": {"0": "CCCCCCCC"},
            "failed": {"1": {"key": "DDDDDDDD", "code": 412, "message": "Item has been modified"}}
        }"#;
        let results: WriteResults = serde_json::from_str(body).unwrap();

        assert_eq!(results.unchanged.len(), 1);
        let failed = &results.failed[&1];
        assert_eq!(failed.key.as_deref(), Some("DDDDDDDD"));
        assert_eq!(failed.code, 412);
    }

    #[test]
    fn deleted_objects_tolerate_missing_groups() {
        let deleted: DeletedObjects = serde_json::from_str(r#"{"items":["AAAAAAAA"]}"#).unwrap();
        assert_eq!(deleted.items, vec!["AAAAAAAA".to_string()]);
        assert!(deleted.collections.is_empty());
        assert!(!deleted.is_empty());
        assert!(DeletedObjects::default().is_empty());
    }

    #[test]
    fn versions_decode_as_library_versions() {
        let versions: BTreeMap<String, LibraryVersion> =
            serde_json::from_str(r#"{"AAAAAAAA": 12, "BBBBBBBB": 40}"#).unwrap();
        assert_eq!(versions["BBBBBBBB"], LibraryVersion::new(40));
    }
}
