//! Protocol headers exchanged with the sync API.

use std::fmt;
use versync_types::Headers;

/// Request header carrying the protocol version.
pub const API_VERSION: &str = "Zotero-API-Version";
/// Request header carrying the credential.
pub const API_KEY: &str = "Zotero-API-Key";
/// Conditional-read request header.
pub const IF_MODIFIED_SINCE_VERSION: &str = "If-Modified-Since-Version";
/// Conditional-write request header.
pub const IF_UNMODIFIED_SINCE_VERSION: &str = "If-Unmodified-Since-Version";
/// Response header carrying the library version.
pub const LAST_MODIFIED_VERSION: &str = "Last-Modified-Version";
/// Response header asking clients to slow down, in seconds.
pub const BACKOFF: &str = "Backoff";

/// Injects the protocol headers every request must carry.
#[derive(Clone)]
pub struct HeaderPolicy {
    api_version: String,
    api_key: Option<String>,
}

impl HeaderPolicy {
    /// Create a policy for `api_version`, with an optional credential.
    pub fn new(api_version: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_version: api_version.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// The protocol version sent with every request.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The configured credential, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Add the version header and, if configured, the key header.
    ///
    /// Headers of other names are left untouched.
    pub fn attach(&self, mut headers: Headers) -> Headers {
        headers.set(API_VERSION, self.api_version.clone());
        if let Some(key) = &self.api_key {
            headers.set(API_KEY, key.clone());
        }
        headers
    }
}

impl fmt::Debug for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderPolicy")
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_version_and_key() {
        let policy = HeaderPolicy::new("3", Some("secret".into()));
        let headers = policy.attach(Headers::new());

        assert_eq!(headers.get(API_VERSION), Some("3"));
        assert_eq!(headers.get(API_KEY), Some("secret"));
    }

    #[test]
    fn no_key_header_without_credential() {
        let policy = HeaderPolicy::new("3", None);
        let headers = policy.attach(Headers::new());

        assert_eq!(headers.get(API_VERSION), Some("3"));
        assert!(!headers.contains(API_KEY));

        let policy = HeaderPolicy::new("3", Some(String::new()));
        assert!(policy.api_key().is_none());
    }

    #[test]
    fn keeps_caller_headers() {
        let policy = HeaderPolicy::new("3", Some("secret".into()));
        let headers = policy.attach(
            Headers::new()
                .with(IF_UNMODIFIED_SINCE_VERSION, "42")
                .with("Content-Type", "application/json"),
        );

        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get(IF_UNMODIFIED_SINCE_VERSION), Some("42"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
    }

    #[test]
    fn overrides_stale_version_header() {
        let policy = HeaderPolicy::new("3", None);
        let headers = policy.attach(Headers::new().with("zotero-api-version", "1"));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(API_VERSION), Some("3"));
    }

    #[test]
    fn debug_redacts_key() {
        let policy = HeaderPolicy::new("3", Some("hunter2".into()));
        let debug = format!("{:?}", policy);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
