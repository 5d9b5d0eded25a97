//! Canonical request URIs for the library sync API.
//!
//! A URI is assembled from a [`RequestParams`] set:
//!
//! ```text
//! {base}/users/{id}/{target}[/{objectKey}]?{query}
//! {base}/groups/{id}/{target}[/{objectKey}]?{query}
//! {base}/users/{id}/publications/{target}[/{objectKey}]?{query}
//! ```
//!
//! Only parameters named in [`QUERY_PARAM_ALLOW_LIST`] reach the query string,
//! and they always appear in allow-list order. Anything else in the parameter
//! set is dropped, so routing fields can travel alongside real parameters.

use versync_types::{LibraryRef, LibraryVersion};

use crate::RequestError;

/// Query parameter names the API accepts, in canonical output order.
pub const QUERY_PARAM_ALLOW_LIST: [&str; 16] = [
    "session",
    "format",
    "include",
    "includeTrashed",
    "itemType",
    "itemKey",
    "collectionKey",
    "searchKey",
    "tag",
    "linkMode",
    "start",
    "limit",
    "sort",
    "direction",
    "since",
    "sincetime",
];

/// A query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Emitted as a single `key=value` pair.
    Scalar(String),
    /// Emitted as one `key=value` pair per element, in order.
    List(Vec<String>),
}

impl QueryValue {
    fn is_empty(&self) -> bool {
        match self {
            QueryValue::Scalar(v) => v.is_empty(),
            QueryValue::List(v) => v.is_empty(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<LibraryVersion> for QueryValue {
    fn from(value: LibraryVersion) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::List(values)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        QueryValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Named query parameters. Setting a name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, QueryValue)>);

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing a previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`Self::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Value for `name`, if set.
    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Copy every parameter of `other` into `self`, overriding on conflict.
    pub fn extend(&mut self, other: &QueryParams) {
        for (name, value) in &other.0 {
            self.set(name.clone(), value.clone());
        }
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything needed to address one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// Library the request is scoped to.
    pub library: LibraryRef,
    /// Endpoint below the library, e.g. `items` or `settings`.
    pub target: Option<String>,
    /// Single object addressed below the target.
    pub object_key: Option<String>,
    /// Query parameters (filtered through the allow-list on output).
    pub query: QueryParams,
}

impl RequestParams {
    /// Parameters for `library` with no target yet.
    pub fn new(library: LibraryRef) -> Self {
        Self {
            library,
            target: None,
            object_key: None,
            query: QueryParams::new(),
        }
    }

    /// Set the endpoint target.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Address a single object below the target.
    pub fn object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = Some(key.into());
        self
    }

    /// Set one query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(name, value);
        self
    }

    /// Merge a set of query parameters.
    pub fn params(mut self, query: &QueryParams) -> Self {
        self.query.extend(query);
        self
    }
}

/// Join `path` onto `base` with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build the query string (without leading `?`) for `query`.
///
/// Returns an empty string when no allow-listed, non-empty parameter is set.
pub fn build_query_string(query: &QueryParams) -> String {
    let mut pairs = Vec::new();
    for name in QUERY_PARAM_ALLOW_LIST {
        let Some(value) = query.get(name) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let key = urlencoding::encode(name);
        match value {
            QueryValue::Scalar(v) => pairs.push(format!("{}={}", key, urlencoding::encode(v))),
            QueryValue::List(values) => {
                for v in values {
                    pairs.push(format!("{}={}", key, urlencoding::encode(v)));
                }
            }
        }
    }
    pairs.join("&")
}

/// Build the absolute URI for `params` below `base_url`.
///
/// # Errors
///
/// Returns [`RequestError::MissingTarget`] when `params.target` is unset.
pub fn build_request_uri(base_url: &str, params: &RequestParams) -> Result<String, RequestError> {
    let target = params
        .target
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(RequestError::MissingTarget)?;

    let mut path = format!("{}/{}", params.library.path(), target);
    if let Some(key) = params.object_key.as_deref().filter(|k| !k.is_empty()) {
        path.push('/');
        path.push_str(key);
    }

    let mut uri = join_url(base_url, &path);
    let query = build_query_string(&params.query);
    if !query.is_empty() {
        uri.push('?');
        uri.push_str(&query);
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://api.example.org/";

    // ===========================================
    // Path Tests
    // ===========================================

    #[test]
    fn user_library_path() {
        let params = RequestParams::new(LibraryRef::user(10)).target("items");
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/users/10/items"
        );
    }

    #[test]
    fn group_library_path_with_object_key() {
        let params = RequestParams::new(LibraryRef::group(7))
            .target("collections")
            .object_key("ABCD2345");
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/groups/7/collections/ABCD2345"
        );
    }

    #[test]
    fn publications_library_path() {
        let params = RequestParams::new(LibraryRef::publications(10)).target("items");
        let uri = build_request_uri(BASE, &params).unwrap();
        assert_eq!(uri, "https://api.example.org/users/10/publications/items");
        assert!(!uri.contains("publicationss"));
    }

    #[test]
    fn base_without_trailing_slash() {
        let params = RequestParams::new(LibraryRef::user(1)).target("settings");
        assert_eq!(
            build_request_uri("https://api.example.org", &params).unwrap(),
            "https://api.example.org/users/1/settings"
        );
    }

    #[test]
    fn missing_target_is_an_error() {
        let params = RequestParams::new(LibraryRef::user(1));
        assert_eq!(
            build_request_uri(BASE, &params),
            Err(RequestError::MissingTarget)
        );

        let params = RequestParams::new(LibraryRef::user(1)).target("");
        assert_eq!(
            build_request_uri(BASE, &params),
            Err(RequestError::MissingTarget)
        );
    }

    // ===========================================
    // Query String Tests
    // ===========================================

    #[test]
    fn query_follows_allow_list_order() {
        let params = RequestParams::new(LibraryRef::user(1))
            .target("items")
            .param("since", 5u64)
            .param("includeTrashed", 1u64)
            .param("format", "versions");
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/users/1/items?format=versions&includeTrashed=1&since=5"
        );
    }

    #[test]
    fn unknown_params_are_dropped() {
        let params = RequestParams::new(LibraryRef::user(1))
            .target("items")
            .param("libraryType", "user")
            .param("tags", "a||b")
            .param("limit", 25u64);
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/users/1/items?limit=25"
        );
    }

    #[test]
    fn empty_values_are_omitted() {
        let params = RequestParams::new(LibraryRef::user(1))
            .target("items")
            .param("format", "")
            .param("tag", Vec::<String>::new());
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/users/1/items"
        );
    }

    #[test]
    fn list_values_repeat_the_key() {
        let tags: &[&str] = &["one", "two & three"];
        let params = RequestParams::new(LibraryRef::group(3))
            .target("items")
            .param("tag", tags);
        assert_eq!(
            build_request_uri(BASE, &params).unwrap(),
            "https://api.example.org/groups/3/items?tag=one&tag=two%20%26%20three"
        );
    }

    #[test]
    fn scalar_values_are_percent_encoded() {
        let query = QueryParams::new().with("itemKey", "A&B=C/D");
        assert_eq!(build_query_string(&query), "itemKey=A%26B%3DC%2FD");
    }

    #[test]
    fn later_set_replaces_earlier_value() {
        let mut query = QueryParams::new().with("format", "json");
        query.extend(&QueryParams::new().with("format", "versions"));
        assert_eq!(build_query_string(&query), "format=versions");
    }

    // ===========================================
    // Property Tests
    // ===========================================

    fn allowed_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(QUERY_PARAM_ALLOW_LIST.to_vec())
    }

    proptest! {
        #[test]
        fn values_roundtrip_through_encoding(value in ".*[&=/]?.*") {
            let query = QueryParams::new().with("itemKey", value.clone());
            let qs = build_query_string(&query);
            if value.is_empty() {
                prop_assert_eq!(qs, "");
            } else {
                let encoded = qs.strip_prefix("itemKey=").unwrap();
                prop_assert!(!encoded.contains('&'));
                prop_assert!(!encoded.contains('='));
                prop_assert!(!encoded.contains('/'));
                let decoded = urlencoding::decode(encoded).unwrap();
                prop_assert_eq!(decoded.as_ref(), value.as_str());
            }
        }

        #[test]
        fn output_is_restricted_and_ordered(
            entries in prop::collection::vec(
                (prop_oneof![allowed_name().prop_map(String::from), "[a-zA-Z]{1,12}"], "[a-z0-9]{1,8}"),
                0..20,
            )
        ) {
            let mut query = QueryParams::new();
            for (name, value) in &entries {
                query.set(name.clone(), value.clone());
            }
            let qs = build_query_string(&query);
            let names: Vec<&str> = if qs.is_empty() {
                Vec::new()
            } else {
                qs.split('&').map(|pair| pair.split('=').next().unwrap()).collect()
            };

            let positions: Vec<usize> = names
                .iter()
                .map(|n| QUERY_PARAM_ALLOW_LIST.iter().position(|a| a == n).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
