//! ApiClient - the main interface for versync.
//!
//! This module provides [`ApiClient`], which exchanges versioned object
//! batches with a library sync API.
//!
//! # Architecture
//!
//! ApiClient uses pure request-shaping and response-checking rules (from
//! sync-core) and performs the I/O through two injected collaborators:
//!
//! ```text
//! Application → ApiClient → Dispatcher → Transport → Network
//!                   ↓
//!              sync-core (URIs, headers, versions, backoff)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use versync_client::{ApiClient, ClientConfig};
//! use versync_types::LibraryRef;
//!
//! let config = ClientConfig::new("https://api.zotero.org/").with_api_key("...");
//! let client = ApiClient::with_defaults(&config)?;
//!
//! if let Some(settings) = client.get_settings(LibraryRef::user(1), None).await? {
//!     println!("settings at version {}", settings.library_version);
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};
use versync_core::headers::{IF_MODIFIED_SINCE_VERSION, IF_UNMODIFIED_SINCE_VERSION};
use versync_core::{
    ensure_not_regressed, join_url, library_version, BackoffSignal, HeaderPolicy, QueryParams,
    RequestError, RequestParams, MAX_BACKOFF_SECS,
};
use versync_types::{
    DeletedResponse, Headers, LibraryRef, LibraryVersion, Method, ObjectType, SettingsResponse,
    UploadResponse, VersionsResponse,
};

use crate::batch::{split_and_dispatch, BatchOutcome};
use crate::config::ClientConfig;
use crate::dispatch::{ConcurrentCaller, Dispatcher, Job};
use crate::error::ClientError;
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, HttpTransportConfig, ResponseType, Transport,
};

/// Per-request options for [`ApiClient::send`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Extra request headers. Protocol headers are added on top.
    pub headers: Headers,
    /// Request body.
    pub body: Option<String>,
    /// Accepted statuses. `None` accepts any 2xx.
    pub success_codes: Option<Vec<u16>>,
    /// Send with background priority.
    pub background: bool,
    /// Response decoding mode (default: text).
    pub response_type: Option<ResponseType>,
}

impl SendOptions {
    /// Default options: no extra headers, no body, 2xx accepted, foreground.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Accept exactly these statuses.
    pub fn success_codes(mut self, codes: &[u16]) -> Self {
        self.success_codes = Some(codes.to_vec());
        self
    }

    /// Send with background priority.
    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Override the response decoding mode.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    fn accepts(&self, status: u16) -> bool {
        match &self.success_codes {
            Some(codes) => codes.contains(&status),
            None => (200..300).contains(&status),
        }
    }
}

/// Client for a versioned library sync API.
///
/// Generic over the [`Transport`] performing HTTP exchanges and the
/// [`Dispatcher`] scheduling them.
pub struct ApiClient<T: Transport, D: Dispatcher> {
    base_url: String,
    headers: HeaderPolicy,
    max_objects_per_request: usize,
    transport: T,
    dispatcher: D,
}

impl ApiClient<HttpTransport, ConcurrentCaller> {
    /// Create a client using the reqwest transport and a
    /// [`ConcurrentCaller`] sized from `config`.
    pub fn with_defaults(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::with_config(HttpTransportConfig::from(config))?;
        let dispatcher = ConcurrentCaller::new(config.max_concurrent_requests);
        Self::new(config, transport, dispatcher)
    }
}

impl<T: Transport, D: Dispatcher> ApiClient<T, D> {
    /// Create a new ApiClient.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `config` does not validate.
    pub fn new(config: &ClientConfig, transport: T, dispatcher: D) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            headers: HeaderPolicy::new(config.api_version.clone(), config.api_key.clone()),
            max_objects_per_request: config.max_objects_per_request,
            transport,
            dispatcher,
        })
    }

    /// Root URL of the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Maximum object keys named by one request.
    pub fn max_objects_per_request(&self) -> usize {
        self.max_objects_per_request
    }

    /// Get a reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a reference to the dispatcher.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Build the absolute URI for `params`.
    pub fn build_request_uri(&self, params: &RequestParams) -> Result<String, ClientError> {
        Ok(versync_core::build_request_uri(&self.base_url, params)?)
    }

    /// Send one request through the dispatcher.
    ///
    /// Protocol headers are attached, caching is disabled, and a response
    /// with a status outside `options.success_codes` becomes
    /// [`ClientError::UnexpectedStatus`]. Accepted responses are checked for
    /// a `Backoff` header before being returned.
    pub async fn send(
        &self,
        method: Method,
        uri: String,
        options: SendOptions,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = HttpRequest::new(method, uri.clone());
        request.headers = self.headers.attach(options.headers.clone());
        request.body = options.body.clone();
        request.dont_cache = true;
        request.foreground = !options.background;
        request.response_type = options.response_type.unwrap_or_default();

        let job: Job<'_> = Box::pin(async move {
            let response = self.transport.request(request).await?;
            if !options.accepts(response.status) {
                return Err(ClientError::UnexpectedStatus {
                    method,
                    uri,
                    status: response.status,
                    body: response.body,
                });
            }
            self.observe_response(&response);
            Ok(response)
        });
        self.dispatcher.start(job).await
    }

    fn observe_response(&self, response: &HttpResponse) {
        match BackoffSignal::from_headers(&response.headers) {
            BackoffSignal::Absent => {}
            BackoffSignal::Pause(duration) => {
                info!("server requested backoff of {}s", duration.as_secs());
                self.dispatcher.pause(duration);
            }
            BackoffSignal::ExceedsLimit(secs) => {
                debug!("ignoring Backoff of {secs}s (limit {MAX_BACKOFF_SECS}s)");
            }
            BackoffSignal::Unparseable(value) => {
                debug!("ignoring unparseable Backoff value {value:?}");
            }
        }
    }

    // ===========================================
    // Account and group metadata
    // ===========================================

    /// Fetch metadata for the configured API key.
    ///
    /// Returns `None` if the server does not know the key. The key itself is
    /// removed from the returned object.
    pub async fn get_key_info(&self) -> Result<Option<Value>, ClientError> {
        let key = self.headers.api_key().ok_or(RequestError::MissingApiKey)?;
        let uri = join_url(&self.base_url, &format!("keys/{}", urlencoding::encode(key)));
        let response = self
            .send(Method::Get, uri, SendOptions::new().success_codes(&[200, 404]))
            .await?;
        if response.status == 404 {
            return Ok(None);
        }
        let mut json: Value = parse_json(&response.body)?;
        if let Some(object) = json.as_object_mut() {
            object.remove("key");
        }
        Ok(Some(json))
    }

    /// Fetch the metadata version of every group `user_id` belongs to.
    ///
    /// These are versions of group metadata, not of group library data.
    pub async fn get_group_versions(
        &self,
        user_id: u64,
    ) -> Result<BTreeMap<u64, LibraryVersion>, ClientError> {
        if user_id == 0 {
            return Err(RequestError::MissingId("User ID").into());
        }
        let uri = self.build_request_uri(
            &RequestParams::new(LibraryRef::user(user_id))
                .target("groups")
                .param("format", "versions"),
        )?;
        let response = self.send(Method::Get, uri, SendOptions::new()).await?;
        parse_json(&response.body)
    }

    /// Fetch group metadata. Returns `None` if the group does not exist.
    pub async fn get_group_info(&self, group_id: u64) -> Result<Option<Value>, ClientError> {
        if group_id == 0 {
            return Err(RequestError::MissingId("Group ID").into());
        }
        let uri = join_url(&self.base_url, &format!("groups/{group_id}"));
        let response = self
            .send(Method::Get, uri, SendOptions::new().success_codes(&[200, 404]))
            .await?;
        if response.status == 404 {
            return Ok(None);
        }
        parse_json(&response.body).map(Some)
    }

    // ===========================================
    // Library reads
    // ===========================================

    /// Fetch library settings.
    ///
    /// With `since`, returns `None` if nothing changed after that version.
    pub async fn get_settings(
        &self,
        library: LibraryRef,
        since: Option<LibraryVersion>,
    ) -> Result<Option<SettingsResponse>, ClientError> {
        let since = since.filter(|v| v.value() > 0);
        let mut params = RequestParams::new(library).target("settings");
        let mut options = SendOptions::new().success_codes(&[200, 304]);
        if let Some(since) = since {
            params = params.param("since", since);
            options = options.header(IF_MODIFIED_SINCE_VERSION, since.to_string());
        }
        let uri = self.build_request_uri(&params)?;

        let response = self.send(Method::Get, uri, options).await?;
        if response.status == 304 {
            return Ok(None);
        }
        let library_version = library_version(&response.headers)?;
        Ok(Some(SettingsResponse {
            library_version,
            settings: parse_json(&response.body)?,
        }))
    }

    /// Fetch keys deleted after `since` (default 0).
    ///
    /// Returns `None` if `since` predates the start of the server's
    /// deletion log, in which case a full sync is needed.
    pub async fn get_deleted(
        &self,
        library: LibraryRef,
        since: Option<LibraryVersion>,
    ) -> Result<Option<DeletedResponse>, ClientError> {
        let since = since.unwrap_or_default();
        let uri = self.build_request_uri(
            &RequestParams::new(library)
                .target("deleted")
                .param("since", since),
        )?;

        let response = self
            .send(Method::Get, uri, SendOptions::new().success_codes(&[200, 409]))
            .await?;
        if response.status == 409 {
            debug!("'since' value '{since}' is earlier than the beginning of the delete log");
            return Ok(None);
        }
        let library_version = library_version(&response.headers)?;
        Ok(Some(DeletedResponse {
            library_version,
            deleted: parse_json(&response.body)?,
        }))
    }

    /// Fetch the version of every object of `object_type`, filtered by
    /// `query` (e.g. `since`, `sincetime`).
    ///
    /// With `if_modified_since`, returns `None` if the library has not
    /// changed after that version. Trashed items are always included.
    pub async fn get_versions(
        &self,
        library: LibraryRef,
        object_type: ObjectType,
        query: &QueryParams,
        if_modified_since: Option<LibraryVersion>,
    ) -> Result<Option<VersionsResponse>, ClientError> {
        let mut params = RequestParams::new(library)
            .target(object_type.plural())
            .param("format", "versions")
            .params(query);
        if object_type == ObjectType::Item {
            params = params.param("includeTrashed", "1");
        }
        let uri = self.build_request_uri(&params)?;

        let mut options = SendOptions::new().success_codes(&[200, 304]);
        if let Some(version) = if_modified_since.filter(|v| v.value() > 0) {
            options = options.header(IF_MODIFIED_SINCE_VERSION, version.to_string());
        }

        let response = self.send(Method::Get, uri, options).await?;
        if response.status == 304 {
            return Ok(None);
        }
        let library_version = library_version(&response.headers)?;
        Ok(Some(VersionsResponse {
            library_version,
            versions: parse_json(&response.body)?,
        }))
    }

    /// Fetch the JSON of the objects named by `keys`.
    ///
    /// Keys are fetched in chunks of at most `max_objects_per_request`, all
    /// in flight at once. Outcome `i` holds the objects of chunk `i`, or the
    /// error that chunk hit; one failed chunk does not affect the others.
    /// An empty key set makes no requests.
    ///
    /// # Errors
    ///
    /// Fails up front if `object_type` cannot be fetched by key.
    pub async fn download_objects<S>(
        &self,
        library: LibraryRef,
        object_type: ObjectType,
        keys: &[S],
    ) -> Result<Vec<BatchOutcome<Vec<Value>>>, ClientError>
    where
        S: AsRef<str> + Sync,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let key_param = match object_type {
            ObjectType::Item | ObjectType::Collection | ObjectType::Search => {
                object_type.key_param()
            }
            ObjectType::Tag | ObjectType::Setting => None,
        }
        .ok_or(RequestError::UnsupportedObjectType(object_type))?;

        split_and_dispatch(keys, self.max_objects_per_request, |chunk| {
            self.download_chunk(library, object_type, key_param, chunk)
        })
        .await
    }

    async fn download_chunk<S: AsRef<str>>(
        &self,
        library: LibraryRef,
        object_type: ObjectType,
        key_param: &'static str,
        keys: &[S],
    ) -> Result<Vec<Value>, ClientError> {
        debug!(
            "Retrieving {} {}",
            keys.len(),
            object_type.name_for(keys.len())
        );

        let mut params = RequestParams::new(library)
            .target(object_type.plural())
            .param("format", "json")
            .param(key_param, join_keys(keys, ","));
        if object_type == ObjectType::Item {
            params = params.param("includeTrashed", "1");
        }
        let uri = self.build_request_uri(&params)?;

        let response = self.send(Method::Get, uri, SendOptions::new()).await?;
        parse_json(&response.body)
    }

    // ===========================================
    // Library writes
    // ===========================================

    /// Create (`POST`) or update (`PATCH`) objects, provided the library is
    /// still at `library_version`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidRequest`] for any other method, before any
    ///   request is made
    /// - [`ClientError::PreconditionFailed`] if the library has changed
    /// - [`ClientError::Protocol`] if the response lacks a valid
    ///   `Last-Modified-Version` or it is older than `library_version`
    pub async fn upload_objects(
        &self,
        library: LibraryRef,
        method: Method,
        library_version: LibraryVersion,
        object_type: ObjectType,
        objects: &[Value],
    ) -> Result<UploadResponse, ClientError> {
        if !matches!(method, Method::Post | Method::Patch) {
            return Err(RequestError::InvalidMethod(method).into());
        }

        debug!(
            "Uploading {} {}",
            objects.len(),
            object_type.name_for(objects.len())
        );
        debug!("Sending {IF_UNMODIFIED_SINCE_VERSION}: {library_version}");

        let body = serde_json::to_string(objects)?;
        let uri =
            self.build_request_uri(&RequestParams::new(library).target(object_type.plural()))?;
        let options = SendOptions::new()
            .header(IF_UNMODIFIED_SINCE_VERSION, library_version.to_string())
            .header("Content-Type", "application/json")
            .body(body)
            .success_codes(&[200, 412]);

        let response = self.send(method, uri, options).await?;
        let new_version = self.written_version(library_version, &response)?;
        Ok(UploadResponse {
            library_version: new_version,
            results: parse_json(&response.body)?,
        })
    }

    /// Delete the objects named by `keys`, provided the library is still at
    /// `library_version`. Returns the new library version.
    ///
    /// Tags are named by tag text; every other type by object key.
    pub async fn upload_deletions<S: AsRef<str>>(
        &self,
        library: LibraryRef,
        library_version: LibraryVersion,
        object_type: ObjectType,
        keys: &[S],
    ) -> Result<LibraryVersion, ClientError> {
        if keys.is_empty() {
            return Err(RequestError::NoKeys.into());
        }
        let key_param = object_type
            .key_param()
            .ok_or(RequestError::UnsupportedObjectType(object_type))?;

        debug!(
            "Uploading {} {object_type} deletion{}",
            keys.len(),
            if keys.len() == 1 { "" } else { "s" }
        );
        debug!("Sending {IF_UNMODIFIED_SINCE_VERSION}: {library_version}");

        let uri = self.build_request_uri(
            &RequestParams::new(library)
                .target(object_type.plural())
                .param(key_param, join_keys(keys, object_type.key_separator())),
        )?;
        let options = SendOptions::new()
            .header(IF_UNMODIFIED_SINCE_VERSION, library_version.to_string())
            .success_codes(&[204, 412]);

        let response = self.send(Method::Delete, uri, options).await?;
        self.written_version(library_version, &response)
    }

    fn written_version(
        &self,
        sent: LibraryVersion,
        response: &HttpResponse,
    ) -> Result<LibraryVersion, ClientError> {
        if response.status == 412 {
            warn!("Server returned 412: {}", response.body);
            return Err(ClientError::PreconditionFailed {
                sent,
                response: response.clone(),
            });
        }
        let received = library_version(&response.headers)?;
        Ok(ensure_not_regressed(sent, received)?)
    }
}

fn join_keys<S: AsRef<str>>(keys: &[S], separator: &str) -> String {
    keys.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

fn parse_json<V: DeserializeOwned>(body: &str) -> Result<V, ClientError> {
    serde_json::from_str(body).map_err(|e| {
        error!(payload = body, "failed to parse JSON response: {e}");
        ClientError::Json(e)
    })
}
