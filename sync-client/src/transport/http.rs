//! HttpTransport - Real HTTP transport using reqwest.
//!
//! This transport implements the Transport trait on top of a shared
//! `reqwest::Client` connection pool. Dropped connections on safe methods
//! are retried a bounded number of times; everything else is reported as-is.

use super::{HttpRequest, HttpResponse, ResponseType, Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::time::Duration;
use tracing::warn;
use versync_types::{Headers, Method};

use crate::config::ClientConfig;

/// Configuration for HttpTransport.
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Extra attempts after a connection failure on GET/HEAD.
    pub connect_retries: u32,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_retries: 2,
        }
    }
}

impl From<&ClientConfig> for HttpTransportConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            connect_retries: config.connect_retries,
        }
    }
}

/// HttpTransport implements the Transport trait using reqwest.
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransport::new()?;
/// let response = transport
///     .request(HttpRequest::new(Method::Get, "https://api.example.org/keys/current"))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a new HttpTransport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HttpTransport with custom configuration.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::RequestFailed(format!("Failed to build client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Transport configuration.
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn retries_allowed(method: Method) -> bool {
        matches!(method, Method::Get | Method::Head)
    }

    async fn execute_once(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.uri);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if request.dont_cache {
            builder = builder.header(CACHE_CONTROL, "no-cache");
        }
        if request.response_type == ResponseType::Json && !request.headers.contains("Accept") {
            builder = builder.header(ACCEPT, "application/json");
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut attempt = 0;
        loop {
            match self.execute_once(&request).await {
                Err(TransportError::ConnectionFailed(reason))
                    if Self::retries_allowed(request.method)
                        && attempt < self.config.connect_retries =>
                {
                    attempt += 1;
                    warn!(
                        uri = %request.uri,
                        attempt,
                        "connection failed ({reason}); retrying"
                    );
                }
                other => return other,
            }
        }
    }
}
