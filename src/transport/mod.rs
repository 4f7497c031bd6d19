//! HTTP transport layer.
//!
//! - [`HttpRequest`]: immutable request value, built once per logical send
//! - [`HttpResponse`]: status + headers + a body that is either buffered or still on the wire
//! - [`Transport`]: the pluggable seam the client sends through (fake it in tests)
//! - [`HttpTransport`]: reqwest implementation with bounded, cancellable retries

mod http;
mod retry;

pub use http::{HttpTransport, HttpTransportConfig, DEFAULT_HTTP_TIMEOUT};
pub use retry::{
    is_retryable_status, RetryPolicy, DEFAULT_RETRY_INTERVAL, DEFAULT_RETRY_TIMES,
    RESPONSE_DRAIN_LIMIT,
};

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Sends a request and returns the provider's raw response.
///
/// Implementations own their retry behaviour. The cancellation token is checked
/// cooperatively between attempts; it never aborts an attempt in flight.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse>;
}

/// An immutable HTTP request description.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpRequest {
    pub fn builder(method: Method, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> HttpRequestBuilder {
        Self::builder(Method::POST, url)
    }

    pub fn get(url: impl Into<String>) -> HttpRequestBuilder {
        Self::builder(Method::GET, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Builder for [`HttpRequest`]. Consumed by [`HttpRequestBuilder::build`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpRequestBuilder {
    /// Set a header. Setting the same name twice keeps the position of the first and the value of the last.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

enum Body {
    Buffered(Bytes),
    Streaming(reqwest::Response),
}

/// Response returned by a [`Transport`].
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: Body,
}

impl HttpResponse {
    /// A response with a fully buffered body (used by fakes and tests).
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Buffered(body.into()),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub(crate) fn streaming(resp: reqwest::Response) -> Self {
        Self {
            status: resp.status().as_u16(),
            headers: resp.headers().clone(),
            body: Body::Streaming(resp),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_retryable(&self) -> bool {
        is_retryable_status(self.status)
    }

    /// Collect the whole body.
    pub async fn bytes(self) -> std::result::Result<Bytes, TransportError> {
        match self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(resp) => resp.bytes().await.map_err(TransportError::Http),
        }
    }

    /// Read at most `limit` bytes so the connection can go back to the pool.
    ///
    /// The returned response is buffered and keeps what was read, so it can still be
    /// handed back to the caller if no further attempt is made.
    pub(crate) async fn drain(self, limit: usize) -> std::result::Result<HttpResponse, TransportError> {
        let Self { status, headers, body } = self;
        let mut resp = match body {
            Body::Buffered(bytes) => {
                return Ok(Self {
                    status,
                    headers,
                    body: Body::Buffered(bytes),
                })
            }
            Body::Streaming(resp) => resp,
        };
        let mut read = Vec::new();
        while read.len() < limit {
            match resp.chunk().await? {
                Some(chunk) => read.extend_from_slice(&chunk),
                None => break,
            }
        }
        Ok(Self {
            status,
            headers,
            body: Body::Buffered(Bytes::from(read)),
        })
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            Body::Buffered(bytes) => format!("Buffered({} bytes)", bytes.len()),
            Body::Streaming(_) => "Streaming".to_string(),
        };
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &body)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found method: {0}")]
    UnsupportedMethod(String),

    #[error("fail parse proxy url: {0}")]
    InvalidProxy(String),

    #[error("request cancelled before the first attempt")]
    Cancelled,

    #[error("Transport error: {0}")]
    Other(String),
}
