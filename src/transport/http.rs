use super::{HttpRequest, HttpResponse, RetryPolicy, Transport, TransportError};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Method, Proxy};
use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfig {
    pub retry: RetryPolicy,
    /// Per-attempt timeout. `None` means [`DEFAULT_HTTP_TIMEOUT`].
    pub timeout: Option<Duration>,
    pub proxy_url: Option<String>,
}

impl HttpTransportConfig {
    /// Defaults overridden by `HMS_RETRY_TIMES`, `HMS_RETRY_INTERVAL_MS`,
    /// `HMS_HTTP_TIMEOUT_SECS` and `HMS_PROXY_URL` when they are set and parse.
    pub fn from_env() -> Self {
        let mut retry = RetryPolicy::default();
        if let Some(times) = env::var("HMS_RETRY_TIMES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            retry.max_retry_times = times;
        }
        if let Some(ms) = env::var("HMS_RETRY_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            retry.retry_interval = Duration::from_millis(ms);
        }

        let timeout = env::var("HMS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let proxy_url = env::var("HMS_PROXY_URL").ok().filter(|s| !s.trim().is_empty());

        Self {
            retry,
            timeout,
            proxy_url,
        }
    }
}

/// reqwest-backed [`Transport`] with bounded retries.
pub struct HttpTransport {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT))
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = config.proxy_url.as_deref() {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| TransportError::InvalidProxy(format!("{}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            policy: config.retry,
        })
    }

    /// Transport with the given retry policy and default HTTP settings.
    pub fn with_retry(policy: RetryPolicy) -> Result<Self> {
        Self::new(HttpTransportConfig {
            retry: policy,
            ..Default::default()
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn build_request(&self, request: &HttpRequest) -> Result<reqwest::Request> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body().is_empty() {
            builder = builder.body(request.body().clone());
        }
        builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }

    async fn send_once(&self, template: &reqwest::Request, attempt: u32) -> Result<HttpResponse> {
        let req = template
            .try_clone()
            .ok_or_else(|| TransportError::Other("request body cannot be replayed".to_string()))?;
        debug!(
            attempt,
            method = %req.method(),
            url = %req.url(),
            "sending http request"
        );
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;
        Ok(HttpResponse::streaming(resp))
    }
}

fn ensure_supported_method(method: &Method) -> std::result::Result<(), TransportError> {
    if *method == Method::GET || *method == Method::POST {
        Ok(())
    } else {
        Err(TransportError::UnsupportedMethod(method.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse> {
        ensure_supported_method(request.method())?;
        // A request that cannot be built fails once; only sending is retried.
        let template = self.build_request(request)?;
        self.policy
            .execute(cancel, |attempt| self.send_once(&template, attempt))
            .await
    }
}
