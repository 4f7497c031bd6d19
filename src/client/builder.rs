use crate::auth::{Credentials, TokenManager, DEFAULT_TOKEN_URL};
use crate::client::core::HmsClient;
use crate::error::ErrorContext;
use crate::transport::{HttpTransport, HttpTransportConfig, Transport};
use crate::{Error, Result};
use keyring::Entry;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PUSH_BASE_URL: &str = "https://api.push.hicloud.com";

/// Bound on the refresh done inside a send.
pub const DEFAULT_SEND_REFRESH_TIMEOUT: Duration = Duration::from_secs(3);

/// Keyring service holding app secrets, keyed by app id.
pub const KEYRING_SERVICE: &str = "hms-push";

/// Builder for [`HmsClient`].
///
/// Transport settings not set here fall back to `HMS_RETRY_TIMES`,
/// `HMS_RETRY_INTERVAL_MS`, `HMS_HTTP_TIMEOUT_SECS` and `HMS_PROXY_URL`.
pub struct HmsClientBuilder {
    app_id: Option<String>,
    app_secret: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    retry_times: Option<u32>,
    retry_interval: Option<Duration>,
    proxy_url: Option<String>,
    http_timeout: Option<Duration>,
    refresh_timeout: Duration,
    /// Override the token endpoint (primarily for testing with mock servers)
    token_url_override: Option<String>,
    /// Override the push API base URL (primarily for testing with mock servers)
    push_url_override: Option<String>,
}

impl HmsClientBuilder {
    pub fn new() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            transport: None,
            retry_times: None,
            retry_interval: None,
            proxy_url: None,
            http_timeout: None,
            refresh_timeout: DEFAULT_SEND_REFRESH_TIMEOUT,
            token_url_override: None,
            push_url_override: None,
        }
    }

    /// Credentials from `HMS_APP_ID` and `HMS_APP_SECRET`.
    ///
    /// Without `HMS_APP_SECRET`, the secret is looked up in the OS keyring under
    /// service `hms-push` with the app id as user.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        let app_id = env::var("HMS_APP_ID").ok().filter(|s| !s.is_empty());
        let secret = env::var("HMS_APP_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| app_id.as_deref().and_then(secret_from_keyring));
        builder.app_id = app_id;
        builder.app_secret = secret;
        builder
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Use a custom transport. Retry, proxy and timeout settings are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_times(mut self, times: u32) -> Self {
        self.retry_times = Some(times);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Bound on the token refresh a send performs when it has no token or the
    /// provider rejected the token. Default 3 seconds.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn token_url_override(mut self, url: impl Into<String>) -> Self {
        self.token_url_override = Some(url.into());
        self
    }

    /// Replace `https://api.push.hicloud.com`; the `/v1/<appId>/messages:send` path is kept.
    pub fn push_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.push_url_override = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<HmsClient> {
        let app_id = required(self.app_id, "builder.app_id", "appId can't be empty")?;
        let app_secret = required(self.app_secret, "builder.app_secret", "appSecret can't be empty")?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut config = HttpTransportConfig::from_env();
                if let Some(times) = self.retry_times {
                    config.retry.max_retry_times = times;
                }
                if let Some(interval) = self.retry_interval {
                    config.retry.retry_interval = interval;
                }
                if self.proxy_url.is_some() {
                    config.proxy_url = self.proxy_url;
                }
                if self.http_timeout.is_some() {
                    config.timeout = self.http_timeout;
                }
                debug!(
                    retry_times = config.retry.max_retry_times,
                    retry_interval_ms = config.retry.retry_interval.as_millis() as u64,
                    proxy = config.proxy_url.is_some(),
                    "building http transport"
                );
                Arc::new(HttpTransport::new(config)?)
            }
        };

        let token_url = self
            .token_url_override
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
        let push_base = self
            .push_url_override
            .unwrap_or_else(|| DEFAULT_PUSH_BASE_URL.to_string());
        let push_url = format!(
            "{}/v1/{}/messages:send",
            push_base.trim_end_matches('/'),
            app_id
        );

        let tokens = Arc::new(TokenManager::with_token_url(
            Credentials::new(app_id, app_secret),
            Arc::clone(&transport),
            token_url,
        ));

        Ok(HmsClient {
            tokens,
            transport,
            push_url,
            refresh_timeout: self.refresh_timeout,
        })
    }
}

impl Default for HmsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn required(value: Option<String>, field: &str, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::configuration_with_context(
            message,
            ErrorContext::new()
                .with_field_path(field)
                .with_source("client_builder"),
        )),
    }
}

fn secret_from_keyring(app_id: &str) -> Option<String> {
    let entry = Entry::new(KEYRING_SERVICE, app_id).ok()?;
    match entry.get_password() {
        Ok(secret) if !secret.is_empty() => Some(secret),
        _ => None,
    }
}
