//! OAuth2 client-credentials token management.
//!
//! [`TokenManager`] keeps the current access token behind an [`ArcSwapOption`], so a
//! reader always gets a complete token snapshot without waiting for a refresh in flight.
//! Refreshes are serialized; the last one to complete wins. Senders that find the token
//! already replaced while they waited for the refresh lock reuse it instead of fetching again.

use crate::error::ErrorContext;
use crate::transport::{HttpRequest, Transport};
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth-login.cloud.huawei.com/oauth2/v3/token";

pub const DEFAULT_AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Wait before retrying a failed background refresh.
pub const AUTO_REFRESH_BACKOFF: Duration = Duration::from_secs(10);

/// App id and secret issued by the developer console.
#[derive(Clone)]
pub struct Credentials {
    app_id: String,
    app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// `grant_type=client_credentials&client_secret=..&client_id=..`, form encoded.
    fn form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_secret", &self.app_secret)
            .append_pair("client_id", &self.app_id)
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Token endpoint response.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AccessToken {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("error", &self.error)
            .field("error_description", &self.error_description)
            .finish()
    }
}

/// Fetches and caches the access token.
pub struct TokenManager {
    credentials: Credentials,
    token_url: String,
    transport: Arc<dyn Transport>,
    current: ArcSwapOption<AccessToken>,
    refresh_lock: Mutex<()>,
    auto_refresh_loops: AtomicUsize,
}

impl TokenManager {
    pub fn new(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self::with_token_url(credentials, transport, DEFAULT_TOKEN_URL)
    }

    pub fn with_token_url(
        credentials: Credentials,
        transport: Arc<dyn Transport>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            transport,
            current: ArcSwapOption::empty(),
            refresh_lock: Mutex::new(()),
            auto_refresh_loops: AtomicUsize::new(0),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The last successfully fetched token, if any.
    pub fn current_token(&self) -> Option<Arc<AccessToken>> {
        self.current.load_full()
    }

    /// Fetch a new token and make it current.
    ///
    /// Any failure, including a non-200 status or an undecodable body, is reported as
    /// [`Error::Authentication`] and leaves the cached token untouched.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<Arc<AccessToken>> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store(cancel).await
    }

    /// Refresh unless the cached token already differs from `seen`.
    ///
    /// `seen` is the token the caller last used, or `None` when it found nothing cached.
    /// The check runs under the refresh lock, so callers queued behind an in-flight
    /// refresh get its result without another round trip to the token endpoint.
    pub async fn refresh_if_stale(
        &self,
        seen: Option<&Arc<AccessToken>>,
        cancel: &CancellationToken,
    ) -> Result<Arc<AccessToken>> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.current.load_full() {
            let replaced = match seen {
                Some(seen) => !Arc::ptr_eq(&current, seen),
                None => true,
            };
            if replaced {
                debug!(app_id = self.credentials.app_id(), "token already refreshed by another caller");
                return Ok(current);
            }
        }

        self.fetch_and_store(cancel).await
    }

    async fn fetch_and_store(&self, cancel: &CancellationToken) -> Result<Arc<AccessToken>> {
        let token = match self.request_token(cancel).await {
            Ok(token) => Arc::new(token),
            Err(details) => {
                warn!(app_id = self.credentials.app_id(), error = %details, "token refresh failed");
                return Err(Error::authentication_with_context(
                    ErrorContext::new()
                        .with_details(details)
                        .with_source("token_manager"),
                ));
            }
        };

        self.current.store(Some(Arc::clone(&token)));
        info!(
            app_id = self.credentials.app_id(),
            expires_in = token.expires_in,
            "access token refreshed"
        );
        Ok(token)
    }

    async fn request_token(&self, cancel: &CancellationToken) -> std::result::Result<AccessToken, String> {
        let request = HttpRequest::post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(self.credentials.form_body())
            .build();

        let response = self
            .transport
            .send(&request, cancel)
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != 200 {
            return Err(format!("token endpoint returned status {}", status));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        serde_json::from_slice::<AccessToken>(&body)
            .map_err(|e| format!("undecodable token response: {}", e))
    }

    /// Keep the token fresh in the background until `cancel` fires.
    ///
    /// Refreshes immediately, then every `interval`. A failed refresh is retried after
    /// [`AUTO_REFRESH_BACKOFF`].
    pub fn spawn_auto_refresh(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let running = AutoRefreshGuard::enter(Arc::clone(self));

        tokio::spawn(async move {
            let manager = &running.0;
            info!(interval_secs = interval.as_secs(), "token auto-refresh started");
            while !cancel.is_cancelled() {
                let wait = match manager.refresh(&cancel).await {
                    Ok(_) => interval,
                    Err(err) => {
                        warn!(error = %err, backoff_secs = AUTO_REFRESH_BACKOFF.as_secs(), "auto-refresh failed");
                        AUTO_REFRESH_BACKOFF
                    }
                };
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
            debug!("token auto-refresh stopped");
        })
    }

    /// True while at least one auto-refresh loop is alive.
    pub fn is_auto_refresh_running(&self) -> bool {
        self.auto_refresh_loops.load(Ordering::SeqCst) > 0
    }
}

/// Counts a live auto-refresh loop. Dropped with the task, including on abort.
struct AutoRefreshGuard(Arc<TokenManager>);

impl AutoRefreshGuard {
    fn enter(manager: Arc<TokenManager>) -> Self {
        manager.auto_refresh_loops.fetch_add(1, Ordering::SeqCst);
        Self(manager)
    }
}

impl Drop for AutoRefreshGuard {
    fn drop(&mut self) {
        self.0.auto_refresh_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("has_token", &self.current.load().is_some())
            .field("auto_refresh_running", &self.is_auto_refresh_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    /// Answers each token request with the next scripted response; repeats the last one.
    struct ScriptedTransport {
        script: Vec<(u16, String)>,
        calls: AtomicU32,
        bodies: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<(u16, String)>) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicU32::new(0),
                bodies: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &HttpRequest, _cancel: &CancellationToken) -> Result<HttpResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            self.bodies
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(request.body()).into_owned());
            let (status, body) = self.script[n.min(self.script.len() - 1)].clone();
            Ok(HttpResponse::new(status, body))
        }
    }

    fn token_json(value: &str) -> String {
        format!(r#"{{"access_token":"{}","expires_in":3600,"token_type":"Bearer"}}"#, value)
    }

    fn manager(transport: Arc<ScriptedTransport>) -> Arc<TokenManager> {
        Arc::new(TokenManager::new(Credentials::new("123", "s3cret+/="), transport))
    }

    #[tokio::test]
    async fn test_refresh_posts_form_and_caches_token() {
        let transport = ScriptedTransport::new(vec![(200, token_json("t1"))]);
        let tm = manager(transport.clone());
        assert!(tm.current_token().is_none());

        let token = tm.refresh(&CancellationToken::new()).await.unwrap();
        assert_eq!(token.access_token, "t1");
        assert_eq!(token.expires_in, Some(3600));
        assert_eq!(tm.current_token().unwrap().access_token, "t1");
        assert_eq!(
            transport.bodies.lock().unwrap()[0],
            "grant_type=client_credentials&client_secret=s3cret%2B%2F%3D&client_id=123"
        );
    }

    #[tokio::test]
    async fn test_non_200_is_authentication_error_and_keeps_old_token() {
        let transport = ScriptedTransport::new(vec![
            (200, token_json("good")),
            (401, r#"{"error":1101,"error_description":"invalid client"}"#.to_string()),
        ]);
        let tm = manager(transport);
        tm.refresh(&CancellationToken::new()).await.unwrap();

        let err = tm.refresh(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().starts_with("refresh token failed"));
        assert_eq!(tm.current_token().unwrap().access_token, "good");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_authentication_error() {
        let tm = manager(ScriptedTransport::new(vec![(200, "not json".to_string())]));
        let err = tm.refresh(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
        assert!(tm.current_token().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_tokens() {
        let script = (0..50).map(|i| (200, token_json(&format!("token-{:03}", i)))).collect();
        let tm = manager(ScriptedTransport::new(script));
        tm.refresh(&CancellationToken::new()).await.unwrap();

        let writer = {
            let tm = Arc::clone(&tm);
            tokio::spawn(async move {
                for _ in 0..49 {
                    tm.refresh(&CancellationToken::new()).await.unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tm = Arc::clone(&tm);
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let token = tm.current_token().unwrap();
                        assert!(token.access_token.starts_with("token-"));
                        assert_eq!(token.access_token.len(), "token-000".len());
                        assert_eq!(token.expires_in, Some(3600));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(tm.current_token().unwrap().access_token, "token-049");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_runs_until_cancelled() {
        let transport = ScriptedTransport::new(vec![(200, token_json("auto"))]);
        let tm = manager(transport.clone());
        let cancel = CancellationToken::new();

        let handle = tm.spawn_auto_refresh(Duration::from_secs(60), cancel.clone());
        assert!(tm.is_auto_refresh_running());

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(transport.calls(), 3);
        assert_eq!(tm.current_token().unwrap().access_token, "auto");

        cancel.cancel();
        handle.await.unwrap();
        assert!(!tm.is_auto_refresh_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_backs_off_after_failure() {
        let transport = ScriptedTransport::new(vec![(500, String::new()), (200, token_json("late"))]);
        let tm = manager(transport.clone());
        let cancel = CancellationToken::new();
        let handle = tm.spawn_auto_refresh(DEFAULT_AUTO_REFRESH_INTERVAL, cancel.clone());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transport.calls(), 1);
        assert!(tm.current_token().is_none());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(tm.current_token().unwrap().access_token, "late");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_if_stale_reuses_a_replaced_token() {
        let transport = ScriptedTransport::new(vec![(200, token_json("t1")), (200, token_json("t2"))]);
        let tm = manager(transport.clone());
        let cancel = CancellationToken::new();

        let first = tm.refresh_if_stale(None, &cancel).await.unwrap();
        assert_eq!(first.access_token, "t1");
        assert_eq!(transport.calls(), 1);

        // Nothing cached was seen, but a token exists now: no new fetch.
        let cached = tm.refresh_if_stale(None, &cancel).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &first));
        assert_eq!(transport.calls(), 1);

        // The rejected token is still current, so it is replaced.
        let second = tm.refresh_if_stale(Some(&first), &cancel).await.unwrap();
        assert_eq!(second.access_token, "t2");
        assert_eq!(transport.calls(), 2);

        // A second caller rejected by the same stale token gets the new one for free.
        let shared = tm.refresh_if_stale(Some(&first), &cancel).await.unwrap();
        assert!(Arc::ptr_eq(&shared, &second));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_flag_tracks_every_loop() {
        let tm = manager(ScriptedTransport::new(vec![(200, token_json("auto"))]));
        let first = CancellationToken::new();
        let second = CancellationToken::new();

        let a = tm.spawn_auto_refresh(Duration::from_secs(60), first.clone());
        let b = tm.spawn_auto_refresh(Duration::from_secs(60), second.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        first.cancel();
        a.await.unwrap();
        assert!(tm.is_auto_refresh_running());

        second.cancel();
        b.await.unwrap();
        assert!(!tm.is_auto_refresh_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_loop_clears_running_flag() {
        let tm = manager(ScriptedTransport::new(vec![(200, token_json("auto"))]));
        let handle = tm.spawn_auto_refresh(Duration::from_secs(60), CancellationToken::new());
        assert!(tm.is_auto_refresh_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!tm.is_auto_refresh_running());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("123", "s3cret");
        assert!(!format!("{:?}", creds).contains("s3cret"));
    }
}
