use crate::auth::{AccessToken, TokenManager};
use crate::client::builder::HmsClientBuilder;
use crate::transport::Transport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Client for one HMS app.
///
/// `Send + Sync`; share it behind an `Arc` and call [`HmsClient::send_message`] from as
/// many tasks as needed. The cached access token is the only mutable state.
pub struct HmsClient {
    pub(crate) tokens: Arc<TokenManager>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) push_url: String,
    pub(crate) refresh_timeout: Duration,
}

impl HmsClient {
    pub fn builder() -> HmsClientBuilder {
        HmsClientBuilder::new()
    }

    pub fn app_id(&self) -> &str {
        self.tokens.credentials().app_id()
    }

    /// Fully resolved `messages:send` URL.
    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Current cached token, if one has been fetched.
    pub fn token(&self) -> Option<Arc<AccessToken>> {
        self.tokens.current_token()
    }

    /// Fetch a new token now, without the send-path timeout.
    pub async fn refresh_token(&self, cancel: &CancellationToken) -> Result<Arc<AccessToken>> {
        self.tokens.refresh(cancel).await
    }

    /// Keep the token fresh in the background until `cancel` fires.
    ///
    /// Use the same token that stops your senders so both wind down together.
    pub fn start_auto_refresh(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        self.tokens.spawn_auto_refresh(interval, cancel)
    }

    pub fn is_auto_refresh_running(&self) -> bool {
        self.tokens.is_auto_refresh_running()
    }
}

impl std::fmt::Debug for HmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmsClient")
            .field("app_id", &self.app_id())
            .field("push_url", &self.push_url)
            .field("refresh_timeout", &self.refresh_timeout)
            .finish()
    }
}
