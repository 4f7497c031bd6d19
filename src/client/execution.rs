//! Send path: validate, encode, authorize, post, and re-authorize once on a token failure.

use super::core::HmsClient;
use crate::auth::AccessToken;
use crate::error::ErrorContext;
use crate::message::PushMessage;
use crate::response::PushResponse;
use crate::transport::HttpRequest;
use crate::{Error, Result};
use bytes::Bytes;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";

impl HmsClient {
    /// Send `msg` and return the provider's envelope.
    ///
    /// A non-success `code` is data, not an error. Validation, transport, token and
    /// decode failures are errors. When the provider answers with a token failure the
    /// token is refreshed and the message resent once.
    pub async fn send_message(&self, msg: &PushMessage, cancel: &CancellationToken) -> Result<PushResponse> {
        msg.validate()?;
        let body = Bytes::from(msg.encode()?);
        let client_request_id = Uuid::new_v4().to_string();

        let token = self.ensure_token(cancel).await?;
        let start = std::time::Instant::now();
        let mut response = self.post(&body, &token, &client_request_id, cancel).await?;

        if response.is_token_failure() {
            warn!(
                client_request_id = %client_request_id,
                code = %response.code,
                "access token rejected; refreshing and resending once"
            );
            let token = self.refresh_bounded(Some(&token), cancel).await?;
            response = self.post(&body, &token, &client_request_id, cancel).await?;
        }

        info!(
            client_request_id = %client_request_id,
            request_id = %response.request_id,
            code = %response.code,
            validate_only = msg.validate_only,
            duration_ms = start.elapsed().as_millis() as u64,
            "push message sent"
        );
        Ok(response)
    }

    /// The cached token, or a freshly fetched one when nothing is cached yet.
    async fn ensure_token(&self, cancel: &CancellationToken) -> Result<Arc<AccessToken>> {
        match self.tokens.current_token() {
            Some(token) => Ok(token),
            None => {
                debug!("no cached access token; refreshing");
                self.refresh_bounded(None, cancel).await
            }
        }
    }

    /// Replace `seen` (or fill an empty cache) within `refresh_timeout`.
    async fn refresh_bounded(
        &self,
        seen: Option<&Arc<AccessToken>>,
        cancel: &CancellationToken,
    ) -> Result<Arc<AccessToken>> {
        let refresh = self.tokens.refresh_if_stale(seen, cancel);
        match tokio::time::timeout(self.refresh_timeout, refresh).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_ms: self.refresh_timeout.as_millis() as u64,
                context: ErrorContext::new()
                    .with_details("token refresh")
                    .with_source("dispatcher"),
            }),
        }
    }

    async fn post(
        &self,
        body: &Bytes,
        token: &AccessToken,
        client_request_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PushResponse> {
        let request = HttpRequest::post(&self.push_url)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .header("Authorization", token.bearer())
            .body(body.clone())
            .build();

        debug!(client_request_id, url = %self.push_url, bytes = body.len(), "posting push message");
        let response = self.transport.send(&request, cancel).await?;
        let status = response.status();
        let raw = response.bytes().await?;

        serde_json::from_slice::<PushResponse>(&raw).map_err(|e| {
            Error::decode_with_context(
                e.to_string(),
                ErrorContext::new()
                    .with_field_path("response.body")
                    .with_details(format!("status {}", status))
                    .with_source("dispatcher"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::client::HmsClientBuilder;
    use crate::message::{PushMessage, ValidationError};
    use crate::transport::{HttpRequest, HttpResponse, Transport};
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Token endpoint answers after `token_delay`; pushes succeed at once.
    struct SlowTokenTransport {
        calls: AtomicU32,
        token_delay: Duration,
    }

    impl SlowTokenTransport {
        fn new(token_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                token_delay,
            })
        }
    }

    #[async_trait]
    impl Transport for SlowTokenTransport {
        async fn send(&self, request: &HttpRequest, _cancel: &CancellationToken) -> Result<HttpResponse> {
            if request.url().ends_with("/messages:send") {
                return Ok(HttpResponse::new(
                    200,
                    r#"{"code":"80000000","msg":"Success","requestId":"r"}"#,
                ));
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.token_delay).await;
            Ok(HttpResponse::new(200, r#"{"access_token":"late"}"#))
        }
    }

    #[tokio::test]
    async fn test_invalid_message_is_never_sent() {
        let transport = SlowTokenTransport::new(Duration::from_secs(10));
        let client = HmsClientBuilder::new()
            .app_id("123")
            .app_secret("s3cret")
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client
            .send_message(&PushMessage::notification("t", "b"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidTargetSelection)
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_refresh_is_bounded() {
        let transport = SlowTokenTransport::new(Duration::from_secs(10));
        let client = HmsClientBuilder::new()
            .app_id("123")
            .app_secret("s3cret")
            .transport(transport.clone())
            .build()
            .unwrap();

        let msg = PushMessage::android_notification(vec!["abc".into()], "t", "b");
        let err = client
            .send_message(&msg, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 3000, .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(client.token().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cold_sends_share_one_refresh() {
        let transport = SlowTokenTransport::new(Duration::from_millis(800));
        let client = Arc::new(
            HmsClientBuilder::new()
                .app_id("123")
                .app_secret("s3cret")
                .transport(transport.clone())
                .build()
                .unwrap(),
        );

        let sends: Vec<_> = (0..6)
            .map(|_| {
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    let msg = PushMessage::android_notification(vec!["abc".into()], "t", "b");
                    client.send_message(&msg, &CancellationToken::new()).await
                })
            })
            .collect();

        for send in sends {
            assert!(send.await.unwrap().unwrap().is_success());
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.token().unwrap().access_token, "late");
    }
}
