//! Send-path behaviour against a scripted in-memory transport.

use async_trait::async_trait;
use hms_push::transport::{HttpRequest, HttpResponse, Transport};
use hms_push::{Error, HmsClient, HmsClientBuilder, PushMessage, ResultCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

const TOKEN_URL: &str = "https://oauth.test/token";
const PUSH_BASE: &str = "https://push.test";

/// Token requests get `token-<n>`; push requests pop the next scripted envelope.
#[derive(Default)]
struct FakeProvider {
    push_script: Mutex<VecDeque<&'static str>>,
    token_calls: Mutex<u32>,
    push_auth_headers: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_push_script(script: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            push_script: Mutex::new(script.iter().copied().collect()),
            ..Default::default()
        })
    }

    fn token_calls(&self) -> u32 {
        *self.token_calls.lock().unwrap()
    }

    fn push_auth_headers(&self) -> Vec<String> {
        self.push_auth_headers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeProvider {
    async fn send(&self, request: &HttpRequest, _cancel: &CancellationToken) -> hms_push::Result<HttpResponse> {
        if request.url() == TOKEN_URL {
            let mut calls = self.token_calls.lock().unwrap();
            *calls += 1;
            let body = format!(r#"{{"access_token":"token-{}","expires_in":3600}}"#, *calls);
            return Ok(HttpResponse::new(200, body));
        }

        assert_eq!(request.url(), format!("{}/v1/123/messages:send", PUSH_BASE));
        assert_eq!(
            request.header("content-type"),
            Some("application/json;charset=utf-8")
        );
        self.push_auth_headers
            .lock()
            .unwrap()
            .push(request.header("authorization").unwrap_or_default().to_string());
        let body = self
            .push_script
            .lock()
            .unwrap()
            .pop_front()
            .expect("push script exhausted");
        Ok(HttpResponse::new(200, body))
    }
}

fn client(provider: Arc<FakeProvider>) -> HmsClient {
    HmsClientBuilder::new()
        .app_id("123")
        .app_secret("s3cret")
        .transport(provider)
        .token_url_override(TOKEN_URL)
        .push_url_override(PUSH_BASE)
        .build()
        .unwrap()
}

fn envelope(code: &str) -> &'static str {
    match code {
        "80000000" => r#"{"code":"80000000","msg":"Success","requestId":"r1"}"#,
        "80200001" => r#"{"code":"80200001","msg":"Oauth authentication error","requestId":"r2"}"#,
        "80200003" => r#"{"code":"80200003","msg":"Oauth Token expired","requestId":"r3"}"#,
        "80300007" => r#"{"code":"80300007","msg":"All the tokens are invalid","requestId":"r4"}"#,
        other => panic!("no envelope for {}", other),
    }
}

fn message() -> PushMessage {
    PushMessage::android_notification(vec!["abc".into()], "t", "b")
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_resent_once() {
    let provider = FakeProvider::with_push_script(&[envelope("80200003"), envelope("80000000")]);
    let client = client(provider.clone());

    let resp = client
        .send_message(&message(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(resp.is_success());
    assert_eq!(provider.token_calls(), 2);
    assert_eq!(
        provider.push_auth_headers(),
        vec!["Bearer token-1".to_string(), "Bearer token-2".to_string()]
    );
    assert_eq!(client.token().unwrap().access_token, "token-2");
}

#[tokio::test]
async fn test_repeated_token_failure_is_returned_not_looped() {
    let provider = FakeProvider::with_push_script(&[envelope("80200001"), envelope("80200001")]);
    let client = client(provider.clone());

    let resp = client
        .send_message(&message(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(resp.result_code(), Some(ResultCode::TokenFailed));
    assert_eq!(provider.token_calls(), 2);
    assert_eq!(provider.push_auth_headers().len(), 2);
}

#[tokio::test]
async fn test_other_provider_codes_are_data() {
    let provider = FakeProvider::with_push_script(&[envelope("80300007")]);
    let client = client(provider.clone());

    let resp = client
        .send_message(&message(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(resp.result_code(), Some(ResultCode::AllTokensInvalid));
    assert_eq!(provider.token_calls(), 1);
    assert_eq!(provider.push_auth_headers().len(), 1);
}

#[tokio::test]
async fn test_concurrent_sends_share_the_client() {
    let script = vec![envelope("80000000"); 8];
    let provider = FakeProvider::with_push_script(&script);
    let client = Arc::new(client(provider.clone()));
    client.refresh_token(&CancellationToken::new()).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.send_message(&message(), &CancellationToken::new()).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_success());
    }
    assert_eq!(provider.token_calls(), 1);
}

#[tokio::test]
async fn test_validation_error_is_propagated_unchanged() {
    let provider = FakeProvider::with_push_script(&[]);
    let client = client(provider.clone());
    let mut msg = message();
    msg.message.topic = Some("news".into());

    let err = client
        .send_message(&msg, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Message validation error: exactly one of token, topic or condition must be specified"
    );
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(provider.token_calls(), 0);
}
