//! Mock HTTP server standing in for the OAuth and push endpoints

use hms_push::{HmsClient, HmsClientBuilder};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

pub const TOKEN_PATH: &str = "/oauth2/v3/token";
pub const APP_ID: &str = "123";
pub const APP_SECRET: &str = "s3cret";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn push_path(&self) -> String {
        format!("/v1/{}/messages:send", APP_ID)
    }

    /// Client pointed at the mock server for both endpoints, no retry pause.
    pub fn create_test_client(&self, retry_times: u32) -> hms_push::Result<HmsClient> {
        HmsClientBuilder::new()
            .app_id(APP_ID)
            .app_secret(APP_SECRET)
            .retry_times(retry_times)
            .retry_interval(Duration::ZERO)
            .http_timeout(Duration::from_secs(5))
            .token_url_override(format!("{}{}", self.base_url, TOKEN_PATH))
            .push_url_override(&self.base_url)
            .build()
    }

    /// Token endpoint answering `status` with `body`, expecting the client-credentials form.
    pub async fn mock_token(&mut self, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", TOKEN_PATH)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::Exact(format!(
                "grant_type=client_credentials&client_secret={}&client_id={}",
                APP_SECRET, APP_ID
            )))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Push endpoint answering `status` with `body` for requests bearing `access_token`.
    pub async fn mock_push(&mut self, access_token: &str, status: usize, body: &str, hits: usize) -> Mock {
        let path = self.push_path();
        self.server
            .mock("POST", path.as_str())
            .match_header("authorization", format!("Bearer {}", access_token).as_str())
            .match_header("content-type", "application/json;charset=utf-8")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}
