//! # hms-push-rust
//!
//! Async client for HUAWEI Push Kit.
//!
//! ## Overview
//!
//! The crate covers the server side of sending a push message: it obtains and caches
//! an OAuth2 access token with the client-credentials grant, checks a message against
//! the provider's field rules before anything leaves the process, and posts it through
//! a transport that retries transient failures a bounded number of times.
//!
//! ## Key Features
//!
//! - **Token lifecycle**: [`auth::TokenManager`] keeps an atomically swapped token snapshot,
//!   with optional background refresh
//! - **Validation**: [`message::validate`] rejects malformed messages locally
//! - **Resilient delivery**: [`transport::HttpTransport`] retries network errors and 5xx
//!   with a fixed interval and cooperative cancellation
//! - **One-shot re-auth**: a send rejected for an expired token is refreshed and resent once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hms_push::{HmsClientBuilder, PushMessage};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> hms_push::Result<()> {
//!     let client = HmsClientBuilder::new()
//!         .app_id("your-app-id")
//!         .app_secret("your-app-secret")
//!         .build()?;
//!
//!     let msg = PushMessage::android_notification(vec!["device-token".into()], "Hello", "World");
//!     let resp = client.send_message(&msg, &CancellationToken::new()).await?;
//!     println!("{} {}", resp.code, resp.msg);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder and the send path |
//! | [`auth`] | Credentials and access token management |
//! | [`message`] | Message model, validation and wire encoding |
//! | [`transport`] | HTTP transport and retry policy |
//! | [`response`] | Response envelope and result codes |

pub mod auth;
pub mod client;
pub mod message;
pub mod response;
pub mod transport;

pub use auth::{AccessToken, Credentials, TokenManager};
pub use client::{HmsClient, HmsClientBuilder};
pub use message::{Message, PushMessage, ValidationError};
pub use response::{PushResponse, ResultCode};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RetryPolicy, Transport, TransportError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
