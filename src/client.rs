//! Push client.
//!
//! Keep the public surface small: build an [`HmsClient`] with [`HmsClientBuilder`], then
//! call [`HmsClient::send_message`]. The send path lives in `client/execution.rs`.

pub mod builder;
pub mod core;
mod execution;

pub use builder::{HmsClientBuilder, DEFAULT_PUSH_BASE_URL, DEFAULT_SEND_REFRESH_TIMEOUT, KEYRING_SERVICE};
pub use core::HmsClient;
