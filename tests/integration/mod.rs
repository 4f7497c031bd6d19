//! Shared fixtures for HTTP-level tests

pub mod mock_server;
