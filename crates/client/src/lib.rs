//! HTTP client for the change-desk REST API.
//!
//! Provides environment configuration, transport error mapping, request
//! body encoding, read retry with backoff, and [`api::HttpSession`], the
//! bearer-token implementation of the core session capability.

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
pub mod wire;

pub use api::HttpSession;
pub use config::ClientConfig;
