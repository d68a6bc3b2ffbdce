//! HTTP client module
//!
//! A thin GET client over reqwest with default headers, ordered query
//! parameters and status classification.
//!
//! Requests are issued exactly once: a transport failure or a non-success
//! status is returned to the caller as an error.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
