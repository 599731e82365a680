//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized blocking HTTP client for the model
//! backend. Files are classified one at a time, so a single pooled client is
//! reused for the whole run.

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::time::Duration;

/// Global HTTP client for OpenAI-compatible chat completion calls
///
/// Configuration:
/// - no overall request timeout: a slow completion stalls the run rather than
///   being abandoned halfway
/// - 30s connect timeout so an unreachable host still fails the file
/// - a couple of idle connections, since requests are strictly sequential
pub static OPENAI_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Option::<Duration>::None)
        .connect_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to create OpenAI HTTP client")
});

/// Get the global OpenAI HTTP client
#[inline]
pub fn openai_client() -> &'static Client {
    &OPENAI_CLIENT
}
