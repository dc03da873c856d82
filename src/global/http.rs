use std::time::Duration;

use reqwest::Client;

use crate::global::config::HttpConfig;

/// Build the shared outbound HTTP client. The configured timeout bounds
/// every upstream call, including relayed ones.
pub fn build_client(config: &HttpConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .expect("Failed to create HTTP client")
}
