//! HTTP content gateway resolver.

use super::MetadataResolver;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches documents from `{base_url}/{hash}`.
#[derive(Debug, Clone)]
pub struct GatewayMetadataResolver {
    client: Client,
    base_url: String,
}

impl GatewayMetadataResolver {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn document_url(&self, hash: &str) -> String {
        format!("{}/{}", self.base_url, hash)
    }
}

#[async_trait]
impl MetadataResolver for GatewayMetadataResolver {
    async fn fetch(&self, hash: &str) -> Option<Value> {
        let url = self.document_url(hash);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let result = retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(e.to_string()))?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(format!("HTTP {}", status)));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(format!("HTTP {}", status)));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| backoff::Error::permanent(e.to_string()))
        })
        .await;

        match result {
            Ok(document) => {
                debug!(hash, "Resolved lot metadata");
                Some(document)
            }
            Err(e) => {
                warn!(hash, error = %e, "Lot metadata unavailable");
                None
            }
        }
    }
}
