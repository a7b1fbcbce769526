//! HTTP text source

use super::TextSource;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Fetches text with a GET request; any non-success status is a failure
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("wordfreq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::source_unavailable(url.as_str(), e))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl TextSource for HttpSource {
    fn locator(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<String> {
        info!("Fetching text from {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| PipelineError::source_unavailable(self.url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::SourceUnavailable {
                locator: self.url.to_string(),
                reason: format!("HTTP status {status}"),
                source: None,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| PipelineError::source_unavailable(self.url.as_str(), e))?;
        debug!("Fetched {} bytes from {}", text.len(), self.url);
        Ok(text)
    }
}
