use crate::config::DEFAULT_HTTP_TIMEOUT;
use crate::traits::PageFetcher;
use crate::{ConfigError, FetchError, FetchedPage};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("websearch-rag/", env!("CARGO_PKG_VERSION"));

const TEXTUAL_CONTENT_TYPES: [&str; 3] = ["text/html", "application/xhtml+xml", "text/plain"];

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ConfigError::HttpClient(error.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        debug!(url = %url, "fetching page");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(content_type) = &content_type {
            if !is_textual(content_type) {
                return Err(FetchError::UnsupportedContentType(content_type.clone()));
            }
        }

        let content = response.text().await?;
        Ok(FetchedPage {
            url: url.clone(),
            content,
            content_type,
            fetched_at: Utc::now(),
        })
    }
}

/// Whether a `Content-Type` header names something the converters can read.
pub fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    TEXTUAL_CONTENT_TYPES.contains(&mime.as_str())
}
