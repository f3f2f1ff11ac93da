use crate::config::{SearchConfiguration, DEFAULT_HTTP_TIMEOUT, GOOGLE_API_KEY_ENV};
use crate::traits::WebSearch;
use crate::{ConfigError, SearchError, SearchOutput, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const BACKEND_NAME: &str = "custom-search-api";
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Option<Vec<CustomSearchItem>>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

/// Query parameters for one call: the static configuration plus the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn new(config: &SearchConfiguration, api_key: &str, query: &str) -> Self {
        let mut params = vec![
            ("key".to_string(), api_key.to_string()),
            ("cx".to_string(), config.search_engine_id.clone()),
            ("num".to_string(), config.num_results.to_string()),
            ("lr".to_string(), config.language.clone()),
            ("gl".to_string(), config.country.clone()),
        ];
        if let Some(date_restrict) = &config.date_restrict {
            params.push(("dateRestrict".to_string(), date_restrict.clone()));
        }
        for (key, value) in &config.extra_params {
            if key != "q" {
                params.push((key.clone(), value.clone()));
            }
        }
        params.push(("q".to_string(), query.to_string()));

        Self {
            endpoint: config.endpoint.clone(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct CustomSearchClient {
    client: Client,
    api_key: String,
    config: SearchConfiguration,
    top_k: usize,
}

impl CustomSearchClient {
    /// Builds a client. The key comes from `config.api_key`, falling back to
    /// `env_default` (usually the value of `GOOGLE_API_KEY`).
    pub fn new(
        config: SearchConfiguration,
        env_default: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::with_timeout(config, env_default, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(
        config: SearchConfiguration,
        env_default: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .or(env_default)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential {
                component: "CustomSearchClient",
                env_var: GOOGLE_API_KEY_ENV,
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ConfigError::HttpClient(error.to_string()))?;

        Ok(Self {
            client,
            api_key,
            config,
            top_k: DEFAULT_TOP_K,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn request_for(&self, query: &str) -> Result<SearchRequest, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(SearchRequest::new(&self.config, &self.api_key, query))
    }
}

#[async_trait]
impl WebSearch for CustomSearchClient {
    async fn search(&self, query: &str) -> Result<SearchOutput, SearchError> {
        let request = self.request_for(query)?;
        let endpoint = Url::parse(&request.endpoint)?;
        debug!(endpoint = %endpoint, query, "sending search request");

        let response = self
            .client
            .get(endpoint)
            .query(&request.params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                backend: BACKEND_NAME,
                status: status.as_u16(),
                details,
            });
        }

        let body = response.text().await?;
        let output = parse_search_response(&body, self.top_k)?;
        info!(query, results = output.len(), "search completed");
        Ok(output)
    }
}

/// Parses a Custom Search API body. A body without `items` is an empty result.
pub fn parse_search_response(body: &str, top_k: usize) -> Result<SearchOutput, SearchError> {
    let parsed: CustomSearchResponse =
        serde_json::from_str(body).map_err(|error| SearchError::Api {
            backend: BACKEND_NAME,
            status: 200,
            details: format!("unreadable response body: {error}"),
        })?;

    let results = parsed
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match Url::parse(&item.link) {
            Ok(link) => Some(SearchResult {
                title: item.title,
                snippet: item.snippet,
                link,
            }),
            Err(error) => {
                warn!(link = %item.link, reason = %error, "dropping search item with invalid link");
                None
            }
        })
        .take(top_k)
        .collect();

    Ok(SearchOutput { results })
}
