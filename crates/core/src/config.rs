use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::time::Duration;

pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const SEARCH_ENGINE_ID_ENV: &str = "SEARCH_ENGINE_ID";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Static parameters merged into every search request.
///
/// The query is never stored here; see [`crate::search::SearchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfiguration {
    pub api_key: Option<String>,
    pub search_engine_id: String,
    pub num_results: u32,
    pub language: String,
    pub country: String,
    pub date_restrict: Option<String>,
    pub extra_params: BTreeMap<String, String>,
    pub endpoint: String,
}

impl Default for SearchConfiguration {
    fn default() -> Self {
        Self {
            api_key: None,
            search_engine_id: String::new(),
            num_results: 3,
            language: "lang_en".to_string(),
            country: "us".to_string(),
            date_restrict: Some("y[1]".to_string()),
            extra_params: BTreeMap::new(),
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub search: SearchConfiguration,
    pub generator: GeneratorConfig,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`, failing on the first
    /// missing credential. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        let api_key = require(GOOGLE_API_KEY_ENV)?;
        let search_engine_id = require(SEARCH_ENGINE_ID_ENV)?;
        let openai_api_key = require(OPENAI_API_KEY_ENV)?;

        let defaults = SearchConfiguration::default();
        let num_results = match get("SEARCH_NUM_RESULTS") {
            Some(raw) => parse_number("SEARCH_NUM_RESULTS", &raw)?,
            None => defaults.num_results,
        };
        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number("HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT.as_secs(),
        };

        // An explicitly empty SEARCH_DATE_RESTRICT disables the restriction.
        let date_restrict = match lookup("SEARCH_DATE_RESTRICT") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => defaults.date_restrict.clone(),
        };

        let search = SearchConfiguration {
            api_key: Some(api_key),
            search_engine_id,
            num_results,
            language: get("SEARCH_LANGUAGE").unwrap_or(defaults.language),
            country: get("SEARCH_COUNTRY").unwrap_or(defaults.country),
            date_restrict,
            extra_params: BTreeMap::new(),
            endpoint: get("SEARCH_ENDPOINT").unwrap_or(defaults.endpoint),
        };

        let generator = GeneratorConfig {
            api_key: openai_api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        };

        Ok(Self {
            search,
            generator,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|error| ConfigError::Invalid {
        key,
        details: format!("{raw:?}: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GOOGLE_API_KEY", "google-key"),
        ("SEARCH_ENGINE_ID", "engine-id"),
        ("OPENAI_API_KEY", "openai-key"),
    ];

    #[test]
    fn defaults_follow_the_reference_search_parameters() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.search.api_key.as_deref(), Some("google-key"));
        assert_eq!(config.search.search_engine_id, "engine-id");
        assert_eq!(config.search.num_results, 3);
        assert_eq!(config.search.language, "lang_en");
        assert_eq!(config.search.country, "us");
        assert_eq!(config.search.date_restrict.as_deref(), Some("y[1]"));
        assert_eq!(config.generator.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let error = AppConfig::from_lookup(lookup_from(&REQUIRED[1..])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingVar("GOOGLE_API_KEY")));

        let error = AppConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "google-key"),
            ("SEARCH_ENGINE_ID", "engine-id"),
            ("OPENAI_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::MissingVar("OPENAI_API_KEY")));
    }

    #[test]
    fn optional_overrides_are_applied() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SEARCH_NUM_RESULTS", "7"),
            ("SEARCH_DATE_RESTRICT", ""),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.search.num_results, 7);
        assert_eq!(config.search.date_restrict, None);
        assert_eq!(config.generator.model, "gpt-4o-mini");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SEARCH_NUM_RESULTS", "three"));
        let error = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Invalid {
                key: "SEARCH_NUM_RESULTS",
                ..
            }
        ));
    }
}
