use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("{component} expects an API key; set {env_var} or pass it explicitly")]
    MissingCredential {
        component: &'static str,
        env_var: &'static str,
    },

    #[error("invalid value for {key}: {details}")]
    Invalid { key: &'static str, details: String },

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Search failures. Transport errors are stored without their request URL,
/// which carries the API key as a query parameter.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("request to {backend} timed out")]
    Timeout { backend: &'static str },

    #[error("{backend} returned {status}: {details}")]
    Api {
        backend: &'static str,
        status: u16,
        details: String,
    },

    #[error("http error while querying search api: {0}")]
    Http(reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SearchError::Timeout {
                backend: crate::search::BACKEND_NAME,
            }
        } else {
            SearchError::Http(error.without_url())
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("server returned {0}")]
    Status(u16),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("http error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(error.without_url())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no readable text in {0}")]
    EmptyContent(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to {backend} timed out")]
    Timeout { backend: &'static str },

    #[error("{backend} returned {status}: {details}")]
    Api {
        backend: &'static str,
        status: u16,
        details: String,
    },

    #[error("http error while calling the language model: {0}")]
    Http(reqwest::Error),

    #[error("malformed response from language model: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GenerationError::Timeout {
                backend: crate::generator::BACKEND_NAME,
            }
        } else {
            GenerationError::Http(error.without_url())
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors that abort a question run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
