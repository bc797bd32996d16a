#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Provider answered with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("Failed to parse feed: {0}")]
    XmlParseFailed(#[from] quick_xml::DeError),

    #[error("Fixture API error: {message}")]
    ApiError { message: String },

    #[error("Invalid data from API: missing field `{field}`.")]
    MissingField { field: String },

    #[error("Invalid time format received: {time}.")]
    InvalidTime { time: String },

    #[error("No API key configured for {source_name}.")]
    MissingApiKey { source_name: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::RequestFailed(Box::new(e))
    }
}
