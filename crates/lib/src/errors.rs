use thiserror::Error;

/// Errors raised while talking to an AI provider.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider stream failed: {0}")]
    AiStream(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Errors raised by the web-search providers.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search query cannot be empty")]
    EmptyQuery,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to {provider} failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned status {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("Failed to parse {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },
    #[error("Invalid search URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Why a closed metadata block could not be turned into a `MetadataBlock`.
///
/// Callers of `extract` never see this; it exists for `try_extract` and logs.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Metadata block is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Metadata block interior is empty")]
    Empty,
}

/// A sanitizer stage that could not run. The pipeline skips the stage.
#[derive(Error, Debug, Clone)]
pub enum SanitizeError {
    #[error("Pattern for stage '{stage}' failed to compile: {source}")]
    Pattern {
        stage: &'static str,
        #[source]
        source: regex::Error,
    },
}
