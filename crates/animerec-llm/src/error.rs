use animerec_core::RecommenderError;
use thiserror::Error;

/// Errors returned by the chat completion client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured.
    #[error("missing API key, set OPENAI_API_KEY")]
    MissingApiKey,

    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the service.
        body: String,
    },

    /// The response carried no message content.
    #[error("response contained no completion")]
    EmptyResponse,
}

impl From<LlmError> for RecommenderError {
    fn from(err: LlmError) -> Self {
        Self::generation(err)
    }
}

/// Result type alias for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;
