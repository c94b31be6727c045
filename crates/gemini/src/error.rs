use questsmith_core::generation::GenerationError;

/// Errors from the Gemini client layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Vertex AI (or the token endpoint) returned an error.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code, or the `code` of an in-stream error payload.
        status: u16,
        /// Raw response body or error message for debugging.
        body: String,
    },

    /// A response body could not be decoded.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The event stream was not well-formed.
    #[error("Invalid event stream: {0}")]
    Stream(String),

    /// The prompt or the response was stopped by a safety filter.
    #[error("Blocked: {0}")]
    Blocked(String),

    /// Credentials are missing or unreadable.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// The service-account assertion could not be signed.
    #[error("Failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<GeminiError> for GenerationError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Request(e) => GenerationError::Transport(e.to_string()),
            GeminiError::ApiError { status, body } => GenerationError::Provider {
                status,
                message: body,
            },
            GeminiError::Json(e) => GenerationError::Malformed(e.to_string()),
            GeminiError::Stream(msg) => GenerationError::Malformed(msg),
            GeminiError::Blocked(reason) => GenerationError::Blocked(reason),
            GeminiError::Credentials(msg) => GenerationError::Credentials(msg),
            GeminiError::Jwt(e) => GenerationError::Credentials(e.to_string()),
        }
    }
}
