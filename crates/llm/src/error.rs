/// Errors from a text-generation call.
///
/// The dialogue engine never propagates these past a turn or a feedback
/// request; they are logged and the turn is skipped.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credential configured for the generation service.
    #[error("Generation API key is not configured")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but produced no usable text.
    #[error("Generation returned no text")]
    EmptyResponse,
}
