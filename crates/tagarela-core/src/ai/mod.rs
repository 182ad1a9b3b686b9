pub mod fallback;
pub mod groq;

pub use groq::GroqClient;

use thiserror::Error;

/// Failures of the remote completion call. None of these escape the
/// responder boundary: every variant degrades to the local fallback.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("completion API returned an empty completion")]
    EmptyCompletion,
}
