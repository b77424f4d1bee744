use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Http(Box<dyn std::error::Error + Send + Sync>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Karaoke API error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("energy envelope unavailable: {status:?}")]
    EnvelopeUnavailable { status: crate::types::EnvelopeStatus },

    #[error("track load cancelled")]
    Cancelled,
}
