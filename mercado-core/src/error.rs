pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for a pipeline step. Every variant is local to the step
/// that produced it; only a setup failure blocks anything beyond its own
/// step, and that policy lives in the runner, not here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response arrived within the configured window. Never retried.
    #[error("no response from {url} within the configured timeout")]
    Timeout { url: String },
    /// The response status differs from the expected one.
    #[error("expected status {expected}, got {actual} for {url}")]
    StatusMismatch {
        url: String,
        expected: reqwest::StatusCode,
        actual: reqwest::StatusCode,
    },
    /// The response body is missing a required field or carries the wrong
    /// primitive type.
    #[error("schema mismatch on field \"{field}\": {detail}")]
    Schema { field: String, detail: String },
    /// A step addressed a binding key that was never successfully bound.
    #[error("no capture bound under key {0}")]
    UnboundReference(String),
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response body as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Occurs when `mercado.toml` fails to load.
    #[error("failed to load mercado.toml: {0}")]
    Config(String),
}
