use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkLensError {
    #[error("malformed relation reference '{0}': no numeric identifier after final '/'")]
    MalformedReference(String),

    #[error("cache read failed: {0}")]
    CacheRead(String),

    #[error("cache write failed: {0}")]
    CacheWrite(String),

    #[error("work item fetch failed: {0}")]
    RemoteFetch(String),

    #[error("API request failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkLensError>;
