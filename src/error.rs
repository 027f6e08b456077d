use thiserror::Error;

#[derive(Error, Debug)]
pub enum SrtransError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No translation package found for {from} to {to}.")]
    PackageNotFound { from: String, to: String },

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Install error: {0}")]
    Install(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, SrtransError>;
