use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown config key: {0} (expected one of rpcPort, corePort, coreBinaryPath, autoStart)")]
    UnknownConfigKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidConfigValue { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
