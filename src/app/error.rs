use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotecrawlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Chrome is not listening on port {port}.\n\
         Start it manually first, for example:\n    \
         chrome --remote-debugging-port={port}"
    )]
    BrowserNotRunning { port: u16 },

    #[error("Port {port} is open but does not serve a browser debug endpoint: {reason}")]
    NotDebugEndpoint { port: u16, reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for `{selector}`")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("Scraper error: {0}")]
    Scraper(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NotecrawlError>;
