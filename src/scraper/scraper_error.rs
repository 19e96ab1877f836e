use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Invalid selector `{selector}`: {msg}")]
    Selector { selector: String, msg: String },
    #[error("Config error: {0}")]
    Config(String),
}
