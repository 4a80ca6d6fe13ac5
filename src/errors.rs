use thiserror::Error;

#[derive(Error, Debug)]
pub enum RsiHubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, RsiHubError>;

// 用于从字符串创建错误
impl From<String> for RsiHubError {
    fn from(s: String) -> Self {
        RsiHubError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for RsiHubError {
    fn from(s: &str) -> Self {
        RsiHubError::Unknown(s.to_string())
    }
}
