use thiserror::Error;

pub type Result<T> = std::result::Result<T, ActivityError>;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} for {path}: {message}")]
    Api {
        status: u16,
        path: String,
        message: String,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ActivityError {
    pub fn api(status: reqwest::StatusCode, path: &str) -> Self {
        let message = match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                "token invalid or expired; check GITLAB_TOKEN".to_string()
            }
            reqwest::StatusCode::FORBIDDEN => {
                "token lacks the read_api scope or project access".to_string()
            }
            other => other
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        };
        ActivityError::Api {
            status: status.as_u16(),
            path: path.to_string(),
            message,
        }
    }
}
