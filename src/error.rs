use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the Monarch API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request returned HTTP {status}\n{body}")]
    Transport { status: StatusCode, body: String },

    #[error("graphql called before login")]
    NotAuthenticated,

    #[error("No cached token found and {0} is not set")]
    MissingCredentials(&'static str),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token cache error: {0}")]
    TokenCache(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status of a transport failure, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
