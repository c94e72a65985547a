use thiserror::Error;

/// Failure of a single request against the CRM API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request url: {0}")]
    InvalidUrl(String),

    #[error("Invalid request header {0}")]
    InvalidHeader(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What a screen shows in its error banner.
///
/// Load and mutation failures keep the underlying [`ApiError`] for logging,
/// but display only the fixed message of the screen that caught them.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{message}")]
    Load {
        message: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("{message}")]
    Mutation {
        message: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    InvalidId(&'static str),
}

impl ViewError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ViewError::Validation(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base url {value}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("Failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
