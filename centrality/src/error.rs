use thiserror::Error;

pub type CentralityResult<T> = Result<T, CentralityError>;

/// Failures of the configuration layer and the external services.
///
/// Duplicate points and empty selections are not errors; the controller
/// reports those as notices.
#[derive(Debug, Error)]
pub enum CentralityError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Road distances requested but no Google Maps API key is configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Distance Matrix API error {status}: {message}")]
    Api { status: String, message: String },

    #[error("Unexpected response from Distance Matrix API: {message}")]
    MalformedResponse { message: String },
}

impl CentralityError {
    pub fn config(message: impl Into<String>) -> Self {
        CentralityError::Config {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        CentralityError::MalformedResponse {
            message: message.into(),
        }
    }
}
