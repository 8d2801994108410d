use thiserror::Error;

/// Errors that can occur when talking to the Co3 REST API.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },
    /// Any response body that could not be decoded. Details are logged, not exposed.
    #[error(
        "unable to deserialize JSON string; please check the JSON string is properly formatted \
         and the object for which it represents is correct"
    )]
    Deserialization,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not authenticated; call authenticate first")]
    NotAuthenticated,
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SdkError {
    pub(crate) fn server_error(status: u16, message: impl Into<String>) -> Self {
        SdkError::ServerError {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        SdkError::InvalidConfig(msg.into())
    }
}
