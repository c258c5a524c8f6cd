use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceManagementError {
    #[error("Authorization error")]
    AuthorizationError(#[source] anyhow::Error),
    #[error("HTTP error")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid request URL")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to (de)serialize a request or response body")]
    SerializationError(#[from] serde_json::Error),
    #[error("Azure Resource Manager returned {status}: {code}: {message}")]
    ApiError { status: u16, code: String, message: String },
    #[error("Long-running operation failed: {0}")]
    LongRunningOperation(String),
    #[error("Missing configuration value: {0}")]
    MissingConfiguration(String),
    #[error("Unknown Azure environment: {0}")]
    UnknownEnvironment(String),
    #[error("Failed to write output")]
    Output(#[from] std::io::Error),
}

/// Error detail as carried in the ARM error envelope and in partial template exports.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

impl ResourceManagementError {
    /// Decodes a non-success ARM response body into an `ApiError`. Bodies that
    /// are not an error envelope keep their raw text as the message.
    pub(crate) fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ResourceManagementError::ApiError {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => ResourceManagementError::ApiError {
                status,
                code: String::new(),
                message: body.trim().to_owned(),
            },
        }
    }
}
