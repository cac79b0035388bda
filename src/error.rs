//! Error types
//!
//! Each stage of the prediction pipeline has its own error enum so the
//! request handler can decide, per kind, whether a failure is absorbed,
//! reported as a bad request, or surfaced as an internal error.

use thiserror::Error;

/// Startup-level error (configuration, HTTP client setup)
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failure to obtain a telemetry reading
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("missing {0} in provider response")]
    MissingField(String),

    #[error("non-numeric {field} value: {value}")]
    NotNumeric { field: String, value: String },
}

/// Failure to load or evaluate a classifier
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse model artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("{0}")]
    Inference(String),
}

/// Failure of the dual-model classify call
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Models not loaded")]
    ModelsNotLoaded,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A required feature failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing or invalid value for {field}")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Request-level outcome, mapped to an HTTP status at the transport boundary
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Models not loaded")]
    ServiceUnavailable,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::ServiceUnavailable | ApiError::Internal(_) => 500,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::ModelsNotLoaded => ApiError::ServiceUnavailable,
            ClassifyError::Model(e) => ApiError::Internal(e.to_string()),
        }
    }
}
