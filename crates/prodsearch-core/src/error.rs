//! Shared error type across prodsearch crates.

use thiserror::Error;

/// Stable error codes (used in logs and HTTP error bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric name registered twice.
    DuplicateMetric,
    /// Metric descriptor is malformed.
    InvalidDescriptor,
    /// Observation label set differs from the declared one.
    LabelMismatch,
    /// Label value outside a closed vocabulary.
    UnknownLabelValue,
    /// Histogram sample is NaN or infinite.
    InvalidSample,
    /// Two routes claim the same path.
    RouteConflict,
    /// Config could not be parsed or failed validation.
    InvalidConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Exposition output could not be produced.
    Encode,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::InvalidDescriptor => "INVALID_DESCRIPTOR",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::UnknownLabelValue => "UNKNOWN_LABEL_VALUE",
            ErrorCode::InvalidSample => "INVALID_SAMPLE",
            ErrorCode::RouteConflict => "ROUTE_CONFLICT",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ProdSearchError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum ProdSearchError {
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("invalid metric descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("label mismatch on {metric}: expected {expected:?}, got {got:?}")]
    LabelMismatch {
        metric: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("unknown label value: {0}")]
    UnknownLabelValue(String),
    #[error("non-finite sample: {0}")]
    InvalidSample(String),
    #[error("route conflict: {0}")]
    RouteConflict(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("exposition encode failed: {0}")]
    Encode(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ProdSearchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProdSearchError::DuplicateMetric(_) => ErrorCode::DuplicateMetric,
            ProdSearchError::InvalidDescriptor(_) => ErrorCode::InvalidDescriptor,
            ProdSearchError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            ProdSearchError::UnknownLabelValue(_) => ErrorCode::UnknownLabelValue,
            ProdSearchError::InvalidSample(_) => ErrorCode::InvalidSample,
            ProdSearchError::RouteConflict(_) => ErrorCode::RouteConflict,
            ProdSearchError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            ProdSearchError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ProdSearchError::Encode(_) => ErrorCode::Encode,
            ProdSearchError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<std::fmt::Error> for ProdSearchError {
    fn from(e: std::fmt::Error) -> Self {
        ProdSearchError::Encode(e.to_string())
    }
}
