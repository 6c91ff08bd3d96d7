//! Error types for state backend provisioning.
//!
//! Provider errors are classified by their AWS error code so the caller can
//! tell an expected condition (the lock table already exists) apart from a
//! real failure, and can show a useful hint for the common ones.

use serde::Serialize;
use thiserror::Error;

/// Categories of provisioning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The resource already exists (owned by us or by someone else)
    AlreadyExists,
    /// Credentials are missing, invalid, expired or lack permission
    AccessDenied,
    /// The request was rejected as malformed (bad name, bad region)
    InvalidRequest,
    /// The provider could not be reached
    Network,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Classify an AWS error code (e.g. `ResourceInUseException`).
    pub fn from_code(code: &str) -> Self {
        match code {
            "ResourceInUseException" | "BucketAlreadyOwnedByYou" | "BucketAlreadyExists" => {
                Self::AlreadyExists
            }
            "AccessDenied"
            | "AccessDeniedException"
            | "UnrecognizedClientException"
            | "InvalidAccessKeyId"
            | "InvalidClientTokenId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "ExpiredTokenException"
            | "AllAccessDisabled" => Self::AccessDenied,
            "InvalidBucketName"
            | "IllegalLocationConstraintException"
            | "InvalidLocationConstraint"
            | "ValidationException"
            | "InvalidRequest"
            | "AuthorizationHeaderMalformed" => Self::InvalidRequest,
            "RequestTimeout" | "ServiceUnavailable" | "SlowDown" => Self::Network,
            _ => Self::Other,
        }
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AlreadyExists => "Resource already exists",
            Self::AccessDenied => "Access denied",
            Self::InvalidRequest => "Invalid request",
            Self::Network => "Provider unreachable",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::AlreadyExists => {
                "Bucket names are global; pick another customer name or reuse the existing bucket"
            }
            Self::AccessDenied => "Check the AWS profile/credentials and their IAM permissions",
            Self::InvalidRequest => {
                "Bucket names must be 3-63 lowercase letters, digits, dots or hyphens; check the region"
            }
            Self::Network => "Check your network connection or the endpoint URL and try again",
            Self::Other => "Re-run with -vv for details",
        }
    }
}

/// Errors that can occur while provisioning state storage.
#[derive(Debug, Error)]
pub enum Error {
    /// The lock table already exists
    #[error("table already exists: {0}")]
    TableExists(String),

    /// The provider rejected the request
    #[error("{service} {operation} failed ({code}): {message}")]
    Service {
        /// Service name (S3, DynamoDB)
        service: &'static str,
        /// Operation that failed (CreateBucket, ...)
        operation: &'static str,
        /// AWS error code, or "Unknown"
        code: String,
        /// Provider message
        message: String,
    },

    /// The request never got a response (dispatch failure, timeout)
    #[error("{service} {operation} could not reach the provider: {message}")]
    Network {
        /// Service name
        service: &'static str,
        /// Operation that failed
        operation: &'static str,
        /// Underlying transport error
        message: String,
    },

    /// Client setup failed (runtime, configuration)
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Categorize this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TableExists(_) => ErrorCategory::AlreadyExists,
            Self::Service { code, .. } => ErrorCategory::from_code(code),
            Self::Network { .. } => ErrorCategory::Network,
            Self::Setup(_) | Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Returns true if the lock table already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::TableExists(_))
    }
}

/// Result type for provisioning operations
pub type Result<T> = std::result::Result<T, Error>;
