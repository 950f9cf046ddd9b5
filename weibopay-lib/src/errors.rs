//! Error types for Weibo Pay operations.
//!
//! Every failure is reported as a [`WeiboPayError`] at the point where it is
//! detected. Errors fall into a small number of classes callers care about:
//! configuration problems, unsupported gateways and operations, transport
//! failures, provider-side business failures and signature mismatches.

use std::fmt;

use serde_json::{Map, Value};

use crate::FieldMap;

/// Numeric error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WeiboPayErrorCode {
    /// Missing or unusable configuration (key material, base URI)
    Config = 1000,
    /// Gateway name does not resolve to a known sub-gateway
    UnsupportedGateway = 2000,
    /// Operation is known but the provider does not offer it
    UnsupportedOperation = 2001,
    /// Caller supplied invalid data
    InvalidData = 3000,
    /// Transport/network layer error
    Transport = 4000,
    /// Connection failed
    ConnectionFailed = 4001,
    /// Connection timeout
    ConnectionTimeout = 4002,
    /// Non-success HTTP status
    HttpStatus = 4003,
    /// Response body could not be decoded
    Serialization = 4004,
    /// Provider rejected the request
    BusinessFailure = 5000,
    /// Signature verification failed
    InvalidSignature = 6000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for Weibo Pay operations.
#[derive(Debug)]
pub enum WeiboPayError {
    /// Required configuration is missing or cannot be used.
    Config {
        /// Configuration field (e.g. "private_key")
        field: String,
        /// Why the value is unusable
        reason: String,
    },

    /// The gateway name did not resolve to a sub-gateway offering the
    /// requested capability.
    UnsupportedGateway(String),

    /// The provider has no such capability (cancel, close).
    UnsupportedOperation(String),

    /// Invalid data supplied by the caller.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Transport/network layer error.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The provider answered with a non-2xx status.
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The response body was not the expected JSON object.
    Serialization(String),

    /// A well-formed response in which the provider rejected the request.
    BusinessFailure {
        /// Endpoint that was called
        endpoint: String,
        /// Provider result code, if the response carried one
        code: Option<String>,
        /// Provider message (`msg`/`message`), "Unknown" when absent
        message: String,
        /// The full decoded response
        raw: Map<String, Value>,
    },

    /// Signature verification failed for an inbound payload.
    InvalidSignature {
        /// The payload that failed verification
        fields: FieldMap,
    },

    /// Internal/unexpected error.
    Internal(String),
}

impl WeiboPayError {
    /// Get the numeric error code.
    pub fn code(&self) -> WeiboPayErrorCode {
        match self {
            Self::Config { .. } => WeiboPayErrorCode::Config,
            Self::UnsupportedGateway(_) => WeiboPayErrorCode::UnsupportedGateway,
            Self::UnsupportedOperation(_) => WeiboPayErrorCode::UnsupportedOperation,
            Self::InvalidData { .. } => WeiboPayErrorCode::InvalidData,
            Self::Transport(_) => WeiboPayErrorCode::Transport,
            Self::ConnectionFailed { .. } => WeiboPayErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => WeiboPayErrorCode::ConnectionTimeout,
            Self::HttpStatus { .. } => WeiboPayErrorCode::HttpStatus,
            Self::Serialization(_) => WeiboPayErrorCode::Serialization,
            Self::BusinessFailure { .. } => WeiboPayErrorCode::BusinessFailure,
            Self::InvalidSignature { .. } => WeiboPayErrorCode::InvalidSignature,
            Self::Internal(_) => WeiboPayErrorCode::Internal,
        }
    }

    /// Returns true for failures raised before a provider response could be
    /// classified (network, timeout, bad status, undecodable body).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::ConnectionFailed { .. }
                | Self::ConnectionTimeout { .. }
                | Self::HttpStatus { .. }
                | Self::Serialization(_)
        )
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only transport failures qualify, and only 5xx among status errors.
    /// Whether a retry is safe (idempotent operation) is for the caller to decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Serialization(_) => false,
            other => other.is_transport(),
        }
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WeiboPayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { field, reason } => {
                write!(f, "missing Weibo config -- [{}]: {}", field, reason)
            }
            Self::UnsupportedGateway(name) => write!(f, "pay gateway [{}] not supported", name),
            Self::UnsupportedOperation(name) => {
                write!(f, "Weibo Pay does not support {} orders", name)
            }
            Self::InvalidData { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => write!(f, "{} timed out after {}ms", operation, timeout_ms),
            Self::HttpStatus { status, body } => {
                write!(f, "Weibo API returned HTTP {}: {}", status, body)
            }
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::BusinessFailure {
                endpoint, message, ..
            } => write!(f, "Weibo API error: {} {}", endpoint, message),
            Self::InvalidSignature { .. } => write!(f, "Weibo sign verify failed"),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for WeiboPayError {}

impl From<serde_json::Error> for WeiboPayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
