//! Error types for logport operations.
//!
//! This module defines the error taxonomy for port discovery:
//! - [`LogportError`] - Canonical error type for all logport operations
//!
//! ## Design Principles
//!
//! - **Structured**: Errors carry typed context (host, metric, instance) not
//!   just messages
//! - **Distinct**: Each protocol step that can fail has its own variant, so
//!   callers can tell a connection failure from a metric lookup failure from
//!   a malformed result
//! - **Exit-code aligned**: Maps to stable small integers for CLI exit codes
//!
//! Per-entry recoverable problems (one malformed port file, one unreadable
//! entry) are NOT errors: they are reported as warnings in the returned
//! snapshot and the operation continues.

use std::io;
use thiserror::Error;

// ============================================================================
// Canonical Error Type
// ============================================================================

/// Canonical error type for all logport operations.
///
/// This is the single error type used across the logport ecosystem. It maps
/// cleanly to CLI exit codes and provides structured context for programmatic
/// handling.
///
/// ## Exit Code Mapping
///
/// | Variant | Code |
/// |---------|------|
/// | `InvalidArgument` | 1 |
/// | `HostUnreachable` | 2 |
/// | `HostIdentityFailed` | 3 |
/// | `ConnectionFailed` | 4 |
/// | `MetricLookupFailed` | 5 |
/// | `DescriptorLookupFailed` | 6 |
/// | `FetchFailed` | 7 |
/// | `InstanceLookupFailed` | 8 |
/// | `ResultMalformed` | 9 |
/// | `ScanFailed` | 10 |
/// | `ResourceExhausted` | 11 |
/// | `NotSupported` | 12 |
/// | `Internal` | 99 |
#[derive(Debug, Error)]
pub enum LogportError {
    /// Invalid argument provided.
    ///
    /// Returned when input validation fails (e.g., pid = 0 in a selector).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was invalid.
        message: String,
    },

    /// The requested host's name could not be resolved.
    ///
    /// This is a property of the *input* host, distinct from
    /// [`LogportError::HostIdentityFailed`] which concerns the local machine.
    #[error("Host '{host}' could not be resolved")]
    HostUnreachable {
        /// The hostname that failed to resolve.
        host: String,
    },

    /// The local machine's own identity could not be established.
    ///
    /// Raised when the local hostname cannot be obtained or resolved. This is
    /// a fatal environment error, not a statement about the requested host.
    #[error("Local host identity could not be established: {message}")]
    HostIdentityFailed {
        /// Description of what failed.
        message: String,
    },

    /// Opening a connection to the remote collector failed.
    ///
    /// Wraps the underlying IO error from the connection attempt.
    #[error("Connection to collector on '{host}' failed: {source}")]
    ConnectionFailed {
        /// The host we attempted to connect to.
        host: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The well-known port metric's name could not be resolved to an id.
    #[error("Metric '{metric}' lookup failed: {detail}")]
    MetricLookupFailed {
        /// The metric name that was looked up.
        metric: String,
        /// Collector-provided failure detail.
        detail: String,
    },

    /// The port metric's descriptor could not be retrieved.
    #[error("Descriptor lookup for '{metric}' failed: {detail}")]
    DescriptorLookupFailed {
        /// The metric whose descriptor was requested.
        metric: String,
        /// Collector-provided failure detail.
        detail: String,
    },

    /// Fetching the port metric's current values failed.
    #[error("Fetch of '{metric}' failed: {detail}")]
    FetchFailed {
        /// The metric that was fetched.
        metric: String,
        /// Collector-provided failure detail.
        detail: String,
    },

    /// An instance's external name could not be resolved.
    ///
    /// Unlike a missing entry, this indicates an inconsistent instance domain
    /// on the collector and aborts the whole query.
    #[error("Instance {inst} name lookup in domain {indom} failed: {detail}")]
    InstanceLookupFailed {
        /// The instance domain that was queried.
        indom: u32,
        /// The instance whose name was requested.
        inst: i32,
        /// Collector-provided failure detail.
        detail: String,
    },

    /// The collector returned a structurally invalid result.
    ///
    /// E.g., a negative value count or an instance id outside the domain's
    /// defined range.
    #[error("Malformed collector result: {message}")]
    ResultMalformed {
        /// Description of the malformation.
        message: String,
    },

    /// The port-advertisement directory could not be scanned.
    ///
    /// Individual unreadable files within the directory are warnings, not
    /// this error; this covers failure to list the directory itself.
    #[error("Port directory scan failed: {source}")]
    ScanFailed {
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An allocation or capacity limit was exceeded.
    #[error("Resource exhausted: {message}")]
    ResourceExhausted {
        /// Description of the exhausted resource.
        message: String,
    },

    /// Operation not supported on the current platform.
    #[error("Operation '{feature}' not supported on {platform}")]
    NotSupported {
        /// The feature that is not supported.
        feature: String,
        /// The platform where it's not supported.
        platform: String,
    },

    /// Internal error (should not happen in normal operation).
    ///
    /// Indicates a bug in logport or unexpected system state.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl LogportError {
    /// Get the stable error code for this error.
    ///
    /// Used by the CLI as its process exit code.
    pub fn error_code(&self) -> i32 {
        match self {
            LogportError::InvalidArgument { .. } => 1,
            LogportError::HostUnreachable { .. } => 2,
            LogportError::HostIdentityFailed { .. } => 3,
            LogportError::ConnectionFailed { .. } => 4,
            LogportError::MetricLookupFailed { .. } => 5,
            LogportError::DescriptorLookupFailed { .. } => 6,
            LogportError::FetchFailed { .. } => 7,
            LogportError::InstanceLookupFailed { .. } => 8,
            LogportError::ResultMalformed { .. } => 9,
            LogportError::ScanFailed { .. } => 10,
            LogportError::ResourceExhausted { .. } => 11,
            LogportError::NotSupported { .. } => 12,
            LogportError::Internal { .. } => 99,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl LogportError {
    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        LogportError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `HostUnreachable` error.
    pub fn host_unreachable(host: impl Into<String>) -> Self {
        LogportError::HostUnreachable { host: host.into() }
    }

    /// Create a `HostIdentityFailed` error.
    pub fn host_identity_failed(message: impl Into<String>) -> Self {
        LogportError::HostIdentityFailed {
            message: message.into(),
        }
    }

    /// Create a `ConnectionFailed` error from an IO error.
    pub fn connection_failed(host: impl Into<String>, source: io::Error) -> Self {
        LogportError::ConnectionFailed {
            host: host.into(),
            source,
        }
    }

    /// Create a `MetricLookupFailed` error.
    pub fn metric_lookup_failed(metric: impl Into<String>, detail: impl Into<String>) -> Self {
        LogportError::MetricLookupFailed {
            metric: metric.into(),
            detail: detail.into(),
        }
    }

    /// Create a `DescriptorLookupFailed` error.
    pub fn descriptor_lookup_failed(metric: impl Into<String>, detail: impl Into<String>) -> Self {
        LogportError::DescriptorLookupFailed {
            metric: metric.into(),
            detail: detail.into(),
        }
    }

    /// Create a `FetchFailed` error.
    pub fn fetch_failed(metric: impl Into<String>, detail: impl Into<String>) -> Self {
        LogportError::FetchFailed {
            metric: metric.into(),
            detail: detail.into(),
        }
    }

    /// Create an `InstanceLookupFailed` error.
    pub fn instance_lookup_failed(indom: u32, inst: i32, detail: impl Into<String>) -> Self {
        LogportError::InstanceLookupFailed {
            indom,
            inst,
            detail: detail.into(),
        }
    }

    /// Create a `ResultMalformed` error.
    pub fn result_malformed(message: impl Into<String>) -> Self {
        LogportError::ResultMalformed {
            message: message.into(),
        }
    }

    /// Create a `ScanFailed` error from an IO error.
    pub fn scan_failed(source: io::Error) -> Self {
        LogportError::ScanFailed { source }
    }

    /// Create a `ResourceExhausted` error.
    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        LogportError::ResourceExhausted {
            message: message.into(),
        }
    }

    /// Create a `NotSupported` error.
    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        LogportError::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        LogportError::Internal {
            message: message.into(),
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for logport operations.
pub type LogportResult<T> = Result<T, LogportError>;

// ============================================================================
// Tests
// ============================================================================
