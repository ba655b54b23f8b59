//! Error types for the codec crate.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building, encoding or decoding records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A constructor or container operation was called with bad arguments.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The class/type combination has no known size or wire form.
    #[error("unsupported type: {type_name}")]
    UnsupportedType {
        /// Name or code of the unsupported type.
        type_name: String,
    },

    /// The requested key is not present in the record.
    #[error("key not found")]
    KeyNotFound,

    /// The serialized envelope contradicts itself.
    #[error("corrupt envelope: {message}")]
    CorruptEnvelope {
        /// Description of the inconsistency.
        message: String,
    },

    /// The buffer ended before the envelope said it would.
    #[error("truncated buffer: needed {needed} bytes, {available} available")]
    TruncatedBuffer {
        /// Bytes the decoder expected to read.
        needed: u64,
        /// Bytes actually present.
        available: u64,
    },

    /// Memory for a payload or container slot could not be obtained.
    #[error("allocation of {requested} elements failed")]
    AllocationFailure {
        /// Number of elements (or bytes) that were requested.
        requested: usize,
    },

    /// Struct fields are nested deeper than the configured limit.
    #[error("nesting depth exceeds maximum of {max_depth}")]
    NestingTooDeep {
        /// Configured maximum depth.
        max_depth: usize,
    },

    /// A length field claims more than the configured limit.
    #[error("size limit exceeded: claimed {claimed}, maximum {max_allowed}")]
    SizeLimitExceeded {
        /// Size claimed by the input.
        claimed: u64,
        /// Configured maximum.
        max_allowed: u64,
    },
}

impl CodecError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a corrupt envelope error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptEnvelope {
            message: message.into(),
        }
    }

    /// Create a truncated buffer error.
    pub fn truncated(needed: u64, available: u64) -> Self {
        Self::TruncatedBuffer { needed, available }
    }

    /// Map a failed reservation to [`CodecError::AllocationFailure`].
    pub(crate) fn alloc(requested: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Self::AllocationFailure { requested }
    }

    /// Returns true for errors caused by malformed serialized input.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::CorruptEnvelope { .. }
                | Self::TruncatedBuffer { .. }
                | Self::NestingTooDeep { .. }
                | Self::SizeLimitExceeded { .. }
        )
    }
}
