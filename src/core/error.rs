//! Error type shared by the conversion engine, the dispatcher and the console.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// A value could not be represented in the requested kind.
    #[error("failed to convert from {from} to {to}: {reason}")]
    Conversion {
        /// Name of the source kind.
        from: &'static str,
        /// Name of the destination kind.
        to: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Structurally invalid input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A named entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier allocator ran out of ids.
    #[error("overflow: {0}")]
    Overflow(String),

    /// An insertion unexpectedly failed.
    #[error("creation failed: {0}")]
    Creation(String),
}

impl ConsoleError {
    pub(crate) fn conversion(from: &'static str, to: &'static str, reason: impl Into<String>) -> Self {
        ConsoleError::Conversion {
            from,
            to,
            reason: reason.into(),
        }
    }

    /// The bare failure description, without the kind names of a conversion.
    pub(crate) fn reason(self) -> String {
        match self {
            ConsoleError::Conversion { reason, .. } => reason,
            other => other.to_string(),
        }
    }

    /// Check if this is a conversion failure.
    pub fn is_conversion(&self) -> bool {
        matches!(self, ConsoleError::Conversion { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConsoleError>;
