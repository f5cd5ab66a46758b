//! Error handling for the codebook search
//!
//! Errors are only produced for caller-contract violations detected at the
//! API boundary: wrong buffer lengths, an out-of-range subframe, a negative
//! pitch lag or malformed index words. Arithmetic edge cases never become
//! errors; saturation is reported through the output's overflow flag.

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for codebook operations
pub type Result<T> = std::result::Result<T, CodebookError>;

/// Error type for codebook search and index handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodebookError {
    /// A vector argument has the wrong number of samples
    #[error("Invalid {name} length: expected {expected}, got {actual}")]
    InvalidLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Subframe index outside 0..4
    #[error("Invalid subframe index: {subframe} (expected 0..4)")]
    InvalidSubframe { subframe: usize },

    /// Pitch lag must be at least 1
    #[error("Invalid pitch lag: {lag}")]
    InvalidPitchLag { lag: i16 },

    /// Mode name not recognised
    #[error("Unsupported mode: {mode}")]
    UnsupportedMode { mode: String },

    /// Bit-rate does not map to a mode
    #[error("Unsupported bitrate: {bitrate}bps")]
    UnsupportedBitrate { bitrate: u32 },

    /// Packed index words cannot be decoded for the mode
    #[error("Invalid packed index for {mode}: {details}")]
    InvalidIndex { mode: String, details: String },

    /// Search configuration rejected by `validate()`
    #[error("Invalid search configuration: {details}")]
    InvalidConfig { details: String },
}

impl CodebookError {
    /// Create a new invalid length error
    pub fn invalid_length(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            name,
            expected,
            actual,
        }
    }

    /// Create a new invalid index error
    pub fn invalid_index(mode: impl fmt::Display, details: impl Into<String>) -> Self {
        Self::InvalidIndex {
            mode: mode.to_string(),
            details: details.into(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Check if the error is recoverable
    ///
    /// Per-call argument errors can be retried with corrected input; mode and
    /// configuration errors persist until the caller changes its setup.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidLength { .. }
            | Self::InvalidSubframe { .. }
            | Self::InvalidPitchLag { .. }
            | Self::InvalidIndex { .. } => true,

            Self::UnsupportedMode { .. }
            | Self::UnsupportedBitrate { .. }
            | Self::InvalidConfig { .. } => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedMode { .. }
            | Self::UnsupportedBitrate { .. }
            | Self::InvalidConfig { .. } => ErrorCategory::Configuration,

            Self::InvalidLength { .. }
            | Self::InvalidSubframe { .. }
            | Self::InvalidPitchLag { .. } => ErrorCategory::Input,

            Self::InvalidIndex { .. } => ErrorCategory::Index,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Mode and configuration errors
    Configuration,
    /// Per-call argument errors
    Input,
    /// Packed index decoding errors
    Index,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Index => write!(f, "Index"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CodebookError::invalid_config("test message");
        assert!(matches!(err, CodebookError::InvalidConfig { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_error_recoverability() {
        assert!(CodebookError::InvalidSubframe { subframe: 7 }.is_recoverable());
        assert!(CodebookError::invalid_length("x", 40, 39).is_recoverable());
        assert!(!CodebookError::UnsupportedBitrate { bitrate: 9000 }.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            CodebookError::InvalidPitchLag { lag: -1 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(
            CodebookError::invalid_index("MR122", "bad").category(),
            ErrorCategory::Index
        );
        assert_eq!(ErrorCategory::Index.to_string(), "Index");
    }

    #[test]
    fn test_error_display() {
        let err = CodebookError::invalid_length("target", 40, 32);
        let display = format!("{}", err);
        assert!(display.contains("target"));
        assert!(display.contains("expected 40"));
        assert!(display.contains("got 32"));
    }
}
