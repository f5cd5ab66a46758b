//! Search configuration

use crate::error::{CodebookError, Result};
use crate::types::Mode;

/// Configuration of a [`CodebookSearch`](crate::CodebookSearch)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Codec mode to search
    pub mode: Mode,
    /// Log saturated searches at `warn` instead of `debug`
    pub overflow_warnings: bool,
    /// Smallest batch handed to the thread pool; shorter batches run inline
    pub min_parallel_batch: usize,
}

impl SearchConfig {
    /// Create a new configuration
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            overflow_warnings: false,
            min_parallel_batch: 4,
        }
    }

    /// Shorthand for [`SearchConfig::new`]
    pub fn for_mode(mode: Mode) -> Self {
        Self::new(mode)
    }

    /// Create a configuration from a bit-rate in bits per second
    pub fn from_bitrate(bitrate: u32) -> Result<Self> {
        Ok(Self::new(Mode::from_bitrate(bitrate)?))
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set overflow warnings
    pub fn with_overflow_warnings(mut self, enabled: bool) -> Self {
        self.overflow_warnings = enabled;
        self
    }

    /// Set the parallel batch threshold
    pub fn with_min_parallel_batch(mut self, jobs: usize) -> Self {
        self.min_parallel_batch = jobs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_parallel_batch == 0 {
            return Err(CodebookError::invalid_config(
                "min_parallel_batch must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(Mode::MR122)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SearchConfig::for_mode(Mode::MR59)
            .with_mode(Mode::MR67)
            .with_overflow_warnings(true)
            .with_min_parallel_batch(2);
        assert_eq!(config.mode, Mode::MR67);
        assert!(config.overflow_warnings);
        assert_eq!(config.min_parallel_batch, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_bitrate() {
        assert_eq!(SearchConfig::from_bitrate(7400).unwrap().mode, Mode::MR74);
        assert!(SearchConfig::from_bitrate(8000).is_err());
    }

    #[test]
    fn test_validation() {
        let invalid = SearchConfig::new(Mode::MR475).with_min_parallel_batch(0);
        assert!(invalid.validate().is_err());
        assert!(SearchConfig::default().validate().is_ok());
    }
}
