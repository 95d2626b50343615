//! Resolution and parsing limits

use crate::error::{JsonError, Result};

/// Hard ceiling for [`Limits::max_resolution_depth`]
pub const HARD_MAX_RESOLUTION_DEPTH: usize = 1_024;
/// Hard ceiling for [`Limits::max_number_len`]
pub const HARD_MAX_NUMBER_LEN: usize = 65_536;

/// Limits applied while resolving adapters and reading number literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of delegate lookups while resolving one adapter
    /// (default: 64, hard: 1,024)
    pub max_resolution_depth: usize,
    /// Maximum length of a number literal in bytes (default: 4,096, hard: 65,536)
    pub max_number_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
            max_number_len: 4_096,
        }
    }
}

impl Limits {
    /// Check that every limit is non-zero and within its hard ceiling
    pub fn validate(&self) -> Result<()> {
        if self.max_resolution_depth == 0 || self.max_resolution_depth > HARD_MAX_RESOLUTION_DEPTH
        {
            return Err(JsonError::LimitExceeded(format!(
                "max_resolution_depth must be within 1..={} (got {})",
                HARD_MAX_RESOLUTION_DEPTH, self.max_resolution_depth
            )));
        }
        if self.max_number_len == 0 || self.max_number_len > HARD_MAX_NUMBER_LEN {
            return Err(JsonError::LimitExceeded(format!(
                "max_number_len must be within 1..={} (got {})",
                HARD_MAX_NUMBER_LEN, self.max_number_len
            )));
        }
        Ok(())
    }
}
