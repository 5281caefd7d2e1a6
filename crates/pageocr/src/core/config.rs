//! Run configuration.

use crate::error::{PageOcrError, Result};
use crate::types::Languages;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BATCH_SIZE: usize = 4;

/// What the directory driver does when one document fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run on the first failing document.
    #[default]
    Abort,
    /// Record the failure in the run summary and move on to the next document.
    Continue,
}

impl FromStr for ErrorPolicy {
    type Err = PageOcrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "continue" => Ok(ErrorPolicy::Continue),
            other => Err(PageOcrError::validation(format!(
                "Invalid error policy '{}'. Must be one of: abort, continue",
                other
            ))),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => f.write_str("abort"),
            ErrorPolicy::Continue => f.write_str("continue"),
        }
    }
}

/// Options shared by the single-document runner and the directory driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Languages applied to every page.
    pub languages: Languages,
    /// Maximum number of page images per inference call.
    pub batch_size: usize,
    /// Report total and per-page duration for each document.
    pub time_profile: bool,
    pub error_policy: ErrorPolicy,
    /// Forwarded to the engine on every inference call.
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            languages: Languages::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            time_profile: false,
            error_policy: ErrorPolicy::Abort,
            show_progress: true,
        }
    }
}

impl BatchConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PageOcrError::Validation` if `batch_size` is zero or no language is set.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PageOcrError::validation("batch_size must be > 0"));
        }

        if self.languages.is_empty() {
            return Err(PageOcrError::validation("at least one language is required"));
        }

        Ok(())
    }
}
