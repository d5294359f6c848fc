//! Domain-specific error types for the settings copier.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Library code returns typed errors (e.g., [`ConfigError`], [`CopyFailure`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! SettingsError
//! ├── Config(ConfigError): invalid run configuration, fails before any I/O
//! ├── Resource(ResourceError): resolver construction or use-after-close
//! └── Copy(CopyFailure): one or more fatal per-file failures
//! ```

use std::fmt;

use thiserror::Error;

pub use crate::resources::error::ResourceError;

/// Top-level error type for a settings run.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Configuration-related error (blank fields, unknown source scheme).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resolver error that aborts the whole run.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Aggregate of the per-file failures whose fail policy was `true`.
    #[error(transparent)]
    Copy(#[from] CopyFailure),
}

/// Errors in the run configuration.  All of them are raised before any file
/// is resolved or written.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A settings file entry has a blank `name` or `location`.
    #[error("No <{field}> for settings file #{position}{location}, please fix it")]
    MissingField {
        /// Name of the blank field.
        field: &'static str,
        /// 1-based position of the entry in the configured list.
        position: usize,
        /// Formatted declaration site (`" @ file#files[n]"`), or empty.
        location: String,
    },

    /// The `source` option is blank.
    #[error("<source> is missing")]
    MissingSource,

    /// The `source` option uses an unknown scheme.
    #[error("<source> '{0}' does not start with 'jar:' or 'file:'")]
    InvalidSource(String),
}

/// One settings file that could not be copied.
#[derive(Debug)]
pub struct FileFailure {
    /// Target name of the settings file.
    pub name: String,
    /// Configured resource location.
    pub location: String,
    /// Underlying error.
    pub error: ResourceError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.location, self.name, self.error)
    }
}

impl std::error::Error for FileFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Run-level failure carrying every fatal per-file error.
///
/// Only built when at least one failure exists.
#[derive(Error, Debug)]
#[error("Unable to copy {} files", .failures.len())]
pub struct CopyFailure {
    failures: Vec<FileFailure>,
}

impl CopyFailure {
    /// Wrap `failures`; returns `None` when there is nothing to report.
    #[must_use]
    pub fn from_failures(failures: Vec<FileFailure>) -> Option<Self> {
        (!failures.is_empty()).then_some(Self { failures })
    }

    /// Number of files that could not be copied.
    #[must_use]
    pub fn count(&self) -> usize {
        self.failures.len()
    }

    /// The individual failures, in configured order.
    #[must_use]
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }
}
