//! Core logging types: file entries, status, and the [`Log`] trait.
use std::fmt;

/// Per-file result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Target name of the settings file.
    pub name: String,
    /// Final status of the file.
    pub status: FileStatus,
    /// Optional detail message (e.g., filter or error description).
    pub message: Option<String>,
}

/// Status of a processed settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The file was written to its target.
    Copied,
    /// The file was dropped by its packaging filter.
    Filtered,
    /// The target is a directory, nothing was written.
    Skipped,
    /// The file could not be copied but its fail policy allowed it.
    Ignored,
    /// The file could not be copied and fails the run.
    Failed,
    /// The file would have been copied in a real run.
    DryRun,
}

impl FileStatus {
    const ALL: [Self; 6] = [
        Self::Copied,
        Self::Filtered,
        Self::Skipped,
        Self::Ignored,
        Self::Failed,
        Self::DryRun,
    ];

    /// Lower-case label, also carried as the `status` field of summary events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Filtered => "filtered",
            Self::Skipped => "skipped",
            Self::Ignored => "ignored",
            Self::Failed => "failed",
            Self::DryRun => "dry-run",
        }
    }

    /// Inverse of [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Abstraction over logging backends.
///
/// Core code logs through this trait so that it never touches the global
/// subscriber directly; tests substitute a recording implementation.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a file result for the summary.
    fn record_file(&self, name: &str, status: FileStatus, message: Option<&str>);
}
