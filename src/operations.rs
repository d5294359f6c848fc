//! Build-system hooks notified about written files.
//!
//! The copy orchestrator reports every target it wrote through the
//! [`BuildContext`] trait so that an IDE or build tool can pick up the change.
//! Production code uses [`LoggingBuildContext`] or, when a changed-files list
//! was requested, [`ChangedListBuildContext`]; tests use `MockBuildContext`.

use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::resources::ResourceError;

/// Receiver of "this file changed" notifications.
///
/// Notifications are fire-and-forget: implementations swallow their own
/// failures.
#[cfg_attr(test, mockall::automock)]
pub trait BuildContext {
    /// Tell the build system that `path` was (re)written.
    fn refresh(&self, path: &Path);
}

/// [`BuildContext`] that only logs the refreshed path at debug level.
#[derive(Debug, Default)]
pub struct LoggingBuildContext;

impl BuildContext for LoggingBuildContext {
    fn refresh(&self, path: &Path) {
        tracing::debug!("refreshed {}", path.display());
    }
}

/// [`BuildContext`] that appends each refreshed path, one per line, to a
/// changed-files list.
#[derive(Debug)]
pub struct ChangedListBuildContext {
    path: PathBuf,
    file: Mutex<File>,
}

impl ChangedListBuildContext {
    /// Create (or truncate) the list at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Write`] if the list cannot be created.
    pub fn create(path: PathBuf) -> Result<Self, ResourceError> {
        let write_error = |source: std::io::Error| ResourceError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = File::create(&path).map_err(write_error)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the changed-files list.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BuildContext for ChangedListBuildContext {
    fn refresh(&self, path: &Path) {
        let written = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("changed list lock poisoned"))
            .and_then(|mut f| writeln!(f, "{}", path.display()));
        if let Err(e) = written {
            tracing::warn!(
                "could not record {} in {}: {e}",
                path.display(),
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn changed_list_appends_one_line_per_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("out").join("changed.txt");
        let ctx = ChangedListBuildContext::create(list.clone()).unwrap();
        ctx.refresh(Path::new("/project/.settings/a.prefs"));
        ctx.refresh(Path::new("/project/.settings/b.prefs"));
        drop(ctx);
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            "/project/.settings/a.prefs\n/project/.settings/b.prefs\n"
        );
    }

    #[test]
    fn changed_list_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("changed.txt");
        fs::write(&list, "stale\n").unwrap();
        let ctx = ChangedListBuildContext::create(list.clone()).unwrap();
        assert_eq!(ctx.path(), list.as_path());
        drop(ctx);
        assert_eq!(fs::read_to_string(&list).unwrap(), "");
    }

    #[test]
    fn changed_list_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();
        let err = ChangedListBuildContext::create(dir.path().join("blocker").join("list"))
            .unwrap_err();
        assert!(matches!(err, ResourceError::Write { .. }));
    }

    #[test]
    fn logging_context_accepts_any_path() {
        LoggingBuildContext.refresh(Path::new("relative/file"));
    }

    #[test]
    fn mock_records_refresh() {
        let mut mock = MockBuildContext::new();
        mock.expect_refresh()
            .with(eq(Path::new("/x")))
            .times(1)
            .return_const(());
        mock.refresh(Path::new("/x"));
    }
}
