use std::path::{Path, PathBuf};

use crate::logging::Log;
use crate::operations::BuildContext;

/// Shared context for a copy run.
pub struct Context<'a> {
    /// Logger for output and per-file recording.
    pub log: &'a dyn Log,
    /// Build hook notified about written files.
    pub build: &'a dyn BuildContext,
    /// Directory that settings file names are relative to.
    pub basedir: PathBuf,
    /// Packaging of the project being configured.
    pub packaging: String,
    /// Whether to perform a dry run (resolve but write nothing).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("build", &"<dyn BuildContext>")
            .field("basedir", &self.basedir)
            .field("packaging", &self.packaging)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<'a> Context<'a> {
    /// Creates a new context for a copy run.
    #[must_use]
    pub fn new(
        log: &'a dyn Log,
        build: &'a dyn BuildContext,
        basedir: &Path,
        packaging: &str,
        dry_run: bool,
    ) -> Self {
        Self {
            log,
            build,
            basedir: basedir.to_path_buf(),
            packaging: packaging.to_string(),
            dry_run,
        }
    }

    /// Target path for a settings file name.
    ///
    /// Relative names are joined to the base directory; absolute names are
    /// kept as they are.
    #[must_use]
    pub fn target(&self, name: &str) -> PathBuf {
        crate::resources::helpers::fs::target_path(&self.basedir, name)
    }
}
