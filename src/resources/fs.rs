//! Resolver over plain files below a base directory.
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceError, ResourceResolver};

/// Resolver backed by a base directory.
///
/// Relative paths are resolved against the base directory, absolute paths
/// are used as-is.  Only existing regular files resolve.
#[derive(Debug)]
pub struct FileSystemResourceResolver {
    base_directory: PathBuf,
    closed: bool,
}

impl FileSystemResourceResolver {
    /// Create a resolver rooted at `base_directory`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingBaseDirectory`] if the path is empty.
    pub fn try_new(base_directory: PathBuf) -> Result<Self, ResourceError> {
        if base_directory.as_os_str().is_empty() {
            return Err(ResourceError::MissingBaseDirectory);
        }
        Ok(Self {
            base_directory,
            closed: false,
        })
    }
}

impl ResourceResolver for FileSystemResourceResolver {
    fn description(&self) -> String {
        format!("file:{}", self.base_directory.display())
    }

    fn resolve(&self, path: &str) -> Result<Option<Box<dyn Resource + '_>>, ResourceError> {
        if self.closed {
            return Err(ResourceError::Closed {
                resolver: self.description(),
            });
        }
        let candidate = Path::new(path);
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_directory.join(candidate)
        };
        // Directories and other non-files do not resolve.
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(Box::new(FileResource { path })))
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        self.closed = true;
        Ok(())
    }
}

/// A file on disk.
#[derive(Debug)]
struct FileResource {
    path: PathBuf,
}

impl Resource for FileResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<Box<dyn Read + '_>, ResourceError> {
        let file = File::open(&self.path).map_err(|source| ResourceError::Read {
            resource: self.description(),
            source,
        })?;
        Ok(Box::new(file))
    }
}
