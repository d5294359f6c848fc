//! File-system helpers used when writing resolved resources.
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::resources::{Resource, ResourceError};

/// Compute the target path of a settings file.
///
/// Relative names are joined to `basedir`; absolute names are kept.
#[must_use]
pub fn target_path(basedir: &Path, name: &str) -> PathBuf {
    basedir.join(name)
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`ResourceError::Write`] if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ResourceError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Sibling path a copy is staged in before it replaces `target`.
///
/// Lives in the same directory so the final rename stays on one filesystem.
#[must_use]
pub fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "settings".into(), |n| n.to_string_lossy());
    target.with_file_name(format!(".{name}.project-settings-tmp"))
}

/// Reader that remembers whether the wrapped source failed, so an
/// [`io::copy`] error can be attributed to the right side.
struct SourceReader<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|_| self.failed = true)
    }
}

/// Copy the bytes of `resource` into `target`, replacing any existing file.
///
/// The bytes are staged in [`staging_path`] and renamed over `target` only
/// once the whole resource has been read, so a failing source leaves an
/// existing target untouched.  The staging file is removed on every error.
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`ResourceError::Read`] if the resource cannot be opened or read,
/// and [`ResourceError::Write`] if the target cannot be created or replaced.
pub fn write_resource(resource: &dyn Resource, target: &Path) -> Result<u64, ResourceError> {
    let mut reader = SourceReader {
        inner: resource.open()?,
        failed: false,
    };
    let staging = staging_path(target);
    let write_error = |source: io::Error| ResourceError::Write {
        path: target.to_path_buf(),
        source,
    };

    let copied = File::create(&staging)
        .map_err(write_error)
        .and_then(|mut file| {
            let n = io::copy(&mut reader, &mut file).map_err(|source| {
                if reader.failed {
                    ResourceError::Read {
                        resource: resource.description(),
                        source,
                    }
                } else {
                    write_error(source)
                }
            })?;
            file.sync_all().map_err(write_error)?;
            Ok(n)
        })
        .and_then(|n| fs::rename(&staging, target).map(|()| n).map_err(write_error));

    if copied.is_err() {
        let _ = fs::remove_file(&staging);
    }
    copied
}
