//! Resolver over entries of one or more zip/jar archives.
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use super::{Resource, ResourceError, ResourceResolver};

/// One open archive.
#[derive(Debug)]
struct ArchiveHandle {
    path: PathBuf,
    archive: RefCell<ZipArchive<File>>,
}

impl ArchiveHandle {
    fn open(path: &Path) -> Result<Self, ResourceError> {
        let archive = File::open(path)
            .map_err(ZipError::Io)
            .and_then(ZipArchive::new)
            .map_err(|source| ResourceError::OpenArchive {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            archive: RefCell::new(archive),
        })
    }
}

/// Resolver backed by archives searched in priority order.
///
/// All archives are opened when the resolver is built and stay open until
/// [`close`](ResourceResolver::close) is called or the resolver is dropped.
/// Archives listed first shadow later ones.
#[derive(Debug)]
pub struct ArchiveResourceResolver {
    handles: Option<Vec<ArchiveHandle>>,
    prefix: Option<String>,
}

impl ArchiveResourceResolver {
    /// Open every archive in `archives`.
    ///
    /// `prefix` is prepended to relative lookups.  It is trimmed, leading `/`
    /// are dropped (entry names never start with one), a blank result means
    /// "no prefix", and a trailing `/` is added when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::OpenArchive`] if any archive cannot be opened;
    /// handles opened so far are released and no resolver is returned.
    pub fn open<I, P>(archives: I, prefix: Option<&str>) -> Result<Self, ResourceError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let handles = archives
            .into_iter()
            .map(|path| ArchiveHandle::open(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            handles: Some(handles),
            prefix: normalize_prefix(prefix),
        })
    }

    /// The normalised prefix, always ending with `/`.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Compute the archive entry name looked up for `path`.
    ///
    /// A leading `/` makes the path absolute within the archive root and
    /// bypasses the prefix.
    #[must_use]
    pub fn entry_name(&self, path: &str) -> String {
        if let Some(absolute) = path.strip_prefix('/') {
            return absolute.to_string();
        }
        match &self.prefix {
            Some(prefix) => format!("{prefix}{path}"),
            None => path.to_string(),
        }
    }
}

fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    let prefix = prefix?.trim().trim_start_matches('/');
    if prefix.is_empty() {
        return None;
    }
    if prefix.ends_with('/') {
        Some(prefix.to_string())
    } else {
        Some(format!("{prefix}/"))
    }
}

impl ResourceResolver for ArchiveResourceResolver {
    fn description(&self) -> String {
        let archives = self.handles.as_ref().map_or_else(
            || "closed".to_string(),
            |handles| {
                let names: Vec<String> = handles
                    .iter()
                    .map(|h| h.path.display().to_string())
                    .collect();
                format!("[{}]", names.join(","))
            },
        );
        format!(
            "jar:{} archives: {archives}",
            self.prefix.as_deref().unwrap_or_default()
        )
    }

    fn resolve(&self, path: &str) -> Result<Option<Box<dyn Resource + '_>>, ResourceError> {
        let handles = self.handles.as_ref().ok_or_else(|| ResourceError::Closed {
            resolver: self.description(),
        })?;
        let entry = self.entry_name(path);
        for handle in handles {
            let index = handle
                .archive
                .try_borrow()
                .map_err(|e| ResourceError::Lookup {
                    archive: handle.path.clone(),
                    entry: entry.clone(),
                    source: ZipError::Io(io::Error::other(e)),
                })?
                .index_for_name(&entry);
            if let Some(index) = index {
                return Ok(Some(Box::new(ArchiveResource {
                    handle,
                    index,
                    entry,
                })));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        // Dropping a read-only `File` cannot fail, so there is nothing to chain.
        drop(self.handles.take());
        Ok(())
    }
}

/// An entry inside one of the resolver's archives.
///
/// Opening decompresses the whole entry into memory: the zip reader borrows
/// the archive mutably for as long as the entry is read, and settings files
/// are small.
#[derive(Debug)]
struct ArchiveResource<'a> {
    handle: &'a ArchiveHandle,
    index: usize,
    entry: String,
}

impl Resource for ArchiveResource<'_> {
    fn description(&self) -> String {
        format!("{}@{}", self.handle.path.display(), self.entry)
    }

    fn open(&self) -> Result<Box<dyn Read + '_>, ResourceError> {
        let read_error = |source: io::Error| ResourceError::Read {
            resource: self.description(),
            source,
        };
        let mut archive = self
            .handle
            .archive
            .try_borrow_mut()
            .map_err(|e| read_error(io::Error::other(e)))?;
        let mut file = archive
            .by_index(self.index)
            .map_err(|e| read_error(io::Error::other(e)))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content).map_err(read_error)?;
        Ok(Box::new(Cursor::new(content)))
    }
}
