//! Typed error variants for resource resolution and copying.
//!
//! This module provides [`ResourceError`], the error type returned by
//! resolvers and resources.  Per-file variants (`Missing`, `Read`, `Write`)
//! are classified by the copy orchestrator according to the file's fail
//! policy; the remaining variants abort the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while resolving, reading or writing a settings resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The active resolver has no resource at the requested path.
    #[error("Source file {path} does not exist")]
    Missing {
        /// Requested resource path.
        path: String,
    },

    /// The resource exists but its bytes could not be read.
    #[error("could not read {resource}")]
    Read {
        /// Description of the resource.
        resource: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The target file could not be created or written.
    #[error("could not write {}", .path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An archive could not be opened while building the resolver.
    #[error("could not open archive {}", .path.display())]
    OpenArchive {
        /// Path of the archive file.
        path: PathBuf,
        /// Underlying archive error.
        source: zip::result::ZipError,
    },

    /// Looking up an entry failed for a reason other than "not found".
    #[error("could not look up '{entry}' in archive {}", .archive.display())]
    Lookup {
        /// Path of the archive being searched.
        archive: PathBuf,
        /// Entry name that was looked up.
        entry: String,
        /// Underlying archive error.
        source: zip::result::ZipError,
    },

    /// A resolver was used after [`close`](super::ResourceResolver::close).
    #[error("resolver {resolver} is closed")]
    Closed {
        /// Description of the closed resolver.
        resolver: String,
    },

    /// A filesystem resolver was requested without a base directory.
    #[error("no base directory for file resolver")]
    MissingBaseDirectory,
}
