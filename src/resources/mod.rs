//! Resource resolution: one lookup contract over archive entries and files.
//!
//! A [`ResourceResolver`] maps a path to zero or one [`Resource`]; a resource
//! hands out its bytes as a stream.  Two resolvers exist:
//!
//! - [`archive::ArchiveResourceResolver`]: entries inside zip/jar archives
//! - [`fs::FileSystemResourceResolver`]: files below a base directory
//!
//! Exactly one resolver is active for a run.
pub mod archive;
pub mod error;
pub mod fs;
pub mod helpers;

use std::fmt;
use std::io::Read;

pub use error::ResourceError;

/// A readable settings resource.
///
/// Resources may borrow their resolver and can therefore never outlive it.
pub trait Resource: fmt::Debug {
    /// Human-readable identity, used only for diagnostics.
    fn description(&self) -> String;

    /// Open the resource for reading.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Read`] if the underlying handle cannot be
    /// opened or read.
    fn open(&self) -> Result<Box<dyn Read + '_>, ResourceError>;
}

/// Strategy turning a relative or absolute path into a [`Resource`].
///
/// # Examples
///
/// ```no_run
/// use project_settings::resources::ResourceResolver;
/// use project_settings::resources::fs::FileSystemResourceResolver;
///
/// let mut resolver = FileSystemResourceResolver::try_new("/project".into())?;
/// if let Some(resource) = resolver.resolve("conf/org.eclipse.jdt.core.prefs")? {
///     println!("found {}", resource.description());
/// }
/// resolver.close()?;
/// # Ok::<(), project_settings::resources::ResourceError>(())
/// ```
pub trait ResourceResolver: fmt::Debug {
    /// Human-readable description of the resolver (scheme, prefix, backing files).
    fn description(&self) -> String;

    /// Look up `path`.
    ///
    /// "Not found" is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Closed`] after [`close`](Self::close), or an
    /// error for a lookup failure that is not a plain miss.
    fn resolve(&self, path: &str) -> Result<Option<Box<dyn Resource + '_>>, ResourceError>;

    /// Release every handle owned by the resolver.
    ///
    /// Closing twice is a no-op.  Resolvers also release their handles when
    /// dropped, so cleanup happens on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing a handle fails.
    fn close(&mut self) -> Result<(), ResourceError>;
}
