//! The `source` selector: where settings resources are looked up.
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Resource source chosen for a run.
///
/// Written as `jar`, `jar:<prefix>`, `file` or `file:<directory>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Entries inside the plugin's dependency archives.
    Archive {
        /// Raw prefix after `jar:`; normalised by the archive resolver.
        prefix: String,
    },
    /// Plain files below a directory.
    FileSystem {
        /// Raw directory after `file:`; empty means the project base directory.
        directory: String,
    },
}

impl FromStr for Source {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if let Some(rest) = scheme_rest(raw, "jar") {
            return Ok(Self::Archive {
                prefix: rest.to_string(),
            });
        }
        if let Some(rest) = scheme_rest(raw, "file") {
            return Ok(Self::FileSystem {
                directory: rest.to_string(),
            });
        }
        Err(ConfigError::InvalidSource(raw.to_string()))
    }
}

/// `Some(rest)` when `raw` is exactly `scheme` or starts with `scheme:`.
fn scheme_rest<'a>(raw: &'a str, scheme: &str) -> Option<&'a str> {
    if raw == scheme {
        return Some("");
    }
    raw.strip_prefix(scheme)?.strip_prefix(':')
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive { prefix } => write!(f, "jar:{prefix}"),
            Self::FileSystem { directory } => write!(f, "file:{directory}"),
        }
    }
}
