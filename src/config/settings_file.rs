//! Settings file entries: what to copy, where to, and when.
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Where a settings file entry was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLocation {
    /// Configuration file holding the entry.
    pub source: PathBuf,
    /// 1-based position in the `files` array.
    pub index: usize,
}

impl fmt::Display for InputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#files[{}]", self.source.display(), self.index)
    }
}

/// Format an optional location as a message suffix (`" @ file#files[n]"`).
#[must_use]
pub fn format_input_location(location: Option<&InputLocation>) -> String {
    location.map_or_else(String::new, |l| format!(" @ {l}"))
}

/// One `[[files]]` entry as written in the configuration.
///
/// ```toml
/// [[files]]
/// name = ".settings/org.eclipse.jdt.core.prefs"
/// location = "/org.eclipse.jdt.core.prefs"
/// packagings = "jar"
/// fail_on_error = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsFile {
    /// Target path, relative to the project base directory.
    #[serde(default)]
    pub name: Option<String>,
    /// Resource path looked up by the active resolver.
    #[serde(default)]
    pub location: Option<String>,
    /// Packaging filter replacing the run-wide one when non-blank.
    #[serde(default)]
    pub packagings: Option<String>,
    /// Per-file fail policy; inherits the run default when absent.
    #[serde(
        default,
        alias = "failOnError",
        alias = "fail_if_missing",
        alias = "failIfMissing"
    )]
    pub fail_on_error: Option<bool>,
    /// Declaration site, filled in when the configuration is loaded.
    #[serde(skip)]
    pub input_location: Option<InputLocation>,
}

/// A [`SettingsFile`] whose required fields are present and whose fail
/// policy is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFile {
    /// Trimmed target path.
    pub name: String,
    /// Trimmed resource path.
    pub location: String,
    /// Per-file packaging filter, as configured.
    pub packagings: Option<String>,
    /// Effective fail policy.
    pub fail_on_error: bool,
    /// Declaration site, when known.
    pub input_location: Option<InputLocation>,
}

impl SettingsFile {
    /// Create an entry copying `location` to `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Set the per-file packaging filter.
    #[must_use]
    pub fn with_packagings(mut self, packagings: impl Into<String>) -> Self {
        self.packagings = Some(packagings.into());
        self
    }

    /// Set the per-file fail policy.
    #[must_use]
    pub const fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = Some(fail_on_error);
        self
    }

    /// Check required fields and resolve the fail policy.
    ///
    /// `position` is the 1-based index of the entry in the run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming `location` or `name` when
    /// either is absent or blank after trimming.
    pub fn validate(
        &self,
        position: usize,
        default_fail_on_error: bool,
    ) -> Result<ValidatedFile, ConfigError> {
        let required = |value: Option<&String>, field: &'static str| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField {
                    field,
                    position,
                    location: format_input_location(self.input_location.as_ref()),
                })
        };
        let location = required(self.location.as_ref(), "location")?;
        let name = required(self.name.as_ref(), "name")?;
        Ok(ValidatedFile {
            name,
            location,
            packagings: self.packagings.clone(),
            fail_on_error: self.fail_on_error.unwrap_or(default_fail_on_error),
            input_location: self.input_location.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Files {
        files: Vec<SettingsFile>,
    }

    #[test]
    fn validate_trims_and_inherits_fail_policy() {
        let file = SettingsFile::new("  .settings/a.prefs ", " /a.prefs\t");
        let validated = file.validate(1, true).unwrap();
        assert_eq!(validated.name, ".settings/a.prefs");
        assert_eq!(validated.location, "/a.prefs");
        assert!(validated.fail_on_error);
    }

    #[test]
    fn validate_keeps_explicit_fail_policy() {
        let file = SettingsFile::new("a", "b").with_fail_on_error(false);
        assert!(!file.validate(1, true).unwrap().fail_on_error);
        let file = SettingsFile::new("a", "b").with_fail_on_error(true);
        assert!(file.validate(1, false).unwrap().fail_on_error);
    }

    #[test]
    fn validate_rejects_blank_location_first() {
        let file = SettingsFile {
            name: None,
            location: Some("   ".to_string()),
            ..SettingsFile::default()
        };
        let err = file.validate(3, true).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "location",
                position: 3,
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_missing_name() {
        let file = SettingsFile {
            location: Some("/a".to_string()),
            input_location: Some(InputLocation {
                source: PathBuf::from("project-settings.toml"),
                index: 2,
            }),
            ..SettingsFile::default()
        };
        let err = file.validate(2, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No <name> for settings file #2 @ project-settings.toml#files[2], please fix it"
        );
    }

    #[test]
    fn deserialize_accepts_fail_policy_aliases() {
        let parsed: Files = toml::from_str(
            r#"
[[files]]
name = "a"
location = "/a"
failOnError = false

[[files]]
name = "b"
location = "/b"
failIfMissing = true

[[files]]
name = "c"
location = "/c"
fail_if_missing = false

[[files]]
name = "d"
location = "/d"
packagings = "jar !pom"
"#,
        )
        .unwrap();
        let policies: Vec<_> = parsed.files.iter().map(|f| f.fail_on_error).collect();
        assert_eq!(policies, vec![Some(false), Some(true), Some(false), None]);
        assert_eq!(parsed.files[3].packagings.as_deref(), Some("jar !pom"));
        assert!(parsed.files[0].input_location.is_none());
    }

    #[test]
    fn format_input_location_is_empty_without_location() {
        assert_eq!(format_input_location(None), "");
    }
}
