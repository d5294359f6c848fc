//! Run configuration.
//!
//! A run is described by a TOML file (default [`DEFAULT_CONFIG_FILE`]):
//!
//! ```toml
//! source = "jar:/"            # or "file:<dir>"
//! fail_on_error = true
//! packagings = "!pom"
//!
//! [project]
//! packaging = "jar"
//! basedir = "."
//! plugin = "org.example:settings-plugin"
//!
//! [[project.plugins]]
//! group_id = "org.example"
//! artifact_id = "settings-plugin"
//! dependencies = [{ group_id = "org.example", artifact_id = "ide-settings" }]
//!
//! [artifacts]
//! "org.example:ide-settings" = "lib/ide-settings.jar"
//!
//! [[files]]
//! name = ".settings/org.eclipse.jdt.core.prefs"
//! location = "/org.eclipse.jdt.core.prefs"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
pub mod packaging;
pub mod project;
pub mod settings_file;
pub mod source;
pub mod toml_loader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use project::{ArtifactMap, Project};
use settings_file::{InputLocation, SettingsFile};
use source::Source;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "project-settings.toml";

/// Source used when the configuration does not name one.
pub const DEFAULT_SOURCE: &str = "jar:/";

/// Run-wide packaging filter used when the configuration does not name one.
pub const DEFAULT_PACKAGINGS: &str = "!pom";

/// The file as written; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    source: Option<String>,
    #[serde(alias = "failOnError")]
    fail_on_error: Option<bool>,
    packagings: Option<String>,
    skip: Option<bool>,
    project: Project,
    artifacts: ArtifactMap,
    files: Vec<SettingsFile>,
}

/// Values given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replacement `source` selector.
    pub source: Option<String>,
    /// Replacement run-wide packaging filter.
    pub packagings: Option<String>,
    /// Replacement run-wide fail policy.
    pub fail_on_error: Option<bool>,
    /// Force the run to be skipped.
    pub skip: bool,
}

/// Loaded run configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct Config {
    /// Configuration file this was loaded from.
    pub path: PathBuf,
    /// Raw `source` selector; parsed by [`Config::source`].
    pub source: String,
    /// Run-wide fail policy.
    pub fail_on_error: bool,
    /// Run-wide packaging filter.
    pub packagings: String,
    /// Skip the whole run.
    pub skip: bool,
    /// The project being configured.
    pub project: Project,
    /// Dependency archives by `group:artifact` key.
    pub artifacts: ArtifactMap,
    /// Settings files to copy, in order.
    pub files: Vec<SettingsFile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            source: DEFAULT_SOURCE.to_string(),
            fail_on_error: true,
            packagings: DEFAULT_PACKAGINGS.to_string(),
            skip: false,
            project: Project::default(),
            artifacts: ArtifactMap::default(),
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration at `path`.
    ///
    /// A missing file yields the defaults with no settings files.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawConfig = toml_loader::load_config(path)
            .with_context(|| format!("loading {}", path.display()))?;
        let root = config_root(path);

        let mut project = raw.project;
        project.resolve_paths(&root);
        let mut artifacts = raw.artifacts;
        artifacts.resolve_paths(&root);

        let files = raw
            .files
            .into_iter()
            .enumerate()
            .map(|(i, mut file)| {
                file.input_location = Some(InputLocation {
                    source: path.to_path_buf(),
                    index: i + 1,
                });
                file
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            source: raw.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            fail_on_error: raw.fail_on_error.unwrap_or(true),
            packagings: raw
                .packagings
                .unwrap_or_else(|| DEFAULT_PACKAGINGS.to_string()),
            skip: raw.skip.unwrap_or(false),
            project,
            artifacts,
            files,
        })
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(source) = &overrides.source {
            self.source.clone_from(source);
        }
        if let Some(packagings) = &overrides.packagings {
            self.packagings.clone_from(packagings);
        }
        if let Some(fail_on_error) = overrides.fail_on_error {
            self.fail_on_error = fail_on_error;
        }
        self.skip |= overrides.skip;
    }

    /// Directory that relative paths in the configuration resolve against.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        config_root(&self.path)
    }

    /// Resolve `path` against [`root`](Self::root) unless already absolute.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root().join(path)
        }
    }

    /// Parse the `source` selector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] for a blank selector and
    /// [`ConfigError::InvalidSource`] for an unknown scheme.
    pub fn source(&self) -> Result<Source, ConfigError> {
        self.source.parse()
    }
}

/// Absolute directory holding the configuration file.
fn config_root(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::path::absolute(parent).unwrap_or_else(|_| parent.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use project::{ArtifactLocator as _, ProjectModel as _};

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.source, "jar:/");
        assert!(config.fail_on_error);
        assert_eq!(config.packagings, "!pom");
        assert!(!config.skip);
        assert!(config.files.is_empty());
        assert_eq!(config.project.packaging(), "jar");
        assert_eq!(config.project.basedir(), dir.path().join("."));
    }

    #[test]
    fn loads_run_options_and_files() {
        let (dir, path) = write_config(
            r#"
source = "file:conf"
failOnError = false
packagings = "jar war"
skip = true

[project]
packaging = "war"
basedir = "web"

[artifacts]
"g:a" = "lib/a.jar"

[[files]]
name = ".settings/a.prefs"
location = "a.prefs"

[[files]]
name = ".settings/b.prefs"
location = "b.prefs"
fail_on_error = true
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.source, "file:conf");
        assert!(!config.fail_on_error);
        assert_eq!(config.packagings, "jar war");
        assert!(config.skip);
        assert_eq!(config.project.basedir(), dir.path().join("web"));
        assert_eq!(
            config.artifacts.locate("g:a"),
            Some(dir.path().join("lib/a.jar"))
        );
        assert_eq!(config.files.len(), 2);
        assert_eq!(
            config.files[1].input_location,
            Some(InputLocation {
                source: path.clone(),
                index: 2
            })
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let (_dir, path) = write_config("files = 3");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply_overrides(&Overrides {
            source: Some("file:/tmp".to_string()),
            packagings: Some(String::new()),
            fail_on_error: Some(false),
            skip: true,
        });
        assert_eq!(config.source, "file:/tmp");
        assert_eq!(config.packagings, "");
        assert!(!config.fail_on_error);
        assert!(config.skip);
    }

    #[test]
    fn empty_overrides_keep_file_values() {
        let mut config = Config {
            skip: true,
            ..Config::default()
        };
        config.apply_overrides(&Overrides::default());
        assert_eq!(config.source, DEFAULT_SOURCE);
        assert!(config.fail_on_error);
        assert!(config.skip);
    }

    #[test]
    fn resolve_path_uses_config_directory() {
        let config = Config {
            path: PathBuf::from("/work/module/project-settings.toml"),
            ..Config::default()
        };
        assert_eq!(config.root(), PathBuf::from("/work/module"));
        assert_eq!(
            config.resolve_path(Path::new("conf")),
            PathBuf::from("/work/module/conf")
        );
        assert_eq!(
            config.resolve_path(Path::new("/etc/ide")),
            PathBuf::from("/etc/ide")
        );
    }

    #[test]
    fn source_is_parsed_on_demand() {
        let config = Config {
            source: "svn:trunk".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.source(), Err(ConfigError::InvalidSource(_))));
        assert_eq!(
            Config::default().source().unwrap(),
            Source::Archive {
                prefix: "/".to_string()
            }
        );
    }
}
