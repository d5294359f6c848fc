//! Project model and dependency archive lookup.
//!
//! The archive source reads settings from the dependencies attached to this
//! tool's plugin declaration.  [`ProjectModel`] exposes the declarations and
//! [`ArtifactLocator`] maps a dependency key to an archive on disk; both are
//! backed by the `[project]` and `[artifacts]` tables of the configuration.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::Log;

/// Plugin key used when the configuration does not name one.
pub const DEFAULT_PLUGIN_KEY: &str = "project-settings:project-settings-plugin";

/// Packaging assumed when the configuration does not name one.
pub const DEFAULT_PACKAGING: &str = "jar";

/// A `groupId:artifactId` dependency of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    /// Group identifier.
    #[serde(alias = "groupId")]
    pub group_id: String,
    /// Artifact identifier.
    #[serde(alias = "artifactId")]
    pub artifact_id: String,
}

impl Dependency {
    /// Versionless key, `group:artifact`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// A plugin declaration with its attached dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plugin {
    /// Group identifier.
    #[serde(alias = "groupId")]
    pub group_id: String,
    /// Artifact identifier.
    #[serde(alias = "artifactId")]
    pub artifact_id: String,
    /// Dependencies attached to the plugin, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Plugin {
    /// Versionless key, `group:artifact`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Read-only view of the project being configured.
pub trait ProjectModel {
    /// Project packaging (`jar`, `war`, `pom`, ...).
    fn packaging(&self) -> &str;
    /// Directory that settings file names are relative to.
    fn basedir(&self) -> &Path;
    /// Plugins declared under plugin management.
    fn management_plugins(&self) -> &[Plugin];
    /// Plugins declared in the build.
    fn build_plugins(&self) -> &[Plugin];
}

/// Maps a dependency key to the archive that holds it.
pub trait ArtifactLocator {
    /// Archive for `key` (`group:artifact`), or `None` when unresolved.
    fn locate(&self, key: &str) -> Option<PathBuf>;
}

/// The `[project]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Project packaging.
    pub packaging: String,
    /// Base directory; relative values are resolved against the
    /// configuration file's directory.
    pub basedir: PathBuf,
    /// Key of the plugin whose dependencies provide the settings archives.
    #[serde(alias = "plugin_key")]
    pub plugin: String,
    /// Plugin management declarations.
    #[serde(alias = "pluginManagement")]
    pub plugin_management: Vec<Plugin>,
    /// Build plugin declarations.
    pub plugins: Vec<Plugin>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            packaging: DEFAULT_PACKAGING.to_string(),
            basedir: PathBuf::from("."),
            plugin: DEFAULT_PLUGIN_KEY.to_string(),
            plugin_management: Vec::new(),
            plugins: Vec::new(),
        }
    }
}

impl Project {
    /// Resolve a relative base directory against `root`.
    pub(crate) fn resolve_paths(&mut self, root: &Path) {
        if self.basedir.is_relative() {
            self.basedir = root.join(&self.basedir);
        }
    }
}

impl ProjectModel for Project {
    fn packaging(&self) -> &str {
        &self.packaging
    }

    fn basedir(&self) -> &Path {
        &self.basedir
    }

    fn management_plugins(&self) -> &[Plugin] {
        &self.plugin_management
    }

    fn build_plugins(&self) -> &[Plugin] {
        &self.plugins
    }
}

/// The `[artifacts]` table: dependency key to archive path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ArtifactMap(BTreeMap<String, PathBuf>);

impl ArtifactMap {
    /// Resolve relative archive paths against `root`.
    pub(crate) fn resolve_paths(&mut self, root: &Path) {
        for path in self.0.values_mut() {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    /// Register `path` as the archive for `key`.
    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.insert(key.into(), path.into());
    }
}

impl ArtifactLocator for ArtifactMap {
    fn locate(&self, key: &str) -> Option<PathBuf> {
        self.0.get(key).cloned()
    }
}

/// Collect the archives attached to the plugin `plugin_key`.
///
/// Plugin management declarations are visited before build plugins; only
/// plugins whose key equals `plugin_key` contribute.  Unresolved dependencies
/// are warned about and skipped, and duplicates keep their first position.
pub fn collect_archives(
    project: &dyn ProjectModel,
    plugin_key: &str,
    locator: &dyn ArtifactLocator,
    log: &dyn Log,
) -> Vec<PathBuf> {
    log.debug("Collecting artifacts (dependencies) to use");
    let mut archives: Vec<PathBuf> = Vec::new();

    let plugins = project
        .management_plugins()
        .iter()
        .chain(project.build_plugins())
        .filter(|p| p.key() == plugin_key);

    for plugin in plugins {
        log.debug(&format!("Checking {} dependencies...", plugin.key()));
        for dependency in &plugin.dependencies {
            let key = dependency.key();
            match locator.locate(&key) {
                None => log.warn(&format!("Missing dependency {key}.")),
                Some(path) if archives.contains(&path) => {
                    log.debug(&format!(
                        "++ ignoring {key}: {} (already added)",
                        path.display()
                    ));
                }
                Some(path) => {
                    log.debug(&format!("++ adding {key}: {}", path.display()));
                    archives.push(path);
                }
            }
        }
    }

    log.debug(&format!("Resolved {} artifacts", archives.len()));
    if archives.is_empty() {
        log.warn(&format!(
            "Could not find dependencies attached to plugin {plugin_key}."
        ));
    }
    archives
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{isolated_logger, log_contents};

    const KEY: &str = "org.example:settings-plugin";

    fn dep(artifact: &str) -> Dependency {
        Dependency {
            group_id: "org.example".to_string(),
            artifact_id: artifact.to_string(),
        }
    }

    fn plugin(key_artifact: &str, deps: &[&str]) -> Plugin {
        Plugin {
            group_id: "org.example".to_string(),
            artifact_id: key_artifact.to_string(),
            dependencies: deps.iter().copied().map(dep).collect(),
        }
    }

    fn artifacts(keys: &[&str]) -> ArtifactMap {
        let mut map = ArtifactMap::default();
        for key in keys {
            map.insert(format!("org.example:{key}"), format!("/repo/{key}.jar"));
        }
        map
    }

    #[test]
    fn management_plugins_come_first() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = Project {
            plugin_management: vec![plugin("settings-plugin", &["b"])],
            plugins: vec![plugin("settings-plugin", &["a"])],
            ..Project::default()
        };
        let archives = collect_archives(&project, KEY, &artifacts(&["a", "b"]), &log);
        assert_eq!(
            archives,
            vec![PathBuf::from("/repo/b.jar"), PathBuf::from("/repo/a.jar")]
        );
    }

    #[test]
    fn other_plugins_are_ignored() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = Project {
            plugins: vec![
                plugin("compiler-plugin", &["a"]),
                plugin("settings-plugin", &["b"]),
            ],
            ..Project::default()
        };
        let archives = collect_archives(&project, KEY, &artifacts(&["a", "b"]), &log);
        assert_eq!(archives, vec![PathBuf::from("/repo/b.jar")]);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = Project {
            plugin_management: vec![plugin("settings-plugin", &["a", "b"])],
            plugins: vec![plugin("settings-plugin", &["b", "a", "c"])],
            ..Project::default()
        };
        let archives = collect_archives(&project, KEY, &artifacts(&["a", "b", "c"]), &log);
        assert_eq!(
            archives,
            vec![
                PathBuf::from("/repo/a.jar"),
                PathBuf::from("/repo/b.jar"),
                PathBuf::from("/repo/c.jar"),
            ]
        );
    }

    #[test]
    fn unresolved_dependency_is_warned_and_skipped() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = Project {
            plugins: vec![plugin("settings-plugin", &["gone", "a"])],
            ..Project::default()
        };
        let archives = collect_archives(&project, KEY, &artifacts(&["a"]), &log);
        assert_eq!(archives, vec![PathBuf::from("/repo/a.jar")]);
        assert!(log_contents(&log).contains("[warn] Missing dependency org.example:gone."));
    }

    #[test]
    fn empty_result_is_warned() {
        let (log, _tmp, _guard) = isolated_logger();
        let archives = collect_archives(&Project::default(), KEY, &ArtifactMap::default(), &log);
        assert!(archives.is_empty());
        assert!(log_contents(&log).contains(&format!(
            "[warn] Could not find dependencies attached to plugin {KEY}."
        )));
    }

    #[test]
    fn project_table_deserializes_with_camel_case_aliases() {
        let project: Project = toml::from_str(
            r#"
packaging = "war"
basedir = "module"

[[pluginManagement]]
groupId = "org.example"
artifactId = "settings-plugin"
dependencies = [{ groupId = "org.example", artifactId = "ide" }]
"#,
        )
        .unwrap();
        assert_eq!(project.packaging, "war");
        assert_eq!(project.plugin, DEFAULT_PLUGIN_KEY);
        assert_eq!(project.plugin_management[0].dependencies[0].key(), "org.example:ide");
        assert!(project.plugins.is_empty());
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let mut project = Project {
            basedir: PathBuf::from("module"),
            ..Project::default()
        };
        project.resolve_paths(Path::new("/work"));
        assert_eq!(project.basedir(), Path::new("/work/module"));

        let mut map = artifacts(&[]);
        map.insert("g:rel", "lib/rel.jar");
        map.insert("g:abs", "/abs.jar");
        map.resolve_paths(Path::new("/work"));
        assert_eq!(map.locate("g:rel"), Some(PathBuf::from("/work/lib/rel.jar")));
        assert_eq!(map.locate("g:abs"), Some(PathBuf::from("/abs.jar")));
        assert_eq!(map.locate("g:none"), None);
    }
}
