// Shared helpers for integration tests.
//
// Provides a temporary project directory with a run configuration and a
// fluent builder for settings archives, so each integration test can set up
// an isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};

use project_settings::config::{Config, DEFAULT_CONFIG_FILE};
use zip::write::SimpleFileOptions;

/// Plugin key every fixture configuration declares.
pub const PLUGIN_KEY: &str = "org.example:settings-plugin";

/// An isolated project backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `project-settings.toml`: run configuration
/// - `project/`: the project receiving settings files
/// - `lib/`: settings archives
/// - `shared/`: loose settings files for `file:` sources
pub struct IntegrationTestContext {
    /// Temporary directory holding the whole fixture.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create an empty fixture with the standard directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for dir in ["project", "lib", "shared"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create fixture dir");
        }
        Self { root }
    }

    /// Path to the fixture root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path to the run configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join(DEFAULT_CONFIG_FILE)
    }

    /// Path of `name` inside the project directory.
    pub fn project_file(&self, name: &str) -> PathBuf {
        self.root.path().join("project").join(name)
    }

    /// Read a file from the project directory, `None` if absent.
    pub fn read_project_file(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.project_file(name)).ok()
    }

    /// Load the run configuration.
    pub fn load_config(&self) -> Config {
        Config::load(&self.config_path()).expect("load config")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// Archives are registered as dependencies of [`PLUGIN_KEY`]; the
/// configuration is written on [`build`](Self::build).
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
    run_options: String,
    packaging: String,
    archives: Vec<String>,
    files: Vec<String>,
}

impl TestContextBuilder {
    /// Begin building a fixture for a `jar` project.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
            run_options: String::new(),
            packaging: "jar".to_string(),
            archives: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Add a top-level run option line, e.g. `source = "file:shared"`.
    pub fn with_option(mut self, line: &str) -> Self {
        self.run_options.push_str(line);
        self.run_options.push('\n');
        self
    }

    /// Set the project packaging.
    pub fn with_packaging(mut self, packaging: &str) -> Self {
        self.packaging = packaging.to_string();
        self
    }

    /// Write `lib/<artifact>.jar` holding `entries` and attach it to the
    /// plugin as `org.example:<artifact>`.
    pub fn with_archive(mut self, artifact: &str, entries: &[(&str, &str)]) -> Self {
        let path = self.ctx.root.path().join("lib").join(format!("{artifact}.jar"));
        let file = std::fs::File::create(&path).expect("create archive");
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start archive entry");
            writer
                .write_all(content.as_bytes())
                .expect("write archive entry");
        }
        writer.finish().expect("finish archive");
        self.archives.push(artifact.to_string());
        self
    }

    /// Write `shared/<name>` for `file:` sources.
    pub fn with_shared_file(self, name: &str, content: &str) -> Self {
        let path = self.ctx.root.path().join("shared").join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create shared parent");
        }
        std::fs::write(path, content).expect("write shared file");
        self
    }

    /// Create a directory inside the project.
    pub fn with_project_dir(self, name: &str) -> Self {
        std::fs::create_dir_all(self.ctx.project_file(name)).expect("create project dir");
        self
    }

    /// Add a `[[files]]` entry; `extra` holds additional `key = value` lines.
    pub fn with_file(mut self, name: &str, location: &str, extra: &[&str]) -> Self {
        let mut entry = format!("[[files]]\nname = {name:?}\nlocation = {location:?}\n");
        for line in extra {
            entry.push_str(line);
            entry.push('\n');
        }
        self.files.push(entry);
        self
    }

    /// Write the configuration and return the fixture.
    pub fn build(self) -> IntegrationTestContext {
        let mut toml = self.run_options;
        toml.push_str(&format!(
            "\n[project]\npackaging = {:?}\nbasedir = \"project\"\nplugin = {PLUGIN_KEY:?}\n",
            self.packaging
        ));
        toml.push_str("\n[[project.plugins]]\ngroup_id = \"org.example\"\nartifact_id = \"settings-plugin\"\ndependencies = [");
        let deps: Vec<String> = self
            .archives
            .iter()
            .map(|a| format!("{{ group_id = \"org.example\", artifact_id = {a:?} }}"))
            .collect();
        toml.push_str(&deps.join(", "));
        toml.push_str("]\n\n[artifacts]\n");
        for artifact in &self.archives {
            toml.push_str(&format!("\"org.example:{artifact}\" = \"lib/{artifact}.jar\"\n"));
        }
        for entry in &self.files {
            toml.push('\n');
            toml.push_str(entry);
        }
        std::fs::write(self.ctx.config_path(), toml).expect("write config");
        self.ctx
    }
}
