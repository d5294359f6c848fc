//! Copy orchestration: validate, filter, copy, report.
use std::error::Error as _;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::config::packaging::PackagingFilter;
use crate::config::settings_file::{SettingsFile, ValidatedFile, format_input_location};
use crate::config::DEFAULT_PACKAGINGS;
use crate::error::{CopyFailure, FileFailure, SettingsError};
use crate::logging::FileStatus;
use crate::resources::helpers::fs::{ensure_parent_dir, write_resource};
use crate::resources::{ResourceError, ResourceResolver};

use super::Context;

/// Phases of a copy run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Required fields are checked and fail policies resolved.
    Validating,
    /// Packaging filters drop entries that do not apply.
    Filtering,
    /// Surviving entries are resolved and written.
    Copying,
    /// The build hook is notified and failures aggregated.
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Filtering => "filtering",
            Self::Copying => "copying",
            Self::Reporting => "reporting",
        })
    }
}

/// Counters for a copy run.
///
/// # Examples
///
/// ```
/// use project_settings::tasks::CopyStats;
///
/// let stats = CopyStats { copied: 2, filtered: 1, ..CopyStats::default() };
/// assert_eq!(stats.summary(false), "2 copied, 1 filtered");
/// assert_eq!(stats.summary(true), "2 would copy, 1 filtered");
/// ```
///
/// Non-zero skip, ignore and failure counts are appended:
///
/// ```
/// use project_settings::tasks::CopyStats;
///
/// let stats = CopyStats { copied: 1, filtered: 0, skipped: 1, ignored: 2, failed: 3 };
/// assert_eq!(
///     stats.summary(false),
///     "1 copied, 0 filtered, 1 skipped, 2 ignored, 3 failed"
/// );
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written (or that would be written in a dry run).
    pub copied: u32,
    /// Files dropped by their packaging filter.
    pub filtered: u32,
    /// Files whose target is a directory.
    pub skipped: u32,
    /// Failures tolerated by the file's fail policy.
    pub ignored: u32,
    /// Failures that fail the run.
    pub failed: u32,
}

impl CopyStats {
    /// Format the summary string (e.g. "3 copied, 1 filtered, 1 failed").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would copy" } else { "copied" };
        let mut summary = format!("{} {verb}, {} filtered", self.copied, self.filtered);
        for (count, label) in [
            (self.skipped, "skipped"),
            (self.ignored, "ignored"),
            (self.failed, "failed"),
        ] {
            if count > 0 {
                summary.push_str(&format!(", {count} {label}"));
            }
        }
        summary
    }
}

/// Result of a successful copy run.
#[derive(Debug, Default)]
pub struct CopyOutcome {
    /// Target paths written, in configured order.
    pub written: Vec<PathBuf>,
    /// Per-status counters.
    pub stats: CopyStats,
}

/// What happened to one settings file that did not fail.
enum FileOutcome {
    Written(PathBuf),
    DirectoryTarget(PathBuf),
    DryRun,
}

/// Copies configured settings files from the active resolver into the
/// project.
#[derive(Debug, Clone)]
pub struct CopySettings {
    files: Vec<SettingsFile>,
    packagings: String,
    fail_on_error: bool,
}

impl CopySettings {
    /// Copy `files` with the default run options (`!pom`, fail on error).
    #[must_use]
    pub fn new(files: Vec<SettingsFile>) -> Self {
        Self {
            files,
            packagings: DEFAULT_PACKAGINGS.to_string(),
            fail_on_error: true,
        }
    }

    /// Build from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            files: config.files.clone(),
            packagings: config.packagings.clone(),
            fail_on_error: config.fail_on_error,
        }
    }

    /// Replace the run-wide fail policy.
    #[must_use]
    pub const fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Run the copy against `resolver`.
    ///
    /// Every file is processed in configured order; a failing file never
    /// stops the ones after it.  The build hook hears about each written
    /// path even when the run fails.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Config`] when an entry lacks `name` or `location`
    ///   (raised before anything is resolved)
    /// - [`SettingsError::Resource`] when the resolver is unusable (closed)
    /// - [`SettingsError::Copy`] when at least one file with a `true` fail
    ///   policy could not be copied
    pub fn run(
        &self,
        resolver: &dyn ResourceResolver,
        ctx: &Context<'_>,
    ) -> Result<CopyOutcome, SettingsError> {
        ctx.log.debug(&format!("stage: {}", Stage::Validating));
        let files = self
            .files
            .iter()
            .enumerate()
            .map(|(i, file)| file.validate(i + 1, self.fail_on_error))
            .collect::<Result<Vec<_>, _>>()?;

        ctx.log.debug(&format!("stage: {}", Stage::Filtering));
        let mut stats = CopyStats::default();
        let selected = self.filter(&files, ctx, &mut stats);

        ctx.log.debug(&format!("stage: {}", Stage::Copying));
        ctx.log.info(&format!(
            "Copying {} resources using {} resolver.",
            selected.len(),
            resolver.description()
        ));
        let mut written = Vec::new();
        let mut failures = Vec::new();
        let mut aborted = None;
        for file in selected {
            match copy_file(file, resolver, ctx) {
                Ok(FileOutcome::Written(target)) => {
                    stats.copied += 1;
                    ctx.log.record_file(&file.name, FileStatus::Copied, None);
                    written.push(target);
                }
                Ok(FileOutcome::DryRun) => {
                    stats.copied += 1;
                    ctx.log.record_file(&file.name, FileStatus::DryRun, None);
                }
                Ok(FileOutcome::DirectoryTarget(target)) => {
                    stats.skipped += 1;
                    ctx.log
                        .warn(&format!("{} is a directory, ignoring.", target.display()));
                    ctx.log
                        .record_file(&file.name, FileStatus::Skipped, Some("target is a directory"));
                }
                Err(e @ ResourceError::Closed { .. }) => {
                    aborted = Some(e);
                    break;
                }
                Err(error) => {
                    let message = describe(file, &ctx.target(&file.name), &error);
                    if file.fail_on_error {
                        stats.failed += 1;
                        ctx.log.error(&message);
                        ctx.log
                            .record_file(&file.name, FileStatus::Failed, Some(&error.to_string()));
                        failures.push(FileFailure {
                            name: file.name.clone(),
                            location: file.location.clone(),
                            error,
                        });
                    } else {
                        stats.ignored += 1;
                        ctx.log.warn(&message);
                        ctx.log
                            .record_file(&file.name, FileStatus::Ignored, Some(&error.to_string()));
                    }
                }
            }
        }

        ctx.log.debug(&format!("stage: {}", Stage::Reporting));
        for path in &written {
            ctx.build.refresh(path);
        }
        ctx.log.info(&stats.summary(ctx.dry_run));

        if let Some(e) = aborted {
            return Err(e.into());
        }
        match CopyFailure::from_failures(failures) {
            Some(failure) => Err(failure.into()),
            None => Ok(CopyOutcome { written, stats }),
        }
    }

    /// Drop the entries whose effective packaging filter rejects the project.
    fn filter<'f>(
        &self,
        files: &'f [ValidatedFile],
        ctx: &Context<'_>,
        stats: &mut CopyStats,
    ) -> Vec<&'f ValidatedFile> {
        let ambient = PackagingFilter::parse(Some(&self.packagings));
        files
            .iter()
            .filter(|file| {
                let filter = ambient.join(file.packagings.as_deref());
                if filter.test(&ctx.packaging) {
                    return true;
                }
                ctx.log.debug(&format!(
                    "Ignoring {} -> {} because packaging '{}' is filtered by {}{}",
                    file.location,
                    file.name,
                    ctx.packaging,
                    filter,
                    format_input_location(file.input_location.as_ref()),
                ));
                ctx.log
                    .record_file(&file.name, FileStatus::Filtered, Some(&filter.to_string()));
                stats.filtered += 1;
                false
            })
            .collect()
    }
}

/// Resolve one file and write it to its target.
fn copy_file(
    file: &ValidatedFile,
    resolver: &dyn ResourceResolver,
    ctx: &Context<'_>,
) -> Result<FileOutcome, ResourceError> {
    let target = ctx.target(&file.name);
    let resource = resolver
        .resolve(&file.location)?
        .ok_or_else(|| ResourceError::Missing {
            path: file.location.clone(),
        })?;

    // Never copy "into" a directory the way `mv` would.
    if target.is_dir() {
        return Ok(FileOutcome::DirectoryTarget(target));
    }

    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "would copy {} to {}",
            resource.description(),
            target.display()
        ));
        return Ok(FileOutcome::DryRun);
    }

    ensure_parent_dir(&target)?;
    ctx.log.info(&format!(
        "Copying {} to {}",
        resource.description(),
        target.display()
    ));
    write_resource(resource.as_ref(), &target)?;
    Ok(FileOutcome::Written(target))
}

/// Log message for a file that could not be copied, with the error chain.
fn describe(file: &ValidatedFile, target: &Path, error: &ResourceError) -> String {
    if matches!(error, ResourceError::Missing { .. }) {
        return format!(
            "{error}{}.",
            format_input_location(file.input_location.as_ref())
        );
    }
    let mut message = format!(
        "Could not copy {} to {}: {error}",
        file.location,
        target.display()
    );
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::logging::{isolated_logger, log_contents};
    use crate::operations::MockBuildContext;
    use crate::resources::test_helpers::MemoryResolver;

    fn refresh_never() -> MockBuildContext {
        let mut build = MockBuildContext::new();
        build.expect_refresh().never();
        build
    }

    #[test]
    fn copies_single_file_and_notifies_once() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let target = project.path().join(".settings/a.prefs");
        let mut build = MockBuildContext::new();
        build
            .expect_refresh()
            .withf({
                let target = target.clone();
                move |p| p == target
            })
            .times(1)
            .return_const(());
        let resolver = MemoryResolver::new().with_entry("/a.prefs", "a=1\n");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![SettingsFile::new(".settings/a.prefs", "/a.prefs")])
            .run(&resolver, &ctx)
            .unwrap();

        assert_eq!(outcome.written, vec![target.clone()]);
        assert_eq!(outcome.stats.copied, 1);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "a=1\n");
        assert_eq!(log.file_entries()[0].status, FileStatus::Copied);
    }

    #[test]
    fn missing_first_file_does_not_stop_second() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let mut build = MockBuildContext::new();
        build.expect_refresh().times(1).return_const(());
        let resolver = MemoryResolver::new().with_entry("/b.prefs", "b=2");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let err = CopySettings::new(vec![
            SettingsFile::new("a.prefs", "/a.prefs"),
            SettingsFile::new("b.prefs", "/b.prefs"),
        ])
        .run(&resolver, &ctx)
        .unwrap_err();

        let SettingsError::Copy(failure) = err else {
            panic!("expected copy failure, got {err:?}");
        };
        assert_eq!(failure.count(), 1);
        assert_eq!(failure.to_string(), "Unable to copy 1 files");
        assert!(matches!(
            failure.failures()[0].error,
            ResourceError::Missing { ref path } if path == "/a.prefs"
        ));
        assert_eq!(
            std::fs::read_to_string(project.path().join("b.prefs")).unwrap(),
            "b=2"
        );
        assert!(log_contents(&log).contains("[error] Source file /a.prefs does not exist"));
    }

    #[test]
    fn filtered_file_is_never_resolved() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_entry("/a.prefs", "a");
        let ctx = Context::new(&log, &build, project.path(), "pom", false);

        let outcome = CopySettings::new(vec![SettingsFile::new("a.prefs", "/a.prefs")])
            .run(&resolver, &ctx)
            .unwrap();

        assert!(resolver.lookups().is_empty());
        assert!(outcome.written.is_empty());
        assert_eq!(
            outcome.stats,
            CopyStats {
                filtered: 1,
                ..CopyStats::default()
            }
        );
        assert!(!project.path().join("a.prefs").exists());
        assert_eq!(log.file_entries()[0].status, FileStatus::Filtered);
    }

    #[test]
    fn per_file_packagings_replace_ambient_filter() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let mut build = MockBuildContext::new();
        build.expect_refresh().times(1).return_const(());
        let resolver = MemoryResolver::new()
            .with_entry("/pom-only", "p")
            .with_entry("/jar-only", "j");
        let ctx = Context::new(&log, &build, project.path(), "pom", false);

        let outcome = CopySettings::new(vec![
            SettingsFile::new("pom-only", "/pom-only").with_packagings("pom"),
            SettingsFile::new("jar-only", "/jar-only").with_packagings("jar"),
        ])
        .run(&resolver, &ctx)
        .unwrap();

        assert_eq!(outcome.written, vec![project.path().join("pom-only")]);
        assert_eq!(resolver.lookups(), vec!["/pom-only"]);
    }

    #[test]
    fn tolerated_failure_is_a_warning() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new();
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![
            SettingsFile::new("a.prefs", "/a.prefs").with_fail_on_error(false),
        ])
        .run(&resolver, &ctx)
        .unwrap();

        assert_eq!(outcome.stats.ignored, 1);
        assert!(log_contents(&log).contains("[warn] Source file /a.prefs does not exist"));
        assert_eq!(log.file_entries()[0].status, FileStatus::Ignored);
    }

    #[test]
    fn run_default_fail_policy_is_inherited() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new();
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![SettingsFile::new("a", "/a")])
            .with_fail_on_error(false)
            .run(&resolver, &ctx)
            .unwrap();
        assert_eq!(outcome.stats.ignored, 1);

        let err = CopySettings::new(vec![SettingsFile::new("a", "/a").with_fail_on_error(true)])
            .with_fail_on_error(false)
            .run(&resolver, &ctx)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Copy(_)));
    }

    #[test]
    fn read_failure_is_classified_per_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_unreadable("/broken");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let err = CopySettings::new(vec![SettingsFile::new("out", "/broken")])
            .run(&resolver, &ctx)
            .unwrap_err();
        let SettingsError::Copy(failure) = err else {
            panic!("expected copy failure");
        };
        assert!(matches!(failure.failures()[0].error, ResourceError::Read { .. }));
        assert!(log_contents(&log).contains("Could not copy /broken to"));
    }

    #[test]
    fn unreadable_source_keeps_existing_target() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let target = project.path().join("keep.prefs");
        std::fs::write(&target, "precious=1\n").unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_unreadable("/broken");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![
            SettingsFile::new("keep.prefs", "/broken").with_fail_on_error(false),
        ])
        .run(&resolver, &ctx)
        .unwrap();

        assert_eq!(outcome.stats.ignored, 1);
        assert!(outcome.written.is_empty());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "precious=1\n");
        let leftovers = std::fs::read_dir(project.path()).unwrap().count();
        assert_eq!(leftovers, 1, "no staging file may remain");
    }

    #[test]
    fn directory_location_on_disk_is_missing_not_truncating() {
        use crate::resources::fs::FileSystemResourceResolver;

        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let target = project.path().join("keep.prefs");
        std::fs::write(&target, "precious=1\n").unwrap();
        std::fs::create_dir(project.path().join("srcdir")).unwrap();
        let build = refresh_never();
        let resolver = FileSystemResourceResolver::try_new(project.path().to_path_buf()).unwrap();
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![
            SettingsFile::new("keep.prefs", "srcdir").with_fail_on_error(false),
        ])
        .run(&resolver, &ctx)
        .unwrap();

        assert_eq!(outcome.stats.ignored, 1);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "precious=1\n");
        assert!(log_contents(&log).contains("[warn] Source file srcdir does not exist"));
    }

    #[test]
    fn directory_target_is_skipped() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        std::fs::create_dir(project.path().join(".settings")).unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_entry("/a", "a");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![SettingsFile::new(".settings", "/a")])
            .run(&resolver, &ctx)
            .unwrap();

        assert_eq!(outcome.stats.skipped, 1);
        assert!(project.path().join(".settings").is_dir());
        assert!(log_contents(&log).contains("is a directory, ignoring."));
    }

    #[test]
    fn blank_field_fails_before_any_lookup() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_entry("/a", "a");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let err = CopySettings::new(vec![
            SettingsFile::new("a", "/a"),
            SettingsFile::new(" ", "/a"),
        ])
        .run(&resolver, &ctx)
        .unwrap_err();

        assert!(err.to_string().contains("No <name> for settings file #2"));
        assert!(resolver.lookups().is_empty());
        assert!(!project.path().join("a").exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let resolver = MemoryResolver::new().with_entry("/a", "a");
        let ctx = Context::new(&log, &build, project.path(), "jar", true);

        let outcome = CopySettings::new(vec![SettingsFile::new("x/a", "/a")])
            .run(&resolver, &ctx)
            .unwrap();

        assert!(outcome.written.is_empty());
        assert_eq!(outcome.stats.summary(true), "1 would copy, 0 filtered");
        assert!(!project.path().join("x").exists());
        assert!(log_contents(&log).contains("[dry run] would copy memory:/a"));
        assert_eq!(log.file_entries()[0].status, FileStatus::DryRun);
    }

    #[test]
    fn closed_resolver_aborts_run() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let build = refresh_never();
        let mut resolver = MemoryResolver::new().with_entry("/a", "a");
        resolver.close().unwrap();
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let err = CopySettings::new(vec![SettingsFile::new("a", "/a")])
            .run(&resolver, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Resource(ResourceError::Closed { .. })
        ));
    }

    #[test]
    fn absolute_name_ignores_basedir() {
        let (log, _tmp, _guard) = isolated_logger();
        let project = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let target = elsewhere.path().join("abs.prefs");
        let mut build = MockBuildContext::new();
        build.expect_refresh().times(1).return_const(());
        let resolver = MemoryResolver::new().with_entry("/a", "a");
        let ctx = Context::new(&log, &build, project.path(), "jar", false);

        let outcome = CopySettings::new(vec![SettingsFile::new(
            target.to_str().unwrap(),
            "/a",
        )])
        .run(&resolver, &ctx)
        .unwrap();
        assert_eq!(outcome.written, vec![target.clone()]);
        assert!(target.exists());
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Validating.to_string(), "validating");
        assert_eq!(Stage::Reporting.to_string(), "reporting");
    }
}
