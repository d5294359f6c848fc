//! Command: resolve and copy the configured settings files.
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::project::{ProjectModel as _, collect_archives};
use crate::config::source::Source;
use crate::config::{Config, DEFAULT_CONFIG_FILE, Overrides};
use crate::error::SettingsError;
use crate::logging::{Log, Logger};
use crate::operations::{BuildContext, ChangedListBuildContext, LoggingBuildContext};
use crate::resources::ResourceResolver;
use crate::resources::archive::ArchiveResourceResolver;
use crate::resources::fs::FileSystemResourceResolver;
use crate::tasks::{Context, CopyOutcome, CopySettings};

/// How an `apply` run ended without error.
#[derive(Debug)]
pub enum ApplyStatus {
    /// `skip` was set; nothing was resolved.
    Skipped,
    /// No settings files are configured.
    NotConfigured,
    /// The copy ran.
    Configured(CopyOutcome),
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid, the
/// resolver cannot be built, or a file with a `true` fail policy could not be
/// copied.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    log.stage("Loading configuration");
    let mut config = Config::load(&config_path)?;
    config.apply_overrides(&overrides(opts));
    log.info(&format!(
        "loaded {} settings files from {}",
        config.files.len(),
        config_path.display()
    ));

    let build: Box<dyn BuildContext> = match &opts.changed_list {
        Some(path) => Box::new(ChangedListBuildContext::create(path.clone())?),
        None => Box::new(LoggingBuildContext),
    };

    log.stage("Copying settings");
    let result = execute(&config, opts.dry_run, log, build.as_ref());
    log.print_summary();
    result?;
    Ok(())
}

/// Command-line options that override the configuration file.
fn overrides(opts: &ApplyOpts) -> Overrides {
    Overrides {
        source: opts.source.clone(),
        packagings: opts.packagings.clone(),
        fail_on_error: opts.fail_on_error,
        skip: opts.skip,
    }
}

/// Apply `config`: guard, build the resolver, copy, close.
///
/// The resolver is closed on every path once it exists.
///
/// # Errors
///
/// Returns [`SettingsError`] for an invalid source, a resolver that cannot be
/// built, invalid settings file entries, or fatal copy failures.
pub fn execute(
    config: &Config,
    dry_run: bool,
    log: &dyn Log,
    build: &dyn BuildContext,
) -> Result<ApplyStatus, SettingsError> {
    if config.skip {
        log.info("Skipping project settings configuration.");
        return Ok(ApplyStatus::Skipped);
    }
    if config.files.is_empty() {
        log.warn("No settings specified.");
        log.warn("Project not configured.");
        return Ok(ApplyStatus::NotConfigured);
    }

    let source = config.source()?;
    let mut resolver = open_resolver(&source, config, log)?;
    log.debug(&format!("Resolving file using {}", resolver.description()));

    let ctx = Context::new(
        log,
        build,
        config.project.basedir(),
        config.project.packaging(),
        dry_run,
    );
    let outcome = copy_and_close(&CopySettings::from_config(config), resolver.as_mut(), &ctx)?;

    log.info("Project configured.");
    Ok(ApplyStatus::Configured(outcome))
}

/// Run `settings` against `resolver`, then close it whatever the outcome.
///
/// A copy error takes precedence over a close error.
fn copy_and_close(
    settings: &CopySettings,
    resolver: &mut dyn ResourceResolver,
    ctx: &Context<'_>,
) -> Result<CopyOutcome, SettingsError> {
    let result = settings.run(resolver, ctx);
    let closed = resolver.close();
    let outcome = result?;
    closed?;
    Ok(outcome)
}

/// Build the resolver selected by `source`.
///
/// # Errors
///
/// Returns [`SettingsError::Resource`] if an archive cannot be opened.
pub fn open_resolver(
    source: &Source,
    config: &Config,
    log: &dyn Log,
) -> Result<Box<dyn ResourceResolver>, SettingsError> {
    match source {
        Source::Archive { prefix } => {
            let archives = collect_archives(
                &config.project,
                &config.project.plugin,
                &config.artifacts,
                log,
            );
            for archive in &archives {
                log.debug(&format!("  {}", archive.display()));
            }
            Ok(Box::new(ArchiveResourceResolver::open(
                &archives,
                Some(prefix.as_str()),
            )?))
        }
        Source::FileSystem { directory } => {
            let base = if directory.trim().is_empty() {
                config.project.basedir().to_path_buf()
            } else {
                config.resolve_path(Path::new(directory.trim()))
            };
            Ok(Box::new(FileSystemResourceResolver::try_new(base)?))
        }
    }
}
