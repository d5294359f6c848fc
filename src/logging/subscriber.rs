//! Tracing subscriber: line rendering, log file layer, and initialisation.
//!
//! Every event is classified once into a [`Line`], which renders itself
//! either with colours for the console or as plain text for the log file.
//! Summary rows carry their [`FileStatus`] in a `status` field, so colour is
//! chosen here and never embedded in messages.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use super::types::FileStatus;
use super::utils::{HEADER_TIME, LINE_TIME, log_file_path, utc_now};

/// Target of stage headers.
pub(super) const STAGE_TARGET: &str = "project_settings::stage";

/// Target of dry-run messages.
pub(super) const DRY_RUN_TARGET: &str = "project_settings::dry_run";

/// The fields this crate puts on events.
#[derive(Default)]
struct EventFields {
    message: String,
    status: Option<FileStatus>,
}

impl tracing::field::Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "status" => self.status = FileStatus::from_label(value),
            _ => {}
        }
    }
}

/// One rendered event.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Stage(String),
    DryRun(String),
    File(FileStatus, String),
    Error(String),
    Warn(String),
    Info(String),
    Debug(String),
}

impl Line {
    fn from_event(event: &tracing::Event<'_>) -> Self {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        let metadata = event.metadata();
        Self::classify(*metadata.level(), metadata.target(), fields)
    }

    fn classify(level: Level, target: &str, fields: EventFields) -> Self {
        let EventFields { message, status } = fields;
        match (level, target, status) {
            (Level::ERROR, ..) => Self::Error(message),
            (Level::WARN, ..) => Self::Warn(message),
            (Level::INFO, STAGE_TARGET, _) => Self::Stage(message),
            (Level::INFO, DRY_RUN_TARGET, _) => Self::DryRun(message),
            (Level::INFO, _, Some(status)) => Self::File(status, message),
            (Level::INFO, ..) => Self::Info(message),
            _ => Self::Debug(message),
        }
    }

    fn console(&self) -> String {
        match self {
            Self::Stage(m) => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{m}\x1b[0m"),
            Self::DryRun(m) => format!("  \x1b[33m[DRY RUN]\x1b[0m {m}"),
            Self::File(status, m) => {
                let (icon, colour) = status_style(*status);
                format!("  {colour}{icon} {m}\x1b[0m")
            }
            Self::Error(m) => format!("\x1b[31mERROR\x1b[0m {m}"),
            Self::Warn(m) => format!("\x1b[33mWARN\x1b[0m  {m}"),
            Self::Info(m) => format!("  {m}"),
            Self::Debug(m) => format!("  \x1b[2m{m}\x1b[0m"),
        }
    }

    fn plain(&self) -> String {
        match self {
            Self::Stage(m) => format!("==> {m}"),
            Self::DryRun(m) => format!("    [dry run] {m}"),
            Self::File(status, m) => format!("    {} {m}", status_style(*status).0),
            Self::Error(m) => format!("    [error] {m}"),
            Self::Warn(m) => format!("    [warn] {m}"),
            Self::Info(m) => format!("    {m}"),
            Self::Debug(m) => format!("    [debug] {m}"),
        }
    }
}

/// Summary icon and ANSI colour for a file status.
const fn status_style(status: FileStatus) -> (&'static str, &'static str) {
    match status {
        FileStatus::Copied => ("✓", "\x1b[32m"),
        FileStatus::Filtered => ("·", "\x1b[2m"),
        FileStatus::Skipped | FileStatus::Ignored => ("○", "\x1b[33m"),
        FileStatus::DryRun => ("~", "\x1b[37m"),
        FileStatus::Failed => ("✗", "\x1b[31m"),
    }
}

/// A [`tracing_subscriber::Layer`] appending every event to the log file.
///
/// Always captures `DEBUG` and above regardless of console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create the log file for `command` (and its directory), write a header
    /// line and return a layer appending to it.
    ///
    /// Returns `None` if the file cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command);
        fs::create_dir_all(path.parent().unwrap_or_else(|| Path::new("."))).ok()?;
        let version = option_env!("PROJECT_SETTINGS_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# project-settings {version} {command} {} UTC\n",
            utc_now(HEADER_TIME)
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = Line::from_event(event).plain();
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", utc_now(LINE_TIME)).ok();
        }
    }
}

/// Console formatter rendering [`Line::console`].
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", Line::from_event(event).console())
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; `verbose`
/// lets debug lines through to the console.  The log file always gets
/// everything.  Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    // `try_init` so a second call keeps the first subscriber.
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();
}
