//! Tracing layers: coloured console lines and the plain-text log file.
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{Level, Metadata};

/// Target of section headers.
pub(super) const STAGE: &str = "provision::stage";
/// Target of dry-run change reports.
pub(super) const DRY_RUN: &str = "provision::dry_run";

/// How a line is decorated, derived from an event's level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE) => Self::Stage,
            (Level::INFO, DRY_RUN) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }

    fn file(self, msg: &str) -> String {
        let tag = match self {
            Self::Stage => return format!("==> {msg}"),
            Self::Info => return format!("    {msg}"),
            Self::DryRun => "[dry run]",
            Self::Error => "[error]",
            Self::Warn => "[warn]",
            Self::Debug => "[debug]",
        };
        format!("    {tag} {msg}")
    }
}

/// Pulls the `message` field out of an event.
#[derive(Default)]
struct Message(String);

impl tracing::field::Visit for Message {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

fn message(event: &tracing::Event<'_>) -> String {
    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// Remove CSI escape sequences (colours, cursor movement).
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
        } else if chars.next() == Some('[') {
            for end in chars.by_ref() {
                if ('@'..='~').contains(&end) {
                    break;
                }
            }
        }
    }
    out
}

/// `$XDG_CACHE_HOME/provision/<command>.log`, falling back to
/// `~/.cache/provision/`. Creates the directory.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME").map_or_else(
        || {
            std::env::var_os("HOME")
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    let dir = cache.join("provision");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Appends every event to the log file, timestamped and without colour.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command` and write the run header.
    ///
    /// `None` when the file cannot be created; the run then logs to the
    /// console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let rule = "=".repeat(42);
        let header = format!(
            "{rule}\nprovision {} {}\n{rule}\n",
            crate::cli::VERSION,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        let line = Kind::of(event.metadata()).file(&strip_ansi(&message(event)));
        let ts = chrono::Utc::now().format("%H:%M:%S");
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{ts}] {line}").ok();
        }
    }
}

struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", Kind::of(event.metadata()).console(&message(event)))
    }
}

/// Install the global subscriber. Call once, before anything logs.
///
/// The console shows `info` and above (`debug` with `verbose`; `RUST_LOG`
/// overrides both), warnings and errors on stderr. The log file always
/// records `debug` and above.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::WARN)
                .and(std::io::stdout.with_min_level(Level::INFO)),
        )
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        );
    let file = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
