//! Console and log-file output for a provisioning run, plus the per-task
//! results printed in the closing summary.
//!
//! Messages go through [`tracing`]. [`init_subscriber`] installs a console
//! layer and a layer that appends every event, debug included, to
//! `$XDG_CACHE_HOME/provision/<command>.log`.

mod logger;
mod output;

pub use logger::Logger;
pub use output::init_subscriber;

/// One line of the closing summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name, e.g. `Install packages`.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or error text.
    pub message: Option<String>,
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Ran to completion.
    Ok,
    /// `should_run` returned false for this host.
    NotApplicable,
    /// Ran but found nothing to do (no package manager, empty list).
    Skipped,
    /// Only reported what it would change.
    DryRun,
    /// Returned an error.
    Failed,
}

impl TaskStatus {
    /// Summary glyph and its ANSI colour.
    #[must_use]
    pub const fn glyph(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::NotApplicable => ("·", "\x1b[2m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// Where tasks and resources send their messages.
///
/// [`Logger`] is the real implementation; tests substitute a capturing one.
pub trait Log: Send + Sync {
    /// Section header, e.g. `Sync dotfiles`.
    fn stage(&self, msg: &str);
    /// Progress line.
    fn info(&self, msg: &str);
    /// Detail shown on the console only with `--verbose`.
    fn debug(&self, msg: &str);
    /// Something was skipped or inconclusive.
    fn warn(&self, msg: &str);
    /// Something failed.
    fn error(&self, msg: &str);
    /// A change a dry run would have made.
    fn dry_run(&self, msg: &str);
    /// Record how a task ended for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

/// Serializes `XDG_CACHE_HOME` changes across test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// A [`Logger`] whose events reach a log file under a fresh cache directory.
///
/// The file layer is installed as this thread's default subscriber for as
/// long as the returned guard lives.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let cache = tempfile::tempdir().expect("create cache dir");
    let (layer, log) = {
        let _env = TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: TEST_ENV_MUTEX is held until the variable is removed again.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("XDG_CACHE_HOME", cache.path());
        }
        let layer = output::FileLayer::new("test").expect("open log file");
        let log = Logger::new("test");
        // SAFETY: as above.
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("XDG_CACHE_HOME");
        }
        (layer, log)
    };
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, cache, guard)
}
