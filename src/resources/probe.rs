//! Presence probes.
//!
//! A probe answers "is this already done?" without changing anything. The
//! answer is three-valued: a probe whose command could not even be spawned
//! (or was killed by a signal) is [`Presence::Unknown`], never silently
//! "absent".
use std::path::PathBuf;

use crate::exec::Executor;

/// Result of evaluating a [`Probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// The thing probed for exists.
    Present,
    /// The thing probed for does not exist.
    Absent,
    /// The probe could not reach a verdict.
    Unknown(String),
}

impl Presence {
    /// Whether the guarded work should run. `Unknown` counts as absent.
    #[must_use]
    pub const fn needs_work(&self) -> bool {
        !matches!(self, Self::Present)
    }
}

/// A side-effect-free check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// A filesystem path exists.
    PathExists(PathBuf),
    /// A program is on `PATH`.
    OnPath(String),
    /// A command exits zero.
    CommandSucceeds {
        /// Program to run.
        program: String,
        /// Arguments.
        args: Vec<String>,
    },
    /// Never satisfied; the guarded step always runs.
    Always,
}

impl Probe {
    /// Convenience constructor for [`Probe::CommandSucceeds`].
    #[must_use]
    pub fn command(program: &str, args: &[&str]) -> Self {
        Self::CommandSucceeds {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Evaluate the probe.
    ///
    /// Command probes are judged solely by the exit code: zero is present,
    /// any other code is absent, no code at all is unknown.
    #[must_use]
    pub fn evaluate(&self, executor: &dyn Executor) -> Presence {
        match self {
            Self::PathExists(path) => match path.try_exists() {
                Ok(true) => Presence::Present,
                Ok(false) => Presence::Absent,
                Err(e) => Presence::Unknown(format!("cannot stat {}: {e}", path.display())),
            },
            Self::OnPath(program) => {
                if executor.which(program) {
                    Presence::Present
                } else {
                    Presence::Absent
                }
            }
            Self::CommandSucceeds { program, args } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                match executor.run_unchecked(program, &args) {
                    Ok(result) => match result.code {
                        Some(0) => Presence::Present,
                        Some(_) => Presence::Absent,
                        None => Presence::Unknown(format!("{program} was terminated by a signal")),
                    },
                    Err(e) => Presence::Unknown(format!("{e:#}")),
                }
            }
            Self::Always => Presence::Absent,
        }
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathExists(path) => write!(f, "{} exists", path.display()),
            Self::OnPath(program) => write!(f, "{program} on PATH"),
            Self::CommandSucceeds { program, args } => {
                write!(f, "`{program} {}` succeeds", args.join(" "))
            }
            Self::Always => write!(f, "always"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::RecordingExecutor;

    #[test]
    fn path_exists_probe() {
        let dir = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new();
        assert_eq!(
            Probe::PathExists(dir.path().to_path_buf()).evaluate(&executor),
            Presence::Present
        );
        assert_eq!(
            Probe::PathExists(dir.path().join("docker-desktop")).evaluate(&executor),
            Presence::Absent
        );
    }

    #[test]
    fn on_path_probe_uses_which() {
        let executor = RecordingExecutor::new().with_program("kubectl");
        assert_eq!(
            Probe::OnPath("kubectl".into()).evaluate(&executor),
            Presence::Present
        );
        assert_eq!(
            Probe::OnPath("az".into()).evaluate(&executor),
            Presence::Absent
        );
    }

    #[test]
    fn command_probe_is_judged_by_exit_code() {
        let executor = RecordingExecutor::new().fail("lsmod", 1, "");
        assert_eq!(
            Probe::command("lsmod", &[]).evaluate(&executor),
            Presence::Absent
        );
        let executor = RecordingExecutor::new();
        assert_eq!(
            Probe::command("systemctl", &["--user", "is-enabled", "kanata"]).evaluate(&executor),
            Presence::Present
        );
    }

    #[test]
    fn unknown_counts_as_needing_work() {
        assert!(Presence::Unknown("spawn failed".into()).needs_work());
        assert!(Presence::Absent.needs_work());
        assert!(!Presence::Present.needs_work());
    }

    #[test]
    fn always_probe_is_never_satisfied() {
        let executor = RecordingExecutor::new();
        assert_eq!(Probe::Always.evaluate(&executor), Presence::Absent);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Probe::OnPath("code".into()).to_string(), "code on PATH");
        assert_eq!(
            Probe::command("modinfo", &["uinput"]).to_string(),
            "`modinfo uinput` succeeds"
        );
    }
}
