//! Multi-step tool installer resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::probe::{Presence, Probe};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::wait::{PollOptions, poll_until};

/// What a single installer step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Run a program with arguments.
    Run {
        /// Program (`sudo` for privileged steps).
        program: String,
        /// Arguments.
        args: Vec<String>,
    },
    /// Run a pipeline with `sh -c` (vendor bootstrap scripts).
    Shell(String),
    /// Write `content` to `path`.
    WriteFile {
        /// Destination.
        path: PathBuf,
        /// File content.
        content: String,
        /// Write through `sudo tee` instead of directly.
        privileged: bool,
    },
    /// Fetch `url` into a fresh `<dest>.part`, wait for it to appear, then
    /// move it to `dest`. An interrupted fetch never leaves a file at `dest`.
    Download {
        /// Source URL.
        url: String,
        /// Destination file.
        dest: PathBuf,
    },
}

impl StepAction {
    /// Shorthand for [`StepAction::Run`].
    #[must_use]
    pub fn run(program: &str, args: &[&str]) -> Self {
        Self::Run {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Shorthand for a `sudo` [`StepAction::Run`].
    #[must_use]
    pub fn sudo(args: &[&str]) -> Self {
        Self::run("sudo", args)
    }
}

/// One independently re-checkable installer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Human-readable summary.
    pub description: String,
    /// When present, the step is skipped.
    pub probe: Probe,
    /// The work to perform.
    pub action: StepAction,
}

impl Step {
    /// Create a step.
    #[must_use]
    pub fn new(description: impl Into<String>, probe: Probe, action: StepAction) -> Self {
        Self {
            description: description.into(),
            probe,
            action,
        }
    }
}

/// A named tool: a final marker probe plus the ordered steps that satisfy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstaller {
    /// Tool name as used in `[tools].enabled`.
    pub name: String,
    /// Present once the tool is fully installed.
    pub marker: Probe,
    /// Ordered steps.
    pub steps: Vec<Step>,
}

/// Outcome of [`ToolResource::apply_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step's probe was already satisfied.
    Satisfied,
    /// The step's action ran successfully.
    Ran,
    /// The probe could not be evaluated, so the action ran anyway and
    /// succeeded. Carries the reason the probe was inconclusive.
    RanAfterUnknown(String),
}

/// Installs a [`ToolInstaller`] through an [`Executor`].
#[derive(Debug)]
pub struct ToolResource<'a> {
    /// The installer definition.
    pub installer: &'a ToolInstaller,
    executor: &'a dyn Executor,
    poll: PollOptions,
}

impl<'a> ToolResource<'a> {
    /// Create a new tool resource.
    #[must_use]
    pub const fn new(
        installer: &'a ToolInstaller,
        executor: &'a dyn Executor,
        poll: PollOptions,
    ) -> Self {
        Self {
            installer,
            executor,
            poll,
        }
    }

    /// Check a step's probe and run its action when the probe is not present.
    ///
    /// # Errors
    ///
    /// Returns an error if the action's command fails, a file cannot be
    /// written, or a download does not appear before the timeout.
    pub fn apply_step(&self, step: &Step) -> Result<StepOutcome> {
        let outcome = match step.probe.evaluate(self.executor) {
            Presence::Present => return Ok(StepOutcome::Satisfied),
            Presence::Absent => StepOutcome::Ran,
            Presence::Unknown(reason) => StepOutcome::RanAfterUnknown(reason),
        };
        self.run_action(&step.action)
            .with_context(|| format!("{}: {}", self.installer.name, step.description))?;
        Ok(outcome)
    }

    fn run_action(&self, action: &StepAction) -> Result<()> {
        match action {
            StepAction::Run { program, args } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                self.executor.run(program, &args)?;
            }
            StepAction::Shell(script) => {
                self.executor.run("sh", &["-c", script])?;
            }
            StepAction::WriteFile {
                path,
                content,
                privileged: true,
            } => {
                let path_str = path.to_string_lossy();
                if let Some(parent) = path.parent() {
                    self.executor
                        .run("sudo", &["mkdir", "-p", &parent.to_string_lossy()])?;
                }
                self.executor
                    .run_with_input("sudo", &["tee", &path_str], content)?;
            }
            StepAction::WriteFile {
                path,
                content,
                privileged: false,
            } => {
                super::fs::ensure_parent_dir(path)?;
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            StepAction::Download { url, dest } => {
                let partial = partial_path(dest);
                if let Err(e) = std::fs::remove_file(&partial)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    return Err(e)
                        .with_context(|| format!("removing stale {}", partial.display()));
                }
                let partial_str = partial.to_string_lossy();
                if self.executor.which("curl") {
                    self.executor
                        .run("curl", &["-fsSL", "-o", &partial_str, url])?;
                } else {
                    self.executor
                        .run("wget", &["-q", "-O", &partial_str, url])?;
                }
                poll_until(&partial_str, self.poll, || partial.exists())?;
                std::fs::rename(&partial, dest).with_context(|| {
                    format!("moving {} to {}", partial.display(), dest.display())
                })?;
            }
        }
        Ok(())
    }
}

/// `<dest>.part`, where a download lands until it is complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

impl Applicable for ToolResource<'_> {
    fn description(&self) -> String {
        self.installer.name.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        for step in &self.installer.steps {
            self.apply_step(step)?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ToolResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        match self.installer.marker.evaluate(self.executor) {
            Presence::Present => Ok(ResourceState::Correct),
            Presence::Absent => Ok(ResourceState::Missing),
            Presence::Unknown(reason) => Ok(ResourceState::Incorrect {
                current: format!("marker check inconclusive ({reason})"),
            }),
        }
    }
}
