//! The check-then-apply loop shared by resource-driven tasks.

use anyhow::Result;

use super::Context;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// How a task ended when it did not fail.
///
/// # Examples
///
/// ```
/// use provision_cli::tasks::TaskResult;
///
/// let skipped = TaskResult::Skipped("flatpak not installed".into());
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(TaskResult::DryRun, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Every item was brought into its desired state.
    Ok,
    /// Nothing to do on this host.
    Skipped(String),
    /// Changes were only reported.
    DryRun,
}

/// Per-item tallies for a task that walks a list of resources.
///
/// ```
/// use provision_cli::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 14, skipped: 0 };
/// assert_eq!(stats.summary(false), "1 changed, 14 already ok");
/// assert_eq!(stats.summary(true), "1 would change, 14 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Items written, installed or set.
    pub changed: u32,
    /// Items already in their desired state.
    pub already_ok: u32,
    /// Items left alone after a warning.
    pub skipped: u32,
}

impl TaskStats {
    /// Empty tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line summary such as `3 changed, 10 already ok, 1 skipped`.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let line = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped == 0 {
            return line;
        }
        format!("{line}, {} skipped", self.skipped)
    }

    /// Log the summary and turn the tallies into a [`TaskResult`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// How the processing loop reports and reacts to each item.
///
/// ```
/// use provision_cli::tasks::ProcessOpts;
///
/// let strict = ProcessOpts::new("copy");
/// assert!(strict.bail_on_error);
///
/// let lenient = ProcessOpts::new("install").no_bail();
/// assert!(!lenient.bail_on_error);
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb used in log lines ("install", "copy", "set").
    pub verb: &'a str,
    /// Stop at the first item that fails to apply. When unset the failure is
    /// logged as a warning and counted as skipped.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Apply every missing or incorrect item, stopping at the first failure.
    #[must_use]
    pub const fn new(verb: &'a str) -> Self {
        Self {
            verb,
            bail_on_error: true,
        }
    }

    /// Keep going past failed items.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }
}

/// Check each resource's state and apply the ones that need it.
///
/// # Errors
///
/// Returns an error if a state check fails, or if an item fails to apply
/// while `opts.bail_on_error` is set.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_one(ctx, &resource, current, opts)?;
    }
    Ok(stats.finish(ctx))
}

/// Like [`process_resources`], for states the caller already knows.
///
/// Packages and group memberships query their state in one batch; desktop
/// settings are written blindly.
///
/// # Errors
///
/// Returns an error if an item fails to apply while `opts.bail_on_error` is
/// set.
pub fn process_resource_states<R: Applicable>(
    ctx: &Context,
    resource_states: impl IntoIterator<Item = (R, ResourceState)>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for (resource, current) in resource_states {
        stats += process_one(ctx, &resource, current, opts)?;
    }
    Ok(stats.finish(ctx))
}

fn process_one<R: Applicable>(
    ctx: &Context,
    resource: &R,
    state: ResourceState,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
        ResourceState::Missing if ctx.dry_run => {
            ctx.log.dry_run(&format!("would {}: {desc}", opts.verb));
            delta.changed += 1;
        }
        ResourceState::Incorrect { current } if ctx.dry_run => {
            ctx.log
                .dry_run(&format!("would {} {desc} (currently {current})", opts.verb));
            delta.changed += 1;
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            delta += apply_one(ctx, resource, opts)?;
        }
    }
    Ok(delta)
}

fn apply_one<R: Applicable>(ctx: &Context, resource: &R, opts: &ProcessOpts) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    let failure = match resource.apply() {
        Ok(ResourceChange::Applied) => {
            ctx.log.debug(&format!("{}: {desc}", opts.verb));
            delta.changed += 1;
            return Ok(delta);
        }
        Ok(ResourceChange::AlreadyCorrect) => {
            delta.already_ok += 1;
            return Ok(delta);
        }
        Ok(ResourceChange::Skipped { reason }) if opts.bail_on_error => {
            anyhow::bail!("failed to {} {desc}: {reason}", opts.verb);
        }
        Err(e) if opts.bail_on_error => return Err(e),
        Ok(ResourceChange::Skipped { reason }) => reason,
        Err(e) => format!("{e:#}"),
    };
    ctx.log
        .warn(&format!("failed to {} {desc}: {failure}", opts.verb));
    delta.skipped += 1;
    Ok(delta)
}
