//! Named, dependency-ordered tasks that orchestrate resource changes.
mod context;
pub mod desktop;
pub mod dotfiles;
pub mod environment;
pub mod git_config;
pub mod graph;
pub mod groups;
pub mod packages;
mod processing;
pub mod tools;

/// Implement [`Task::dependencies`] by expanding to the required
/// `fn dependencies(&self) -> &[TypeId]` method body.
///
/// The `const DEPS` intermediate gives the slice the `'static` lifetime the
/// return type requires.
///
/// # Examples
///
/// ```ignore
/// task_deps![super::dotfiles::SyncDotfiles]
/// // expands to:
/// //   fn dependencies(&self) -> &[std::any::TypeId] {
/// //       const DEPS: &[std::any::TypeId] = &[
/// //           std::any::TypeId::of::<super::dotfiles::SyncDotfiles>(),
/// //       ];
/// //       DEPS
/// //   }
/// ```
macro_rules! task_deps {
    [$($dep:ty),+ $(,)?] => {
        fn dependencies(&self) -> &[std::any::TypeId] {
            const DEPS: &[std::any::TypeId] = &[$(std::any::TypeId::of::<$dep>()),+];
            DEPS
        }
    };
}

pub(crate) use task_deps;

pub use context::Context;
pub use processing::{
    ProcessOpts, TaskResult, TaskStats, process_resource_states, process_resources,
};

use std::any::TypeId;

use anyhow::Result;

use crate::config::Config;
use crate::logging::TaskStatus;

/// Flag-gated stage of a run. Every task belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Copy dotfiles into place.
    Files,
    /// Install system, Flatpak and Snap packages.
    Packages,
    /// Shell environment, Git, groups and desktop settings.
    Environment,
    /// Optional third-party tool installers.
    Tools,
}

impl Phase {
    /// Phases selected by the `--install` / `--all` flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use provision_cli::tasks::Phase;
    ///
    /// assert_eq!(Phase::selected(false, false), vec![Phase::Files, Phase::Environment]);
    /// assert!(Phase::selected(true, false).contains(&Phase::Packages));
    /// assert!(Phase::selected(false, true).contains(&Phase::Tools));
    /// ```
    #[must_use]
    pub fn selected(install: bool, all: bool) -> Vec<Self> {
        let mut phases = vec![Self::Files];
        if install || all {
            phases.push(Self::Packages);
        }
        phases.push(Self::Environment);
        if all {
            phases.push(Self::Tools);
        }
        phases
    }
}

/// A named, executable task.
///
/// The `'static` bound gives each task struct a stable [`TypeId`], which
/// ordering uses to match dependency declarations.
pub trait Task: Send + Sync + 'static {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Phase this task belongs to.
    fn phase(&self) -> Phase;

    /// The concrete `TypeId` of this task, used as a dependency identifier.
    fn task_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Tasks that must complete before this task starts.
    ///
    /// Dependencies on tasks that are not part of the run are ignored.
    fn dependencies(&self) -> &[TypeId] {
        &[]
    }

    /// Whether this task applies to the current host and configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails, such as when a package query or
    /// a tool installation step fails.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Every task the configuration asks for, across all phases.
///
/// Order within the list is the tie-breaker for independent tasks; the
/// actual execution order comes from [`graph::execution_order`]. Tool tasks
/// follow the catalogue order, one per enabled known tool.
#[must_use]
pub fn all_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = vec![
        Box::new(dotfiles::SyncDotfiles),
        Box::new(packages::InstallPackages),
        Box::new(environment::ConfigureEnvironment),
        Box::new(git_config::ConfigureGit),
        Box::new(groups::EnsureGroups),
        Box::new(desktop::ConfigureWorkspaces),
    ];
    tasks.extend(
        crate::tools::TOOL_NAMES
            .iter()
            .filter(|name| config.tools.enabled.iter().any(|e| e == *name))
            .map(|name| Box::new(tools::InstallTool::new(name)) as Box<dyn Task>),
    );
    tasks
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_helpers::{empty_config, make_static_context};

    /// A mock task for testing `execute()`.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn phase(&self) -> Phase {
            Phase::Environment
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn status_of(log: &crate::logging::Logger, name: &str) -> TaskStatus {
        log.task_entries()
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.status)
            .unwrap()
    }

    #[test]
    fn execute_skips_non_applicable_task() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "test-task",
            should_run: false,
            result: Ok(TaskResult::Ok),
        };

        execute(&task, &ctx);
        assert_eq!(log.failure_count(), 0);
        assert_eq!(status_of(&log, "test-task"), TaskStatus::NotApplicable);
    }

    #[test]
    fn execute_records_ok_task() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "ok-task",
            should_run: true,
            result: Ok(TaskResult::Ok),
        };

        execute(&task, &ctx);
        assert_eq!(status_of(&log, "ok-task"), TaskStatus::Ok);
    }

    #[test]
    fn execute_records_failed_task() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "fail-task",
            should_run: true,
            result: Err("kaboom".to_string()),
        };

        execute(&task, &ctx);
        assert_eq!(log.failure_count(), 1);
    }

    #[test]
    fn execute_records_skipped_task() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "skip-task",
            should_run: true,
            result: Ok(TaskResult::Skipped("not needed".to_string())),
        };

        execute(&task, &ctx);
        assert_eq!(log.failure_count(), 0);
        assert_eq!(status_of(&log, "skip-task"), TaskStatus::Skipped);
    }

    #[test]
    fn execute_records_dry_run_task() {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "dry-task",
            should_run: true,
            result: Ok(TaskResult::DryRun),
        };

        execute(&task, &ctx);
        assert_eq!(status_of(&log, "dry-task"), TaskStatus::DryRun);
    }

    #[test]
    fn all_tasks_without_tools_has_fixed_set() {
        let tasks = all_tasks(&empty_config(PathBuf::from("/tmp")));
        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "Sync dotfiles",
                "Install packages",
                "Configure environment",
                "Configure git",
                "Ensure group memberships",
                "Configure workspaces",
            ]
        );
    }

    #[test]
    fn all_tasks_adds_enabled_tools_in_catalogue_order() {
        let mut config = empty_config(PathBuf::from("/tmp"));
        config.tools.enabled = vec!["tpm".into(), "kubectl".into(), "no-such-tool".into()];
        let tasks = all_tasks(&config);
        let tools: Vec<&str> = tasks
            .iter()
            .filter(|t| t.phase() == Phase::Tools)
            .map(|t| t.name())
            .collect();
        assert_eq!(tools, vec!["Install kubectl", "Install tpm"]);
    }

    #[test]
    fn default_phases_exclude_packages_and_tools() {
        let phases = Phase::selected(false, false);
        assert!(!phases.contains(&Phase::Packages));
        assert!(!phases.contains(&Phase::Tools));
    }

    #[test]
    fn all_flag_selects_every_phase() {
        assert_eq!(
            Phase::selected(false, true),
            vec![
                Phase::Files,
                Phase::Packages,
                Phase::Environment,
                Phase::Tools
            ]
        );
    }
}
