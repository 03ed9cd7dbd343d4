use std::any::TypeId;

use anyhow::Result;

use super::{Context, Phase, Task, TaskResult};
use crate::resources::{Resource as _, ResourceState};
use crate::resources::tool::{StepOutcome, ToolResource};

const DEPS: &[TypeId] = &[TypeId::of::<super::packages::InstallPackages>()];

// kanata's udev rule grants access through the uinput group.
const KANATA_DEPS: &[TypeId] = &[
    TypeId::of::<super::packages::InstallPackages>(),
    TypeId::of::<super::groups::EnsureGroups>(),
];

/// Install one optional tool from the catalogue.
///
/// A present marker means zero work. Otherwise each step runs unless its own
/// probe is already satisfied, so a rerun after a failure resumes where the
/// previous run stopped.
#[derive(Debug)]
pub struct InstallTool {
    tool: &'static str,
    label: String,
}

impl InstallTool {
    /// Task for the catalogue entry `tool`.
    #[must_use]
    pub fn new(tool: &'static str) -> Self {
        Self {
            tool,
            label: format!("Install {tool}"),
        }
    }
}

impl Task for InstallTool {
    fn name(&self) -> &str {
        &self.label
    }

    fn phase(&self) -> Phase {
        Phase::Tools
    }

    fn dependencies(&self) -> &[TypeId] {
        if self.tool == "kanata" {
            KANATA_DEPS
        } else {
            DEPS
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.packages.manager.resolve(&ctx.platform).is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(manager) = ctx.config.packages.manager.resolve(&ctx.platform) else {
            return Ok(TaskResult::Skipped("no system package manager".to_string()));
        };
        let Some(installer) = crate::tools::installer(self.tool, manager, &ctx.home) else {
            return Ok(TaskResult::Skipped(format!(
                "{} has no installer for {manager}",
                self.tool
            )));
        };
        let resource = ToolResource::new(
            &installer,
            ctx.executor.as_ref(),
            ctx.config.tools.poll_options(),
        );

        match resource.current_state()? {
            ResourceState::Correct => {
                ctx.log.info(&format!("{} already installed", self.tool));
                return Ok(TaskResult::Ok);
            }
            ResourceState::Incorrect { current } => {
                ctx.log
                    .warn(&format!("{}: {current}, installing anyway", self.tool));
            }
            ResourceState::Missing | ResourceState::Invalid { .. } => {}
        }

        if ctx.dry_run {
            for step in &installer.steps {
                if step.probe.evaluate(ctx.executor.as_ref()).needs_work() {
                    ctx.log.dry_run(&format!("would {}", step.description));
                }
            }
            return Ok(TaskResult::DryRun);
        }

        for step in &installer.steps {
            match resource.apply_step(step)? {
                StepOutcome::Satisfied => ctx.log.debug(&format!("ok: {}", step.description)),
                StepOutcome::Ran => ctx.log.info(&step.description),
                StepOutcome::RanAfterUnknown(reason) => ctx.log.warn(&format!(
                    "{}: could not check {} ({reason}), ran it anyway",
                    self.tool, step.description
                )),
            }
        }
        ctx.log.info(&format!("{} installed", self.tool));
        Ok(TaskResult::Ok)
    }
}
