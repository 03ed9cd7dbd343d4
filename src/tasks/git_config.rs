use anyhow::Result;

use super::{Context, Phase, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::git_config::GitConfigResource;

/// Set the Git identity and configured global settings.
#[derive(Debug)]
pub struct ConfigureGit;

impl Task for ConfigureGit {
    fn name(&self) -> &str {
        "Configure git"
    }

    fn phase(&self) -> Phase {
        Phase::Environment
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.git.entries().is_empty() && ctx.executor.which("git")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resources = ctx
            .config
            .git
            .entries()
            .into_iter()
            .map(|(key, value)| GitConfigResource::new(key, value, ctx.executor.as_ref()));
        process_resources(ctx, resources, &ProcessOpts::new("set"))
    }
}
