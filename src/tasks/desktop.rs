use anyhow::Result;

use super::{Context, Phase, ProcessOpts, Task, TaskResult, process_resource_states};
use crate::config::desktop::WORKSPACE_RANGE;
use crate::error::ConfigError;
use crate::resources::ResourceState;
use crate::resources::gsettings::{GsettingsResource, workspace_layout};

/// Fixed workspace count with `<modifier>N` / `<modifier><Shift>N` bindings.
///
/// Writes are blind: nothing is read back from the settings store.
#[derive(Debug)]
pub struct ConfigureWorkspaces;

impl Task for ConfigureWorkspaces {
    fn name(&self) -> &str {
        "Configure workspaces"
    }

    fn phase(&self) -> Phase {
        Phase::Environment
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.executor.which("gsettings")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let desktop = &ctx.config.desktop;
        if !desktop.workspaces_in_range() {
            return Err(ConfigError::InvalidValue {
                key: "desktop.workspaces".to_string(),
                reason: format!(
                    "{} is outside {}..={}",
                    desktop.workspaces,
                    WORKSPACE_RANGE.start(),
                    WORKSPACE_RANGE.end()
                ),
            }
            .into());
        }

        let resource_states = workspace_layout(desktop.workspaces, &desktop.modifier)
            .into_iter()
            .map(|entry| {
                (
                    GsettingsResource::new(entry, ctx.executor.as_ref()),
                    ResourceState::Missing,
                )
            });
        process_resource_states(ctx, resource_states, &ProcessOpts::new("set"))
    }
}
