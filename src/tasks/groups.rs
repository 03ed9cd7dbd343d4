use anyhow::Result;

use super::{Context, Phase, Task, TaskResult, TaskStats};
use crate::resources::group::{GroupMembershipResource, current_memberships};
use crate::resources::{Applicable, ResourceState};

/// Add the invoking user to each required group.
///
/// Memberships are queried once. Groups are created first (an existing
/// group is fine), then the user is appended. Membership takes effect at the
/// next login, so it is not re-checked here.
#[derive(Debug)]
pub struct EnsureGroups;

impl Task for EnsureGroups {
    fn name(&self) -> &str {
        "Ensure group memberships"
    }

    fn phase(&self) -> Phase {
        Phase::Environment
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.groups.required.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let memberships = current_memberships(&ctx.user, ctx.executor.as_ref())?;
        let mut stats = TaskStats::new();

        for group in &ctx.config.groups.required {
            let resource =
                GroupMembershipResource::new(group.clone(), ctx.user.clone(), ctx.executor.as_ref());
            if resource.state_from_memberships(&memberships) == ResourceState::Correct {
                ctx.log.debug(&format!("ok: {}", resource.description()));
                stats.already_ok += 1;
                continue;
            }
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would add {} to {group}", ctx.user));
                stats.changed += 1;
                continue;
            }
            if let Some(warning) = resource.create_group()? {
                ctx.log.warn(&warning);
            }
            resource.apply()?;
            ctx.log.debug(&format!("added: {}", resource.description()));
            stats.changed += 1;
        }

        if stats.changed > 0 && !ctx.dry_run {
            ctx.log
                .info("group membership changed: log out and back in for it to take effect");
        }
        Ok(stats.finish(ctx))
    }
}
