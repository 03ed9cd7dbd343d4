use std::collections::HashSet;

use anyhow::Result;

use super::{Context, Phase, ProcessOpts, Task, TaskResult, process_resource_states};
use crate::resources::package::{
    PackageManager, PackageResource, get_installed_packages, missing_packages,
};

/// Process one manager's package list using batch-checked installed state.
///
/// Queries installed packages **once**, then installs each missing package
/// with its own command. A failed install is warned about and the next
/// package is attempted.
///
/// # Errors
///
/// Returns an error if the installed-package query fails.
fn process_packages(
    ctx: &Context,
    manager: PackageManager,
    desired: &[String],
) -> Result<TaskResult> {
    let installed = get_installed_packages(manager, ctx.executor.as_ref())?;
    let missing = missing_packages(desired, &installed);
    ctx.log.debug(&format!(
        "{manager}: {} installed, {} of {} desired missing",
        installed.len(),
        missing.len(),
        desired.len()
    ));

    let mut seen = HashSet::new();
    let resource_states = desired
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| {
            let resource = PackageResource::new(name.clone(), manager, ctx.executor.as_ref());
            let state = resource.state_from_installed(&installed);
            (resource, state)
        });

    process_resource_states(ctx, resource_states, &ProcessOpts::new("install").no_bail())
}

/// Install system, Flatpak and Snap packages.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &str {
        "Install packages"
    }

    fn phase(&self) -> Phase {
        Phase::Packages
    }

    super::task_deps![super::dotfiles::SyncDotfiles];

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.by_manager(&ctx.platform).is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut processed = 0u32;
        for (manager, desired) in ctx.config.packages.by_manager(&ctx.platform) {
            if matches!(manager, PackageManager::Flatpak | PackageManager::Snap)
                && !ctx.executor.which(&manager.to_string())
            {
                ctx.log.warn(&format!(
                    "{manager} not found, skipping {} package(s)",
                    desired.len()
                ));
                continue;
            }
            ctx.log
                .info(&format!("{manager}: {} package(s) configured", desired.len()));
            process_packages(ctx, manager, desired)?;
            processed += 1;
        }

        if processed == 0 {
            return Ok(TaskResult::Skipped("no package manager available".to_string()));
        }
        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }
}
