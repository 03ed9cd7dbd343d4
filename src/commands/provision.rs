use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{Cli, VERSION};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Phase, Task};

/// Run a provisioning pass.
///
/// # Errors
///
/// Returns an error if configuration loading, context creation or task
/// ordering fails, or if any task fails.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("provision {VERSION}"));

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = CommandSetup::init(cli.config.as_deref(), executor.as_ref(), log)?;
    if cli.dry_run {
        log.info("dry run: no changes will be made");
    }

    let ctx = Context::new(
        Arc::new(setup.config),
        Arc::new(setup.platform),
        Arc::clone(log) as Arc<dyn Log>,
        cli.dry_run,
        executor,
    )?;

    let all_tasks = tasks::all_tasks(&ctx.config);
    let phases = Phase::selected(cli.install, cli.all);
    let ordered = select_tasks(&all_tasks, &phases, &cli.only, &cli.skip)?;

    super::run_tasks_to_completion(ordered, &ctx, log)
}

/// Filter `all` down to the selected phases and the `--only` / `--skip`
/// keywords, then put the survivors in dependency order.
///
/// Keywords match case-insensitively against task names. `only` wins when
/// both are given.
///
/// # Errors
///
/// Returns an error if the selected tasks contain a dependency cycle.
pub fn select_tasks<'a>(
    all: &'a [Box<dyn Task>],
    phases: &[Phase],
    only: &[String],
    skip: &[String],
) -> Result<Vec<&'a dyn Task>> {
    let selected: Vec<&dyn Task> = all
        .iter()
        .filter(|t| phases.contains(&t.phase()))
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !only.is_empty() {
                return only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            !skip.iter().any(|s| name.contains(&s.to_lowercase()))
        })
        .map(std::convert::AsRef::as_ref)
        .collect();

    let order = tasks::graph::execution_order(&selected)?;
    Ok(order
        .into_iter()
        .filter_map(|i| selected.get(i).copied())
        .collect())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::empty_config;

    fn names(tasks: &[&dyn Task]) -> Vec<String> {
        tasks.iter().map(|t| t.name().to_string()).collect()
    }

    fn config_with_tools(tools: &[&str]) -> crate::config::Config {
        let mut config = empty_config("/tmp".into());
        config.tools.enabled = tools.iter().map(|s| (*s).to_string()).collect();
        config
    }

    #[test]
    fn default_run_has_no_packages_or_tools() {
        let all = tasks::all_tasks(&config_with_tools(&["kubectl"]));
        let selected = select_tasks(&all, &Phase::selected(false, false), &[], &[]).unwrap();
        let names = names(&selected);
        assert!(!names.contains(&"Install packages".to_string()));
        assert!(!names.contains(&"Install kubectl".to_string()));
        assert_eq!(names[0], "Sync dotfiles");
    }

    #[test]
    fn install_adds_packages_before_environment() {
        let all = tasks::all_tasks(&empty_config("/tmp".into()));
        let selected = select_tasks(&all, &Phase::selected(true, false), &[], &[]).unwrap();
        let names = names(&selected);
        let packages = names.iter().position(|n| n == "Install packages").unwrap();
        let env = names
            .iter()
            .position(|n| n == "Configure environment")
            .unwrap();
        assert!(packages < env);
    }

    #[test]
    fn all_runs_tools_after_packages() {
        let all = tasks::all_tasks(&config_with_tools(&["kanata", "tpm"]));
        let selected = select_tasks(&all, &Phase::selected(false, true), &[], &[]).unwrap();
        let names = names(&selected);
        let packages = names.iter().position(|n| n == "Install packages").unwrap();
        let groups = names
            .iter()
            .position(|n| n == "Ensure group memberships")
            .unwrap();
        let kanata = names.iter().position(|n| n == "Install kanata").unwrap();
        assert!(packages < kanata);
        assert!(groups < kanata);
        assert!(names.contains(&"Install tpm".to_string()));
    }

    #[test]
    fn only_is_case_insensitive() {
        let all = tasks::all_tasks(&empty_config("/tmp".into()));
        let selected = select_tasks(
            &all,
            &Phase::selected(false, false),
            &["GIT".to_string()],
            &[],
        )
        .unwrap();
        assert_eq!(names(&selected), vec!["Configure git"]);
    }

    #[test]
    fn only_overrides_skip() {
        let all = tasks::all_tasks(&empty_config("/tmp".into()));
        let selected = select_tasks(
            &all,
            &Phase::selected(false, false),
            &["git".to_string()],
            &["git".to_string()],
        )
        .unwrap();
        assert_eq!(names(&selected), vec!["Configure git"]);
    }

    #[test]
    fn skip_removes_matching_tasks() {
        let all = tasks::all_tasks(&empty_config("/tmp".into()));
        let selected = select_tasks(
            &all,
            &Phase::selected(false, false),
            &[],
            &["dotfiles".to_string(), "workspaces".to_string()],
        )
        .unwrap();
        let names = names(&selected);
        assert!(!names.iter().any(|n| n.contains("dotfiles")));
        assert!(!names.iter().any(|n| n.contains("workspaces")));
        assert!(names.contains(&"Configure environment".to_string()));
    }

    #[test]
    fn skipping_a_dependency_keeps_the_dependent() {
        let all = tasks::all_tasks(&empty_config("/tmp".into()));
        let selected = select_tasks(
            &all,
            &Phase::selected(true, false),
            &[],
            &["dotfiles".to_string()],
        )
        .unwrap();
        assert!(names(&selected).contains(&"Install packages".to_string()));
    }
}
