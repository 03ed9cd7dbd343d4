use anyhow::Result;

use super::{Context, Phase, ProcessOpts, Task, TaskResult, process_resources};
use crate::config::expand_path;
use crate::resources::env_var::ShellExportResource;

/// Export `EDITOR` from the shell rc file.
///
/// Runs after dotfile sync, which would otherwise overwrite the rc file.
#[derive(Debug)]
pub struct ConfigureEnvironment;

impl Task for ConfigureEnvironment {
    fn name(&self) -> &str {
        "Configure environment"
    }

    fn phase(&self) -> Phase {
        Phase::Environment
    }

    super::task_deps![super::dotfiles::SyncDotfiles];

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.environment.editor.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let env = &ctx.config.environment;
        let Some(editor) = env.editor.as_deref() else {
            return Ok(TaskResult::Skipped("no editor configured".to_string()));
        };
        let rc_file = expand_path(&env.rc_file, &ctx.home, "environment.rc_file")?;
        let resource = ShellExportResource::new(rc_file, "EDITOR".to_string(), editor.to_string());
        process_resources(ctx, [resource], &ProcessOpts::new("set"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{empty_config, make_context};

    fn context_for(home: &std::path::Path, editor: Option<&str>) -> Context {
        let mut config = empty_config("/tmp".into());
        config.environment.editor = editor.map(str::to_string);
        let mut ctx = make_context(config);
        ctx.home = home.to_path_buf();
        ctx
    }

    #[test]
    fn should_run_false_without_editor() {
        let home = tempfile::tempdir().unwrap();
        assert!(!ConfigureEnvironment.should_run(&context_for(home.path(), None)));
    }

    #[test]
    fn appends_export_to_rc_file() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".bashrc"), "alias ll='ls -l'\n").unwrap();
        let ctx = context_for(home.path(), Some("nvim"));

        ConfigureEnvironment.run(&ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(home.path().join(".bashrc")).unwrap(),
            "alias ll='ls -l'\nexport EDITOR=nvim\n"
        );
    }

    #[test]
    fn running_twice_leaves_single_export() {
        let home = tempfile::tempdir().unwrap();
        let ctx = context_for(home.path(), Some("nvim"));

        ConfigureEnvironment.run(&ctx).unwrap();
        ConfigureEnvironment.run(&ctx).unwrap();

        let content = std::fs::read_to_string(home.path().join(".bashrc")).unwrap();
        assert_eq!(content.matches("export EDITOR=").count(), 1);
    }

    #[test]
    fn replaces_previous_editor() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".bashrc"), "export EDITOR=vim\n").unwrap();
        let ctx = context_for(home.path(), Some("nvim"));

        ConfigureEnvironment.run(&ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(home.path().join(".bashrc")).unwrap(),
            "export EDITOR=nvim\n"
        );
    }
}
