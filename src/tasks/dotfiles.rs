use anyhow::Result;

use super::{Context, Phase, ProcessOpts, Task, TaskResult, process_resources};
use crate::config::expand_path;
use crate::resources::dotfile::CopyResource;

/// Copy dotfiles and config directories from the repository into `$HOME`.
///
/// Targets are overwritten unconditionally; a missing source is warned about
/// and leaves its target untouched.
#[derive(Debug)]
pub struct SyncDotfiles;

impl Task for SyncDotfiles {
    fn name(&self) -> &str {
        "Sync dotfiles"
    }

    fn phase(&self) -> Phase {
        Phase::Files
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.dotfiles.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resources = ctx
            .config
            .dotfiles
            .iter()
            .map(|d| {
                let target = expand_path(&d.target, &ctx.home, "dotfiles.target")?;
                Ok(CopyResource::new(d.source_path(ctx.root()), target))
            })
            .collect::<Result<Vec<_>>>()?;
        process_resources(ctx, resources, &ProcessOpts::new("copy"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::dotfiles::Dotfile;
    use crate::resources::test_helpers::RecordingExecutor;
    use crate::tasks::test_helpers::{empty_config, make_context, make_recording_context};
    use std::sync::Arc;

    fn dotfile(source: &str, target: &str) -> Dotfile {
        Dotfile {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn should_run_false_without_dotfiles() {
        let ctx = make_context(empty_config("/tmp".into()));
        assert!(!SyncDotfiles.should_run(&ctx));
    }

    #[test]
    fn copies_file_and_directory_into_home() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join(".bashrc"), "alias ll='ls -l'\n").unwrap();
        std::fs::create_dir_all(repo.path().join("nvim/lua")).unwrap();
        std::fs::write(repo.path().join("nvim/init.lua"), "require('core')\n").unwrap();
        std::fs::write(repo.path().join("nvim/lua/core.lua"), "-- core\n").unwrap();

        let mut config = empty_config(repo.path().to_path_buf());
        config.dotfiles = vec![
            dotfile(".bashrc", "~/.bashrc"),
            dotfile("nvim", "~/.config/nvim"),
        ];
        let mut ctx = make_context(config);
        ctx.home = home.path().to_path_buf();

        let result = SyncDotfiles.run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::Ok));
        assert_eq!(
            std::fs::read_to_string(home.path().join(".bashrc")).unwrap(),
            "alias ll='ls -l'\n"
        );
        assert_eq!(
            std::fs::read_to_string(home.path().join(".config/nvim/lua/core.lua")).unwrap(),
            "-- core\n"
        );
    }

    #[test]
    fn rerun_overwrites_local_edits() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join(".ascii-art"), "v2\n").unwrap();
        std::fs::write(home.path().join(".ascii-art"), "local edit\n").unwrap();

        let mut config = empty_config(repo.path().to_path_buf());
        config.dotfiles = vec![dotfile(".ascii-art", "~/.ascii-art")];
        let mut ctx = make_context(config);
        ctx.home = home.path().to_path_buf();

        SyncDotfiles.run(&ctx).unwrap();
        SyncDotfiles.run(&ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(home.path().join(".ascii-art")).unwrap(),
            "v2\n"
        );
    }

    #[test]
    fn missing_source_warns_and_leaves_target_untouched() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".bashrc"), "mine\n").unwrap();

        let mut config = empty_config(repo.path().to_path_buf());
        config.dotfiles = vec![dotfile(".bashrc", "~/.bashrc")];
        let exec = Arc::new(RecordingExecutor::new());
        let (mut ctx, log) = make_recording_context(config, &exec);
        ctx.home = home.path().to_path_buf();

        let result = SyncDotfiles.run(&ctx);

        assert!(result.is_ok());
        assert!(log.has("warn", "source does not exist"));
        assert_eq!(
            std::fs::read_to_string(home.path().join(".bashrc")).unwrap(),
            "mine\n"
        );
    }

    #[test]
    fn dry_run_copies_nothing() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join(".bashrc"), "x\n").unwrap();

        let mut config = empty_config(repo.path().to_path_buf());
        config.dotfiles = vec![dotfile(".bashrc", "~/.bashrc")];
        let mut ctx = make_context(config);
        ctx.home = home.path().to_path_buf();
        ctx.dry_run = true;

        let result = SyncDotfiles.run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::DryRun));
        assert!(!home.path().join(".bashrc").exists());
    }
}
