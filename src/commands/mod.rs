pub mod provision;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{self, Config};
use crate::exec::Executor;
use crate::logging::Logger;
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection and configuration loading so that the
/// command body only deals with task selection and execution.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Loaded configuration.
    pub config: Config,
    /// Path the configuration was loaded from.
    pub config_path: PathBuf,
}

impl CommandSetup {
    /// Detect the platform, locate and load the configuration, and print
    /// validation warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration file is found or it fails to
    /// parse.
    pub fn init(explicit: Option<&Path>, executor: &dyn Executor, log: &Logger) -> Result<Self> {
        let platform = Platform::detect(executor);
        log.debug(&format!("platform: {}", platform.family));

        log.stage("Loading configuration");
        let cwd = std::env::current_dir().context("reading current directory")?;
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let config_path = config::resolve_config_path(
            explicit,
            std::env::var_os(config::CONFIG_ENV),
            &cwd,
            exe_dir.as_deref(),
        )?;
        let config = Config::load(&config_path)?;
        log.info(&format!("config: {}", config_path.display()));

        log.debug(&format!("{} system packages", config.packages.system.len()));
        log.debug(&format!("{} flatpak packages", config.packages.flatpak.len()));
        log.debug(&format!("{} snap packages", config.packages.snap.len()));
        log.debug(&format!("{} dotfiles", config.dotfiles.len()));
        log.debug(&format!("{} git entries", config.git.entries().len()));
        log.debug(&format!("{} required groups", config.groups.required.len()));
        log.debug(&format!("{} tools enabled", config.tools.enabled.len()));

        let warnings = config.validate(&platform);
        if !warnings.is_empty() {
            log.warn(&format!("found {} configuration warning(s):", warnings.len()));
            for warning in &warnings {
                log.warn(&format!("  {warning}"));
            }
        }

        Ok(Self {
            platform,
            config,
            config_path,
        })
    }
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        return Err(crate::error::TaskError::Failed(count).into());
    }
    Ok(())
}
