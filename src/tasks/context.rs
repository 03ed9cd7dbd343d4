use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

/// Shared context for task execution.
pub struct Context {
    /// Configuration loaded from `provision.toml`.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// Login name of the invoking user (target of group membership changes).
    pub user: String,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("user", &self.user)
            .field("executor", &self.executor)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set, or if neither `USER` nor
    /// `LOGNAME` is set.
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
    ) -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?;
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .map_err(|_| anyhow::anyhow!("neither USER nor LOGNAME environment variable is set"))?;

        Ok(Self {
            config,
            platform,
            log,
            dry_run,
            home: PathBuf::from(home),
            user,
            executor,
        })
    }

    /// Directory holding the config file; dotfile sources resolve against it.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.config.root
    }

    /// Create a copy of this context with a different logger.
    ///
    /// All other fields are shared by reference (via `Arc`).
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: Arc::clone(&self.platform),
            log,
            dry_run: self.dry_run,
            home: self.home.clone(),
            user: self.user.clone(),
            executor: Arc::clone(&self.executor),
        }
    }
}
