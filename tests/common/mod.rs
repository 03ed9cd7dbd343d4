// Shared helpers for integration tests.
//
// Provides a temporary repository with a config file and dotfile sources, a
// separate temporary home directory, and a scripted executor so each test can
// drive whole provisioning passes without touching the host.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use provision_cli::config::Config;
use provision_cli::exec::{ExecResult, Executor};
use provision_cli::logging::{Log, Logger};
use provision_cli::platform::{Family, Platform};
use provision_cli::tasks::Context;

/// Config used by [`IntegrationTestContext::new`].
pub const MINIMAL_CONFIG: &str = r#"
[[dotfiles]]
source = "home/.bashrc"
target = "~/.bashrc"

[[dotfiles]]
source = "home/nvim"
target = "~/.config/nvim"

[git]
user_name = "Test User"
user_email = "test@example.com"

[git.settings]
"init.defaultBranch" = "main"

[environment]
editor = "nvim"

[groups]
required = ["docker"]
"#;

/// Write `content` as `conf/provision.toml` under `root` along with the
/// dotfile sources it refers to.
///
/// Creates:
/// - `conf/provision.toml`
/// - `conf/home/.bashrc`
/// - `conf/home/nvim/init.lua`
pub fn setup_repo(root: &Path, content: &str) -> PathBuf {
    let conf = root.join("conf");
    std::fs::create_dir_all(conf.join("home/nvim")).expect("create source dirs");
    std::fs::write(conf.join("home/.bashrc"), "alias ll='ls -l'\n").expect("write .bashrc");
    std::fs::write(conf.join("home/nvim/init.lua"), "vim.opt.number = true\n")
        .expect("write init.lua");

    let path = conf.join("provision.toml");
    std::fs::write(&path, content).expect("write provision.toml");
    path
}

/// An isolated repository and home directory backed by
/// [`tempfile::TempDir`]s.
///
/// Both directories are deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory containing `conf/`.
    pub root: tempfile::TempDir,
    /// Temporary directory standing in for `$HOME`.
    pub home: tempfile::TempDir,
    /// Path to the written config file.
    pub config_path: PathBuf,
}

impl IntegrationTestContext {
    /// Create a context with [`MINIMAL_CONFIG`].
    pub fn new() -> Self {
        Self::with_config(MINIMAL_CONFIG)
    }

    /// Create a context with the given config file content.
    pub fn with_config(content: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let home = tempfile::tempdir().expect("create temp home");
        let config_path = setup_repo(root.path(), content);
        Self {
            root,
            home,
            config_path,
        }
    }

    /// Path to the temporary home directory.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Load the written config.
    pub fn load_config(&self) -> Config {
        Config::load(&self.config_path).expect("load config")
    }

    /// Build a task [`Context`] for a Red Hat host over `executor`.
    pub fn task_context(
        &self,
        executor: Arc<dyn Executor>,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Context {
        Context {
            config: Arc::new(self.load_config()),
            platform: Arc::new(Platform::new(Family::RedHat)),
            log,
            dry_run,
            home: self.home_path().to_path_buf(),
            user: "tester".to_string(),
            executor,
        }
    }
}

/// A real [`Logger`] for a test run.
pub fn test_logger(name: &str) -> Arc<Logger> {
    Arc::new(Logger::new(name))
}

/// Executor that records every command line and answers from a script.
///
/// Commands succeed with empty output unless a response or failure was
/// registered for a matching prefix.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<String>>,
    responses: Vec<(String, String)>,
    failures: Vec<String>,
    programs: HashSet<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `stdout`.
    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses.push((prefix.to_string(), stdout.to_string()));
        self
    }

    /// Fail commands starting with `prefix`.
    pub fn fail(mut self, prefix: &str) -> Self {
        self.failures.push(prefix.to_string());
        self
    }

    /// Report `program` as present on PATH.
    pub fn with_program(mut self, program: &str) -> Self {
        self.programs.insert(program.to_string());
        self
    }

    /// Every recorded command line, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Recorded command lines starting with `prefix`.
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let failed = self.failures.iter().any(|p| line.starts_with(p));
        let stdout = self
            .responses
            .iter()
            .find(|(p, _)| line.starts_with(p))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        self.calls.lock().expect("calls lock").push(line);
        ExecResult {
            stdout,
            stderr: if failed { "scripted failure".to_string() } else { String::new() },
            success: !failed,
            code: Some(i32::from(failed)),
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.answer(program, args);
        if !result.success {
            bail!("{program} failed: {}", result.stderr);
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn run_with_input(&self, program: &str, args: &[&str], _input: &str) -> Result<ExecResult> {
        self.run(program, args)
    }

    fn which(&self, program: &str) -> bool {
        self.programs.contains(program)
    }
}
