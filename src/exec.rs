use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Both output streams joined, trimmed, for error reports.
    ///
    /// Package managers are inconsistent about which stream carries the
    /// diagnostic, so callers that surface "captured output" use this.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let out = self.stdout.trim();
        let err = self.stderr.trim();
        match (out.is_empty(), err.is_empty()) {
            (true, _) => err.to_string(),
            (false, true) => out.to_string(),
            (false, false) => format!("{out}\n{err}"),
        }
    }
}

/// Abstraction over process execution so resources can be tested without
/// touching the host system.
///
/// Production code uses [`SystemExecutor`]; unit tests substitute a mock that
/// records or scripts the responses.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with `input` piped to its standard input. Fails if the
    /// command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, stdin cannot be
    /// written, or the process exits non-zero.
    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        run(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        run_unchecked(program, args)
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult> {
        run_with_input(program, args, input)
    }

    fn which(&self, program: &str) -> bool {
        which(program)
    }
}

/// Bail if `result` reports a non-zero exit.
fn ensure_success(result: ExecResult, label: &str) -> Result<ExecResult> {
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

/// Run a command and return its output. Fails if the command exits non-zero.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned or exits non-zero.
pub fn run(program: &str, args: &[&str]) -> Result<ExecResult> {
    let result = run_unchecked(program, args)?;
    ensure_success(result, program)
}

/// Run a command, allowing failure (returns result without bailing).
///
/// # Errors
///
/// Returns an error only if the process cannot be spawned.
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;

    Ok(ExecResult::from(output))
}

/// Run a command with `input` written to its standard input.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned, its stdin cannot be
/// written, or it exits non-zero.
pub fn run_with_input(program: &str, args: &[&str], input: &str) -> Result<ExecResult> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("writing stdin of {program}"))?;
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("waiting for {program}"))?;
    ensure_success(ExecResult::from(output), program)
}

/// Check if a program is available on PATH.
#[must_use]
pub fn which(program: &str) -> bool {
    which::which(program).is_ok()
}
