//! Package installation resource.
use std::collections::HashSet;

use anyhow::Result;

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Fedora / RHEL packages (dnf).
    Dnf,
    /// Debian / Ubuntu packages (apt).
    Apt,
    /// Flathub application bundles.
    Flatpak,
    /// Snap store packages.
    Snap,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dnf => write!(f, "dnf"),
            Self::Apt => write!(f, "apt"),
            Self::Flatpak => write!(f, "flatpak"),
            Self::Snap => write!(f, "snap"),
        }
    }
}

impl PackageManager {
    /// The program and arguments that list installed packages.
    #[must_use]
    pub const fn list_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Dnf => ("dnf", &["list", "--installed"]),
            Self::Apt => ("apt", &["list", "--installed"]),
            Self::Flatpak => ("flatpak", &["list", "--app", "--columns=application"]),
            Self::Snap => ("snap", &["list"]),
        }
    }

    /// The program and arguments that install a single package `name`.
    #[must_use]
    pub fn install_command(self, name: &str) -> (&'static str, Vec<&str>) {
        match self {
            Self::Dnf => ("sudo", vec!["dnf", "install", "-y", name]),
            Self::Apt => ("sudo", vec!["apt-get", "install", "-y", name]),
            Self::Flatpak => (
                "flatpak",
                vec!["install", "-y", "--noninteractive", "flathub", name],
            ),
            Self::Snap => ("sudo", vec!["snap", "install", name]),
        }
    }

    /// Parse this manager's listing output into a set of package names.
    ///
    /// Parsing is format-specific: a line that doesn't match the expected
    /// layout is ignored, which at worst causes a redundant install attempt.
    #[must_use]
    pub fn parse_installed(self, output: &str) -> HashSet<String> {
        let mut set = HashSet::new();
        match self {
            // "jq.x86_64   1.7.1-8.fc41   @fedora"
            Self::Dnf => {
                for line in output.lines().skip(1) {
                    if let Some(name) = line
                        .split_whitespace()
                        .next()
                        .and_then(|token| token.split('.').next())
                        .filter(|name| !name.is_empty())
                    {
                        set.insert(name.to_string());
                    }
                }
            }
            // "jq/jammy,now 1.6-2.1ubuntu3 amd64 [installed]"
            Self::Apt => {
                for line in output.lines().skip(1) {
                    if let Some(name) = line
                        .split('/')
                        .next()
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                    {
                        set.insert(name.to_string());
                    }
                }
            }
            // No header with --columns; record both the full ID and its
            // short form so "AzureStorageExplorer" matches the reverse-DNS ID.
            Self::Flatpak => {
                for id in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    set.insert(id.to_string());
                    if let Some(short) = id.rsplit('.').next() {
                        set.insert(short.to_string());
                    }
                }
            }
            // "Name  Version  Rev  Tracking  Publisher  Notes"
            Self::Snap => {
                for line in output.lines().skip(1) {
                    if let Some(name) = line.split_whitespace().next() {
                        set.insert(name.to_string());
                    }
                }
            }
        }
        set
    }
}

/// A package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name (or Flatpak application ID).
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    /// Executor for running package manager commands.
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    ///
    /// This avoids running a per-package query when used with
    /// [`get_installed_packages`].
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Query the full set of installed package names for a given manager.
///
/// Runs a **single** listing command regardless of how many packages need to
/// be checked.
///
/// # Errors
///
/// Returns [`ResourceError::QueryFailed`] if the listing command cannot be
/// spawned or exits non-zero. Callers treat this as fatal for the phase:
/// without the installed set every package would be reinstalled blindly.
pub fn get_installed_packages(
    manager: PackageManager,
    executor: &dyn Executor,
) -> Result<HashSet<String>, ResourceError> {
    let (program, args) = manager.list_command();
    let result =
        executor
            .run_unchecked(program, args)
            .map_err(|e| ResourceError::QueryFailed {
                manager: manager.to_string(),
                output: format!("{e:#}"),
            })?;
    if !result.success {
        return Err(ResourceError::QueryFailed {
            manager: manager.to_string(),
            output: result.combined_output(),
        });
    }
    Ok(manager.parse_installed(&result.stdout))
}

/// Desired names that are not installed, deduplicated, in first-occurrence order.
#[must_use]
pub fn missing_packages(desired: &[String], installed: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .filter(|name| !installed.contains(*name) && seen.insert(name.as_str()))
        .cloned()
        .collect()
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    /// Install this one package.
    ///
    /// A failing install is reported as `Skipped` with the captured output so
    /// the phase can warn and move on to the next package.
    fn apply(&self) -> Result<ResourceChange> {
        let (program, args) = self.manager.install_command(&self.name);
        let result = self.executor.run_unchecked(program, &args)?;
        if result.success {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::Skipped {
                reason: format!(
                    "{} install failed (exit {}): {}",
                    self.manager,
                    result.code.unwrap_or(-1),
                    result.combined_output()
                ),
            })
        }
    }
}

impl Resource for PackageResource<'_> {
    /// Standalone check; prefer [`get_installed_packages`] plus
    /// [`PackageResource::state_from_installed`] when checking many packages.
    fn current_state(&self) -> Result<ResourceState> {
        let installed = get_installed_packages(self.manager, self.executor)?;
        Ok(self.state_from_installed(&installed))
    }
}
