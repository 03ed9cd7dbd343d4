pub mod desktop;
pub mod dotfiles;
pub mod environment;
pub mod git;
pub mod packages;
pub mod toml_loader;
pub mod tools;
pub mod validation;

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::platform::Platform;

/// Config file location relative to a search directory.
pub const DEFAULT_CONFIG: &str = "conf/provision.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PROVISION_CONFIG";

/// Everything loaded from `provision.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the config file; dotfile sources resolve against it.
    #[serde(skip)]
    pub root: PathBuf,
    /// `[packages]`
    pub packages: packages::PackagesSection,
    /// `[[dotfiles]]`
    pub dotfiles: Vec<dotfiles::Dotfile>,
    /// `[git]`
    pub git: git::GitSection,
    /// `[environment]`
    pub environment: environment::EnvironmentSection,
    /// `[groups]`
    pub groups: environment::GroupsSection,
    /// `[desktop]`
    pub desktop: desktop::DesktopSection,
    /// `[tools]`
    pub tools: tools::ToolsSection,
}

impl Config {
    /// Load the config file at `path`. Missing sections take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml_loader::load_config(path)?;
        config.root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(config)
    }

    /// Collect non-fatal configuration warnings.
    #[must_use]
    pub fn validate(&self, platform: &Platform) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self, platform)
    }
}

/// Locate the config file.
///
/// An explicit path (from `--config`) or `$PROVISION_CONFIG` is used as-is
/// and must exist. Otherwise `conf/provision.toml` is looked up under the
/// working directory, then next to the executable.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] listing every location tried.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    cwd: &Path,
    exe_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let pinned = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from));
    if let Some(path) = pinned {
        return if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::NotFound {
                searched: vec![path],
            })
        };
    }

    let searched: Vec<PathBuf> = std::iter::once(cwd)
        .chain(exe_dir)
        .map(|dir| dir.join(DEFAULT_CONFIG))
        .collect();
    let found = searched.iter().find(|p| p.is_file()).cloned();
    found.ok_or(ConfigError::NotFound { searched })
}

/// Expand `~` (to `home`) and `$VAR` references in a configured path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming `key` if a referenced
/// variable is not set.
pub fn expand_path(raw: &str, home: &Path, key: &str) -> Result<PathBuf, ConfigError> {
    let expanded = shellexpand::full_with_context(
        raw,
        || Some(home.to_string_lossy()),
        |var| std::env::var(var).map(Some),
    )
    .map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
