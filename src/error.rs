//! Typed errors for configuration loading and task execution.
//!
//! Internal modules return [`ConfigError`] and [`TaskError`] (and
//! [`ResourceError`](crate::resources::error::ResourceError) for resources);
//! command handlers convert them to [`anyhow::Error`] with `?`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while locating and loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the searched locations.
    #[error("no configuration file found (searched: {})", display_paths(.searched))]
    NotFound {
        /// Every location that was tried, in order.
        searched: Vec<PathBuf>,
    },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected schema.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value parsed but is not acceptable.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Dotted key of the offending value.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors that arise while ordering or executing tasks.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The declared task dependencies form a cycle.
    #[error("task dependency cycle detected among: {0}")]
    DependencyCycle(String),

    /// One or more tasks recorded a failure.
    #[error("{0} task(s) failed")]
    Failed(usize),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
