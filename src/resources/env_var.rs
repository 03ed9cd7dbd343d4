//! Shell rc-file `export` resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Ensures a shell rc file exports `name=value` exactly once.
///
/// A different `export <name>=` line is replaced in place; otherwise the line
/// is appended. Re-applying never grows the file.
#[derive(Debug, Clone)]
pub struct ShellExportResource {
    /// Shell rc file (e.g. `~/.bashrc`, already expanded).
    pub rc_file: PathBuf,
    /// Variable name.
    pub name: String,
    /// Desired value.
    pub value: String,
}

impl ShellExportResource {
    /// Create a new export resource.
    #[must_use]
    pub const fn new(rc_file: PathBuf, name: String, value: String) -> Self {
        Self {
            rc_file,
            name,
            value,
        }
    }

    fn desired_line(&self) -> String {
        format!("export {}={}", self.name, self.value)
    }

    fn prefix(&self) -> String {
        format!("export {}=", self.name)
    }

    fn read_rc(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.rc_file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.rc_file.display())),
        }
    }
}

impl Applicable for ShellExportResource {
    fn description(&self) -> String {
        format!("{} in {}", self.desired_line(), self.rc_file.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let desired = self.desired_line();
        let prefix = self.prefix();
        let content = self.read_rc()?.unwrap_or_default();

        let mut replaced = false;
        let mut lines: Vec<String> = Vec::new();
        for line in content.lines() {
            if line.trim_start().starts_with(&prefix) {
                // Keep only the first export; drop any duplicates.
                if !replaced {
                    lines.push(desired.clone());
                    replaced = true;
                }
            } else {
                lines.push(line.to_string());
            }
        }
        if !replaced {
            lines.push(desired);
        }

        let mut updated = lines.join("\n");
        updated.push('\n');
        super::fs::ensure_parent_dir(&self.rc_file)?;
        std::fs::write(&self.rc_file, updated)
            .with_context(|| format!("writing {}", self.rc_file.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellExportResource {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(content) = self.read_rc()? else {
            return Ok(ResourceState::Missing);
        };
        let prefix = self.prefix();
        let exports: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with(&prefix))
            .collect();
        match exports.as_slice() {
            [] => Ok(ResourceState::Missing),
            [only] if *only == self.desired_line() => Ok(ResourceState::Correct),
            _ => Ok(ResourceState::Incorrect {
                current: exports.join("; "),
            }),
        }
    }
}
