//! Dotfile copy resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file or directory copied from the repository into the home directory.
///
/// Copies are blind: an existing target is always overwritten (directories
/// are merged into), never diffed or backed up.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory in the repository.
    pub source: PathBuf,
    /// Destination path.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        super::fs::ensure_parent_dir(&self.target)?;
        super::fs::copy_path(&self.source, &self.target)
            .with_context(|| format!("copy {}", self.description()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        Ok(ResourceState::Incorrect {
            current: format!("{} exists and will be overwritten", self.target.display()),
        })
    }
}
