use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// One `git config --global` entry.
#[derive(Debug)]
pub struct GitConfigResource<'a> {
    /// Config key (e.g., "user.name").
    pub key: String,
    /// Desired value.
    pub desired_value: String,
    executor: &'a dyn Executor,
}

impl<'a> GitConfigResource<'a> {
    /// Create a new git config resource.
    #[must_use]
    pub fn new(key: String, desired_value: String, executor: &'a dyn Executor) -> Self {
        Self {
            key,
            desired_value,
            executor,
        }
    }
}

impl Applicable for GitConfigResource<'_> {
    fn description(&self) -> String {
        format!("{} = {}", self.key, self.desired_value)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "git",
            &["config", "--global", &self.key, &self.desired_value],
        )?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GitConfigResource<'_> {
    /// `--get` exits 1 for an unset key, so any failure reads as missing.
    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .executor
            .run_unchecked("git", &["config", "--global", "--get", &self.key])?;
        let current = result.stdout.trim().to_string();

        if !result.success || current.is_empty() {
            Ok(ResourceState::Missing)
        } else if current == self.desired_value {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect { current })
        }
    }
}
