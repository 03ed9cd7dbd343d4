//! Group membership resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// `groupadd` exit status for "group already exists".
const GROUPADD_EXISTS: i32 = 9;

/// Query the groups `user` currently belongs to (`id -nG <user>`).
///
/// # Errors
///
/// Returns an error if `id` cannot be spawned or exits non-zero.
pub fn current_memberships(user: &str, executor: &dyn Executor) -> Result<HashSet<String>> {
    let result = executor.run("id", &["-nG", user])?;
    Ok(result
        .stdout
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Membership of `user` in a supplementary group.
///
/// Takes effect at the next login; the new membership is not visible to the
/// running session and is not re-checked after apply.
#[derive(Debug)]
pub struct GroupMembershipResource<'a> {
    /// Group name.
    pub group: String,
    /// User to add.
    pub user: String,
    executor: &'a dyn Executor,
}

impl<'a> GroupMembershipResource<'a> {
    /// Create a new group membership resource.
    #[must_use]
    pub const fn new(group: String, user: String, executor: &'a dyn Executor) -> Self {
        Self {
            group,
            user,
            executor,
        }
    }

    /// State from a pre-fetched membership set (see [`current_memberships`]).
    #[must_use]
    pub fn state_from_memberships(&self, memberships: &HashSet<String>) -> ResourceState {
        if memberships.contains(&self.group) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }

    /// Create the group, tolerating failure.
    ///
    /// Returns a warning message when `groupadd` fails for any reason other
    /// than the group already existing.
    ///
    /// # Errors
    ///
    /// Returns an error only if `sudo` cannot be spawned.
    pub fn create_group(&self) -> Result<Option<String>> {
        let result = self
            .executor
            .run_unchecked("sudo", &["groupadd", &self.group])?;
        if result.success || result.code == Some(GROUPADD_EXISTS) {
            return Ok(None);
        }
        Ok(Some(format!(
            "groupadd {} failed (exit {}): {}",
            self.group,
            result.code.unwrap_or(-1),
            result.combined_output()
        )))
    }
}

impl Applicable for GroupMembershipResource<'_> {
    fn description(&self) -> String {
        format!("{} in group {}", self.user, self.group)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor
            .run("sudo", &["usermod", "-aG", &self.group, &self.user])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GroupMembershipResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let memberships = current_memberships(&self.user, self.executor)?;
        Ok(self.state_from_memberships(&memberships))
    }
}
