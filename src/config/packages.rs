//! `[packages]` section.
use serde::Deserialize;

use crate::platform::Platform;
use crate::resources::package::PackageManager;

/// Which system package manager to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerChoice {
    /// Pick from the detected platform.
    #[default]
    Auto,
    /// Always DNF.
    Dnf,
    /// Always APT.
    Apt,
}

impl ManagerChoice {
    /// Resolve to a concrete manager, consulting `platform` for `auto`.
    #[must_use]
    pub const fn resolve(self, platform: &Platform) -> Option<PackageManager> {
        match self {
            Self::Auto => platform.system_manager(),
            Self::Dnf => Some(PackageManager::Dnf),
            Self::Apt => Some(PackageManager::Apt),
        }
    }
}

/// Desired packages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesSection {
    /// System package manager selection.
    pub manager: ManagerChoice,
    /// Packages for the system manager. Duplicates are collapsed.
    pub system: Vec<String>,
    /// Flathub application IDs (full or short form).
    pub flatpak: Vec<String>,
    /// Snap store packages.
    pub snap: Vec<String>,
}

impl PackagesSection {
    /// Desired lists paired with their manager, skipping empty lists.
    ///
    /// The system list is dropped when no system manager can be resolved.
    #[must_use]
    pub fn by_manager(&self, platform: &Platform) -> Vec<(PackageManager, &[String])> {
        let mut lists = Vec::new();
        if let Some(manager) = self.manager.resolve(platform)
            && !self.system.is_empty()
        {
            lists.push((manager, self.system.as_slice()));
        }
        if !self.flatpak.is_empty() {
            lists.push((PackageManager::Flatpak, self.flatpak.as_slice()));
        }
        if !self.snap.is_empty() {
            lists.push((PackageManager::Snap, self.snap.as_slice()));
        }
        lists
    }
}
