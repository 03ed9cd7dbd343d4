//! `[desktop]` section.
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Workspace counts with a digit key to bind (10 uses `0`).
pub const WORKSPACE_RANGE: RangeInclusive<u8> = 1..=10;

/// Fixed-workspace layout and keybinding modifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesktopSection {
    /// Number of static workspaces.
    pub workspaces: u8,
    /// Accelerator prefix, e.g. `<Super>`.
    pub modifier: String,
}

impl Default for DesktopSection {
    fn default() -> Self {
        Self {
            workspaces: 9,
            modifier: "<Super>".to_string(),
        }
    }
}

impl DesktopSection {
    /// Whether `workspaces` can be bound to digit keys.
    #[must_use]
    pub fn workspaces_in_range(&self) -> bool {
        WORKSPACE_RANGE.contains(&self.workspaces)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_nine_super_workspaces() {
        let desktop: DesktopSection = toml::from_str("").unwrap();
        assert_eq!(desktop.workspaces, 9);
        assert_eq!(desktop.modifier, "<Super>");
        assert!(desktop.workspaces_in_range());
    }

    #[test]
    fn range_check() {
        let mut desktop = DesktopSection::default();
        desktop.workspaces = 10;
        assert!(desktop.workspaces_in_range());
        desktop.workspaces = 0;
        assert!(!desktop.workspaces_in_range());
        desktop.workspaces = 11;
        assert!(!desktop.workspaces_in_range());
    }
}
