//! `[environment]` and `[groups]` sections.
use serde::Deserialize;

/// Shell environment settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSection {
    /// Value for `EDITOR`; nothing is written when unset.
    pub editor: Option<String>,
    /// Shell rc file receiving the export.
    pub rc_file: String,
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            editor: None,
            rc_file: "~/.bashrc".to_string(),
        }
    }
}

/// Supplementary groups the invoking user must belong to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupsSection {
    /// Group names, created when missing.
    pub required: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rc_file_defaults_to_bashrc() {
        let env: EnvironmentSection = toml::from_str("editor = \"nvim\"").unwrap();
        assert_eq!(env.editor.as_deref(), Some("nvim"));
        assert_eq!(env.rc_file, "~/.bashrc");
    }

    #[test]
    fn groups_default_empty() {
        let groups: GroupsSection = toml::from_str("").unwrap();
        assert!(groups.required.is_empty());
    }
}
