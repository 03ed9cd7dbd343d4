//! `[[dotfiles]]` entries.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A file or directory copied from the repository to the home directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dotfile {
    /// Path relative to the directory holding the config file.
    pub source: String,
    /// Destination; `~` and `$VAR` are expanded at run time.
    pub target: String,
}

impl Dotfile {
    /// Absolute source path under `root`.
    #[must_use]
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        dotfiles: Vec<Dotfile>,
    }

    #[test]
    fn deserializes_array_of_tables() {
        let w: Wrapper = toml::from_str(
            r#"
[[dotfiles]]
source = "nvim"
target = "~/.config/nvim"

[[dotfiles]]
source = ".bashrc"
target = "~/.bashrc"
"#,
        )
        .unwrap();
        assert_eq!(w.dotfiles.len(), 2);
        assert_eq!(w.dotfiles[0].target, "~/.config/nvim");
    }

    #[test]
    fn source_is_relative_to_root() {
        let d = Dotfile {
            source: "tmux".into(),
            target: "~/.config/tmux".into(),
        };
        assert_eq!(
            d.source_path(Path::new("/repo")),
            PathBuf::from("/repo/tmux")
        );
    }
}
