use std::collections::HashSet;
use std::path::Path;

use super::Config;
use crate::platform::{Family, Platform};
use crate::resources::package::PackageManager;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (e.g., "packages", "dotfiles").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.source, self.item, self.message)
    }
}

/// Trait for configuration validators.
///
/// Validators never fail; anything suspicious becomes a warning and the run
/// proceeds.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path, platform: &Platform) -> Vec<ValidationWarning>;

    /// Section name this validator covers.
    #[allow(dead_code)]
    fn name(&self) -> &'static str;
}

/// Validator for package lists.
#[derive(Debug)]
pub struct PackageValidator<'a> {
    packages: &'a super::packages::PackagesSection,
}

impl<'a> PackageValidator<'a> {
    #[must_use]
    pub const fn new(packages: &'a super::packages::PackagesSection) -> Self {
        Self { packages }
    }
}

impl ConfigValidator for PackageValidator<'_> {
    fn validate(&self, _root: &Path, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (list, names) in [
            ("system", &self.packages.system),
            ("flatpak", &self.packages.flatpak),
            ("snap", &self.packages.snap),
        ] {
            let mut seen = HashSet::new();
            for name in names {
                if name.trim().is_empty() {
                    warnings.push(ValidationWarning::new(
                        "packages",
                        list,
                        "package name is empty",
                    ));
                } else if !seen.insert(name.as_str()) {
                    warnings.push(ValidationWarning::new(
                        "packages",
                        name,
                        format!("listed more than once in {list}"),
                    ));
                }
            }
        }

        let resolved = self.packages.manager.resolve(platform);
        if resolved.is_none() && !self.packages.system.is_empty() {
            warnings.push(ValidationWarning::new(
                "packages",
                "manager",
                "no system package manager detected; system packages will be skipped",
            ));
        }
        let mismatch = matches!(
            (resolved, platform.family),
            (Some(PackageManager::Dnf), Family::Debian) | (Some(PackageManager::Apt), Family::RedHat)
        );
        if mismatch {
            warnings.push(ValidationWarning::new(
                "packages",
                "manager",
                format!("configured manager does not match detected {} platform", platform.family),
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "packages"
    }
}

/// Validator for dotfile mappings.
#[derive(Debug)]
pub struct DotfileValidator<'a> {
    dotfiles: &'a [super::dotfiles::Dotfile],
}

impl<'a> DotfileValidator<'a> {
    #[must_use]
    pub const fn new(dotfiles: &'a [super::dotfiles::Dotfile]) -> Self {
        Self { dotfiles }
    }
}

impl ConfigValidator for DotfileValidator<'_> {
    fn validate(&self, root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for dotfile in self.dotfiles {
            let source_path = dotfile.source_path(root);
            if !source_path.exists() {
                warnings.push(ValidationWarning::new(
                    "dotfiles",
                    &dotfile.source,
                    format!("source does not exist: {}", source_path.display()),
                ));
            }

            if Path::new(&dotfile.source).is_absolute() {
                warnings.push(ValidationWarning::new(
                    "dotfiles",
                    &dotfile.source,
                    "source path should be relative to the config directory",
                ));
            }

            if dotfile.target.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "dotfiles",
                    &dotfile.source,
                    "target is empty",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "dotfiles"
    }
}

/// Validator for the git identity.
#[derive(Debug)]
pub struct GitValidator<'a> {
    git: &'a super::git::GitSection,
}

impl<'a> GitValidator<'a> {
    #[must_use]
    pub const fn new(git: &'a super::git::GitSection) -> Self {
        Self { git }
    }
}

impl ConfigValidator for GitValidator<'_> {
    fn validate(&self, _root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        [
            ("user_name", &self.git.user_name),
            ("user_email", &self.git.user_email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| ValidationWarning::new("git", key, "not set; git identity left unchanged"))
        .collect()
    }

    fn name(&self) -> &'static str {
        "git"
    }
}

/// Validator for the desktop layout.
#[derive(Debug)]
pub struct DesktopValidator<'a> {
    desktop: &'a super::desktop::DesktopSection,
}

impl<'a> DesktopValidator<'a> {
    #[must_use]
    pub const fn new(desktop: &'a super::desktop::DesktopSection) -> Self {
        Self { desktop }
    }
}

impl ConfigValidator for DesktopValidator<'_> {
    fn validate(&self, _root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if !self.desktop.workspaces_in_range() {
            let range = super::desktop::WORKSPACE_RANGE;
            warnings.push(ValidationWarning::new(
                "desktop",
                "workspaces",
                format!(
                    "{} is outside {}..={}; keybindings will not be written",
                    self.desktop.workspaces,
                    range.start(),
                    range.end()
                ),
            ));
        }
        if !self.desktop.modifier.starts_with('<') || !self.desktop.modifier.ends_with('>') {
            warnings.push(ValidationWarning::new(
                "desktop",
                "modifier",
                format!(
                    "'{}' does not look like an accelerator such as <Super>",
                    self.desktop.modifier
                ),
            ));
        }
        warnings
    }

    fn name(&self) -> &'static str {
        "desktop"
    }
}

/// Validator for enabled tool names.
#[derive(Debug)]
pub struct ToolValidator<'a> {
    tools: &'a super::tools::ToolsSection,
}

impl<'a> ToolValidator<'a> {
    #[must_use]
    pub const fn new(tools: &'a super::tools::ToolsSection) -> Self {
        Self { tools }
    }
}

impl ConfigValidator for ToolValidator<'_> {
    fn validate(&self, _root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings: Vec<ValidationWarning> = self
            .tools
            .enabled
            .iter()
            .filter(|name| !crate::tools::TOOL_NAMES.contains(&name.as_str()))
            .map(|name| {
                ValidationWarning::new(
                    "tools",
                    name,
                    format!(
                        "unknown tool (known: {})",
                        crate::tools::TOOL_NAMES.join(", ")
                    ),
                )
            })
            .collect();
        if self.tools.poll_interval_ms == 0 {
            warnings.push(ValidationWarning::new(
                "tools",
                "poll_interval_ms",
                "zero interval busy-waits on downloads",
            ));
        }
        if self.tools.download_timeout_secs > super::tools::MAX_DOWNLOAD_TIMEOUT_SECS {
            warnings.push(ValidationWarning::new(
                "tools",
                "download_timeout_secs",
                format!(
                    "{}s exceeds {}s; downloads may wait indefinitely",
                    self.tools.download_timeout_secs,
                    super::tools::MAX_DOWNLOAD_TIMEOUT_SECS
                ),
            ));
        }
        warnings
    }

    fn name(&self) -> &'static str {
        "tools"
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &Config, platform: &Platform) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(PackageValidator::new(&config.packages)),
        Box::new(DotfileValidator::new(&config.dotfiles)),
        Box::new(GitValidator::new(&config.git)),
        Box::new(DesktopValidator::new(&config.desktop)),
        Box::new(ToolValidator::new(&config.tools)),
    ];

    let mut all_warnings = Vec::new();
    for validator in validators {
        let warnings = validator.validate(&config.root, platform);
        all_warnings.extend(warnings);
    }

    all_warnings
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::desktop::DesktopSection;
    use crate::config::dotfiles::Dotfile;
    use crate::config::git::GitSection;
    use crate::config::packages::{ManagerChoice, PackagesSection};
    use crate::config::tools::ToolsSection;

    fn fedora() -> Platform {
        Platform::new(Family::RedHat)
    }

    #[test]
    fn package_validator_flags_duplicates() {
        let packages = PackagesSection {
            system: vec!["htop".into(), "jq".into(), "htop".into()],
            ..PackagesSection::default()
        };
        let warnings = PackageValidator::new(&packages).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "htop");
        assert!(warnings[0].message.contains("more than once"));
    }

    #[test]
    fn package_validator_flags_manager_mismatch() {
        let packages = PackagesSection {
            manager: ManagerChoice::Apt,
            system: vec!["jq".into()],
            ..PackagesSection::default()
        };
        let warnings = PackageValidator::new(&packages).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("redhat"));
    }

    #[test]
    fn package_validator_flags_unknown_platform() {
        let packages = PackagesSection {
            system: vec!["jq".into()],
            ..PackagesSection::default()
        };
        let warnings = PackageValidator::new(&packages)
            .validate(Path::new("/tmp"), &Platform::new(Family::Unknown));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no system package manager"));
    }

    #[test]
    fn dotfile_validator_detects_missing_source() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".bashrc"), "").unwrap();
        let dotfiles = vec![
            Dotfile {
                source: ".bashrc".into(),
                target: "~/.bashrc".into(),
            },
            Dotfile {
                source: "nvim".into(),
                target: "~/.config/nvim".into(),
            },
        ];
        let warnings = DotfileValidator::new(&dotfiles).validate(root.path(), &fedora());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "nvim");
        assert!(warnings[0].message.contains("does not exist"));
    }

    #[test]
    fn dotfile_validator_detects_absolute_source() {
        let root = tempfile::tempdir().unwrap();
        let dotfiles = vec![Dotfile {
            source: "/etc/bashrc".into(),
            target: "~/.bashrc".into(),
        }];
        let warnings = DotfileValidator::new(&dotfiles).validate(root.path(), &fedora());
        assert!(warnings.iter().any(|w| w.message.contains("should be relative")));
    }

    #[test]
    fn git_validator_flags_empty_identity() {
        let git = GitSection {
            user_name: "Russell-Waterhouse".into(),
            ..GitSection::default()
        };
        let warnings = GitValidator::new(&git).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "user_email");
    }

    #[test]
    fn desktop_validator_flags_out_of_range() {
        let desktop = DesktopSection {
            workspaces: 12,
            ..DesktopSection::default()
        };
        let warnings = DesktopValidator::new(&desktop).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("outside 1..=10"));
    }

    #[test]
    fn desktop_validator_accepts_defaults() {
        let desktop = DesktopSection::default();
        assert!(
            DesktopValidator::new(&desktop)
                .validate(Path::new("/tmp"), &fedora())
                .is_empty()
        );
    }

    #[test]
    fn tool_validator_flags_huge_timeout() {
        let tools = ToolsSection {
            download_timeout_secs: u64::MAX,
            ..ToolsSection::default()
        };
        let warnings = ToolValidator::new(&tools).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "download_timeout_secs");
    }

    #[test]
    fn tool_validator_flags_unknown_names() {
        let tools = ToolsSection {
            enabled: vec!["tpm".into(), "emacs".into()],
            ..ToolsSection::default()
        };
        let warnings = ToolValidator::new(&tools).validate(Path::new("/tmp"), &fedora());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "emacs");
    }

    #[test]
    fn validate_all_collects_from_every_section() {
        let config = Config {
            root: tempfile::tempdir().unwrap().path().to_path_buf(),
            desktop: DesktopSection {
                workspaces: 0,
                ..DesktopSection::default()
            },
            tools: ToolsSection {
                enabled: vec!["nope".into()],
                ..ToolsSection::default()
            },
            ..Config::default()
        };
        let warnings = validate_all(&config, &fedora());
        let sources: Vec<&str> = warnings.iter().map(|w| w.source.as_str()).collect();
        assert!(sources.contains(&"git"));
        assert!(sources.contains(&"desktop"));
        assert!(sources.contains(&"tools"));
    }

    #[test]
    fn warning_display() {
        let w = ValidationWarning::new("tools", "emacs", "unknown tool");
        assert_eq!(w.to_string(), "tools: emacs: unknown tool");
    }
}
