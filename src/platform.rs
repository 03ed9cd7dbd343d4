use std::fmt;
use std::path::Path;

use crate::exec::Executor;
use crate::resources::package::PackageManager;

/// Linux distribution family, as far as package management is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Fedora, RHEL and friends (DNF, RPM).
    RedHat,
    /// Debian, Ubuntu and friends (APT, dpkg).
    Debian,
    /// Anything else; only the generic phases apply.
    Unknown,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedHat => write!(f, "redhat"),
            Self::Debian => write!(f, "debian"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Detected distribution family.
    pub family: Family,
}

impl Platform {
    /// Detect the current platform from release files, falling back to
    /// whichever package manager is on PATH.
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Self {
        Self::detect_in(Path::new("/etc"), executor)
    }

    /// Detect using release files under `etc` (split out for tests).
    #[must_use]
    pub fn detect_in(etc: &Path, executor: &dyn Executor) -> Self {
        let family = if etc.join("fedora-release").exists() || etc.join("redhat-release").exists()
        {
            Family::RedHat
        } else if etc.join("debian_version").exists() {
            Family::Debian
        } else if executor.which("dnf") {
            Family::RedHat
        } else if executor.which("apt-get") {
            Family::Debian
        } else {
            Family::Unknown
        };
        Self { family }
    }

    /// Create a platform with an explicit family.
    #[must_use]
    pub const fn new(family: Family) -> Self {
        Self { family }
    }

    /// The system package manager for this family, if one is supported.
    #[must_use]
    pub const fn system_manager(&self) -> Option<PackageManager> {
        match self.family {
            Family::RedHat => Some(PackageManager::Dnf),
            Family::Debian => Some(PackageManager::Apt),
            Family::Unknown => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn detects_fedora_from_release_file() {
        let etc = tempfile::tempdir().unwrap();
        std::fs::write(etc.path().join("fedora-release"), "Fedora release 41").unwrap();
        let p = Platform::detect_in(etc.path(), &MockExecutor::with_responses(vec![]));
        assert_eq!(p.family, Family::RedHat);
        assert_eq!(p.system_manager(), Some(PackageManager::Dnf));
    }

    #[test]
    fn detects_debian_from_release_file() {
        let etc = tempfile::tempdir().unwrap();
        std::fs::write(etc.path().join("debian_version"), "12.5").unwrap();
        let p = Platform::detect_in(etc.path(), &MockExecutor::with_responses(vec![]));
        assert_eq!(p.family, Family::Debian);
        assert_eq!(p.system_manager(), Some(PackageManager::Apt));
    }

    #[test]
    fn falls_back_to_path_probe() {
        let etc = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]).with_which(true);
        let p = Platform::detect_in(etc.path(), &executor);
        assert_eq!(p.family, Family::RedHat);
    }

    #[test]
    fn unknown_without_markers() {
        let etc = tempfile::tempdir().unwrap();
        let p = Platform::detect_in(etc.path(), &MockExecutor::with_responses(vec![]));
        assert_eq!(p.family, Family::Unknown);
        assert_eq!(p.system_manager(), None);
    }

    #[test]
    fn family_display() {
        assert_eq!(Family::RedHat.to_string(), "redhat");
        assert_eq!(Family::Debian.to_string(), "debian");
    }
}
