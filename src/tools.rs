//! Catalogue of optional tool installers.
//!
//! Every installer is a marker probe plus ordered, individually probed steps
//! (see [`ToolInstaller`]). Repository setup differs between DNF and APT; the
//! rest of the pipeline is shared.
use std::path::{Path, PathBuf};

use crate::resources::package::PackageManager;
use crate::resources::probe::Probe;
use crate::resources::tool::{Step, StepAction, ToolInstaller};

/// Every tool name accepted in `[tools].enabled`, in installation order.
pub const TOOL_NAMES: &[&str] = &[
    "docker-desktop",
    "kubectl",
    "lens",
    "azure-cli",
    "vscode",
    "kanata",
    "ghostty",
    "tpm",
];

const KUBERNETES_REPO: &str = "\
[kubernetes]
name=Kubernetes
baseurl=https://pkgs.k8s.io/core:/stable:/v1.31/rpm/
enabled=1
gpgcheck=1
gpgkey=https://pkgs.k8s.io/core:/stable:/v1.31/rpm/repodata/repomd.xml.key
";

const VSCODE_REPO: &str = "\
[code]
name=Visual Studio Code
baseurl=https://packages.microsoft.com/yumrepos/vscode
enabled=1
autorefresh=1
type=rpm-md
gpgcheck=1
gpgkey=https://packages.microsoft.com/keys/microsoft.asc
";

const KANATA_UDEV_RULE: &str =
    "KERNEL==\"uinput\", MODE=\"0660\", GROUP=\"uinput\", OPTIONS+=\"static_node=uinput\"\n";

const KANATA_UNIT: &str = "\
[Unit]
Description=Kanata keyboard remapper
Documentation=https://github.com/jtroo/kanata

[Service]
Environment=PATH=/usr/local/bin:/usr/local/sbin:/usr/bin:/bin
Type=simple
ExecStart=/usr/local/bin/kanata --cfg %h/.config/kanata/config.kbd
Restart=no

[Install]
WantedBy=default.target
";

/// Written when `~/.config/kanata/config.kbd` is missing, so the service
/// never starts without a layout.
const KANATA_CONFIG: &str = include_str!("../conf/home/kanata/config.kbd");

const DOCKER_ENGINE: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

/// Look up a tool by name for `manager`.
///
/// Returns `None` for unknown names and for managers that are not a system
/// package manager (Flatpak, Snap).
#[must_use]
pub fn installer(name: &str, manager: PackageManager, home: &Path) -> Option<ToolInstaller> {
    if !matches!(manager, PackageManager::Dnf | PackageManager::Apt) {
        return None;
    }
    let apt = manager == PackageManager::Apt;
    let steps = match name {
        "docker-desktop" if apt => docker_desktop_apt(),
        "docker-desktop" => docker_desktop_dnf(),
        "kubectl" if apt => kubectl_apt(),
        "kubectl" => kubectl_dnf(),
        "lens" if apt => lens_apt(),
        "lens" => lens_dnf(),
        "azure-cli" if apt => azure_cli_apt(),
        "azure-cli" => azure_cli_dnf(),
        "vscode" if apt => vscode_apt(),
        "vscode" => vscode_dnf(),
        "kanata" => kanata(home),
        "ghostty" if apt => ghostty_apt(),
        "ghostty" => ghostty_dnf(),
        "tpm" => tpm(home),
        _ => return None,
    };
    Some(ToolInstaller {
        name: name.to_string(),
        marker: marker(name, home)?,
        steps,
    })
}

fn marker(name: &str, home: &Path) -> Option<Probe> {
    Some(match name {
        "docker-desktop" => Probe::PathExists(PathBuf::from("/opt/docker-desktop")),
        "kubectl" => Probe::OnPath("kubectl".into()),
        "lens" => Probe::PathExists(PathBuf::from("/usr/bin/lens-desktop")),
        "azure-cli" => Probe::OnPath("az".into()),
        "vscode" => Probe::OnPath("code".into()),
        "kanata" => Probe::command("systemctl", &["--user", "is-enabled", "kanata.service"]),
        "ghostty" => Probe::OnPath("ghostty".into()),
        "tpm" => Probe::PathExists(tpm_dir(home)),
        _ => return None,
    })
}

fn tpm_dir(home: &Path) -> PathBuf {
    home.join(".tmux/plugins/tpm")
}

fn path(p: &str) -> Probe {
    Probe::PathExists(PathBuf::from(p))
}

fn sudo_write(p: &str, content: &str) -> StepAction {
    StepAction::WriteFile {
        path: PathBuf::from(p),
        content: content.to_string(),
        privileged: true,
    }
}

fn docker_desktop_dnf() -> Vec<Step> {
    let rpm = "/tmp/docker-desktop-x86_64.rpm";
    let mut install_engine = vec!["dnf", "-y", "install"];
    install_engine.extend_from_slice(DOCKER_ENGINE);
    vec![
        Step::new(
            "remove conflicting docker packages",
            Probe::command("rpm", &["-q", "docker-ce"]),
            StepAction::Shell(
                "sudo dnf remove -y docker docker-client docker-client-latest docker-common \
                 docker-latest docker-latest-logrotate docker-logrotate docker-selinux \
                 docker-engine-selinux docker-engine || true"
                    .to_string(),
            ),
        ),
        Step::new(
            "install dnf-plugins-core",
            Probe::command("rpm", &["-q", "dnf-plugins-core"]),
            StepAction::sudo(&["dnf", "-y", "install", "dnf-plugins-core"]),
        ),
        Step::new(
            "add docker-ce repository",
            path("/etc/yum.repos.d/docker-ce.repo"),
            StepAction::sudo(&[
                "dnf-3",
                "config-manager",
                "--add-repo",
                "https://download.docker.com/linux/fedora/docker-ce.repo",
            ]),
        ),
        Step::new(
            "install docker engine",
            Probe::command("rpm", &["-q", "docker-ce"]),
            StepAction::sudo(&install_engine),
        ),
        Step::new(
            "enable docker service",
            Probe::command("systemctl", &["is-enabled", "docker"]),
            StepAction::sudo(&["systemctl", "enable", "--now", "docker"]),
        ),
        Step::new(
            "download docker desktop",
            path(rpm),
            StepAction::Download {
                url: "https://desktop.docker.com/linux/main/amd64/docker-desktop-x86_64.rpm"
                    .to_string(),
                dest: PathBuf::from(rpm),
            },
        ),
        Step::new(
            "install docker desktop",
            path("/opt/docker-desktop"),
            StepAction::sudo(&["dnf", "install", "-y", rpm]),
        ),
        Step::new(
            "remove downloaded package",
            Probe::Always,
            StepAction::run("rm", &["-f", rpm]),
        ),
    ]
}

fn docker_desktop_apt() -> Vec<Step> {
    let deb = "/tmp/docker-desktop-amd64.deb";
    let mut install_engine = vec!["apt-get", "install", "-y"];
    install_engine.extend_from_slice(DOCKER_ENGINE);
    vec![
        Step::new(
            "add docker signing key",
            path("/etc/apt/keyrings/docker.asc"),
            StepAction::Shell(
                "sudo install -m 0755 -d /etc/apt/keyrings && \
                 sudo curl -fsSL https://download.docker.com/linux/ubuntu/gpg -o /etc/apt/keyrings/docker.asc"
                    .to_string(),
            ),
        ),
        Step::new(
            "add docker repository",
            path("/etc/apt/sources.list.d/docker.list"),
            StepAction::Shell(
                "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/etc/apt/keyrings/docker.asc] \
                 https://download.docker.com/linux/ubuntu $(. /etc/os-release && echo \"$VERSION_CODENAME\") stable\" \
                 | sudo tee /etc/apt/sources.list.d/docker.list"
                    .to_string(),
            ),
        ),
        Step::new(
            "refresh package index",
            Probe::command("dpkg", &["-s", "docker-ce"]),
            StepAction::sudo(&["apt-get", "update"]),
        ),
        Step::new(
            "install docker engine",
            Probe::command("dpkg", &["-s", "docker-ce"]),
            StepAction::sudo(&install_engine),
        ),
        Step::new(
            "download docker desktop",
            path(deb),
            StepAction::Download {
                url: "https://desktop.docker.com/linux/main/amd64/docker-desktop-amd64.deb"
                    .to_string(),
                dest: PathBuf::from(deb),
            },
        ),
        Step::new(
            "install docker desktop",
            path("/opt/docker-desktop"),
            StepAction::sudo(&["apt-get", "install", "-y", deb]),
        ),
        Step::new(
            "remove downloaded package",
            Probe::Always,
            StepAction::run("rm", &["-f", deb]),
        ),
    ]
}

fn kubectl_dnf() -> Vec<Step> {
    vec![
        Step::new(
            "add kubernetes repository",
            path("/etc/yum.repos.d/kubernetes.repo"),
            sudo_write("/etc/yum.repos.d/kubernetes.repo", KUBERNETES_REPO),
        ),
        Step::new(
            "install kubectl",
            Probe::OnPath("kubectl".into()),
            StepAction::sudo(&["dnf", "install", "-y", "kubectl"]),
        ),
    ]
}

fn kubectl_apt() -> Vec<Step> {
    vec![
        Step::new(
            "add kubernetes signing key",
            path("/etc/apt/keyrings/kubernetes-apt-keyring.gpg"),
            StepAction::Shell(
                "sudo mkdir -p -m 755 /etc/apt/keyrings && \
                 curl -fsSL https://pkgs.k8s.io/core:/stable:/v1.31/deb/Release.key \
                 | sudo gpg --dearmor -o /etc/apt/keyrings/kubernetes-apt-keyring.gpg"
                    .to_string(),
            ),
        ),
        Step::new(
            "add kubernetes repository",
            path("/etc/apt/sources.list.d/kubernetes.list"),
            sudo_write(
                "/etc/apt/sources.list.d/kubernetes.list",
                "deb [signed-by=/etc/apt/keyrings/kubernetes-apt-keyring.gpg] \
                 https://pkgs.k8s.io/core:/stable:/v1.31/deb/ /\n",
            ),
        ),
        Step::new(
            "install kubectl",
            Probe::OnPath("kubectl".into()),
            StepAction::Shell("sudo apt-get update && sudo apt-get install -y kubectl".to_string()),
        ),
    ]
}

fn lens_dnf() -> Vec<Step> {
    vec![
        Step::new(
            "add lens repository",
            path("/etc/yum.repos.d/lens.repo"),
            StepAction::sudo(&[
                "dnf",
                "config-manager",
                "addrepo",
                "--from-repofile=https://downloads.k8slens.dev/rpm/lens.repo",
            ]),
        ),
        Step::new(
            "install lens",
            path("/usr/bin/lens-desktop"),
            StepAction::sudo(&["dnf", "install", "-y", "lens"]),
        ),
    ]
}

fn lens_apt() -> Vec<Step> {
    vec![
        Step::new(
            "add lens signing key",
            path("/usr/share/keyrings/lens-archive-keyring.gpg"),
            StepAction::Shell(
                "curl -fsSL https://downloads.k8slens.dev/keys/gpg \
                 | sudo gpg --dearmor -o /usr/share/keyrings/lens-archive-keyring.gpg"
                    .to_string(),
            ),
        ),
        Step::new(
            "add lens repository",
            path("/etc/apt/sources.list.d/lens.list"),
            sudo_write(
                "/etc/apt/sources.list.d/lens.list",
                "deb [arch=amd64 signed-by=/usr/share/keyrings/lens-archive-keyring.gpg] \
                 https://downloads.k8slens.dev/apt/debian stable main\n",
            ),
        ),
        Step::new(
            "install lens",
            path("/usr/bin/lens-desktop"),
            StepAction::Shell("sudo apt-get update && sudo apt-get install -y lens".to_string()),
        ),
    ]
}

fn azure_cli_dnf() -> Vec<Step> {
    vec![
        Step::new(
            "import microsoft signing key",
            Probe::Always,
            StepAction::sudo(&[
                "rpm",
                "--import",
                "https://packages.microsoft.com/keys/microsoft.asc",
            ]),
        ),
        Step::new(
            "add microsoft repository",
            path("/etc/yum.repos.d/microsoft-prod.repo"),
            StepAction::sudo(&[
                "dnf",
                "install",
                "-y",
                "https://packages.microsoft.com/config/rhel/9.0/packages-microsoft-prod.rpm",
            ]),
        ),
        Step::new(
            "install azure-cli",
            Probe::OnPath("az".into()),
            StepAction::sudo(&["dnf", "install", "-y", "azure-cli"]),
        ),
    ]
}

fn azure_cli_apt() -> Vec<Step> {
    vec![Step::new(
        "run azure-cli installer",
        Probe::OnPath("az".into()),
        StepAction::Shell("curl -sL https://aka.ms/InstallAzureCLIDeb | sudo bash".to_string()),
    )]
}

fn vscode_dnf() -> Vec<Step> {
    vec![
        Step::new(
            "import microsoft signing key",
            Probe::Always,
            StepAction::sudo(&[
                "rpm",
                "--import",
                "https://packages.microsoft.com/keys/microsoft.asc",
            ]),
        ),
        Step::new(
            "add vscode repository",
            path("/etc/yum.repos.d/vscode.repo"),
            sudo_write("/etc/yum.repos.d/vscode.repo", VSCODE_REPO),
        ),
        Step::new(
            "install code",
            Probe::OnPath("code".into()),
            StepAction::sudo(&["dnf", "install", "-y", "code"]),
        ),
    ]
}

fn vscode_apt() -> Vec<Step> {
    vec![
        Step::new(
            "add microsoft signing key",
            path("/usr/share/keyrings/microsoft.gpg"),
            StepAction::Shell(
                "curl -fsSL https://packages.microsoft.com/keys/microsoft.asc \
                 | sudo gpg --dearmor -o /usr/share/keyrings/microsoft.gpg"
                    .to_string(),
            ),
        ),
        Step::new(
            "add vscode repository",
            path("/etc/apt/sources.list.d/vscode.list"),
            sudo_write(
                "/etc/apt/sources.list.d/vscode.list",
                "deb [arch=amd64 signed-by=/usr/share/keyrings/microsoft.gpg] \
                 https://packages.microsoft.com/repos/code stable main\n",
            ),
        ),
        Step::new(
            "install code",
            Probe::OnPath("code".into()),
            StepAction::Shell("sudo apt-get update && sudo apt-get install -y code".to_string()),
        ),
    ]
}

fn kanata(home: &Path) -> Vec<Step> {
    let unit = home.join(".config/systemd/user/kanata.service");
    let config = home.join(".config/kanata/config.kbd");
    vec![
        Step::new(
            "download kanata",
            Probe::OnPath("kanata".into()),
            StepAction::Download {
                url: "https://github.com/jtroo/kanata/releases/latest/download/kanata".to_string(),
                dest: PathBuf::from("/tmp/kanata"),
            },
        ),
        Step::new(
            "install kanata binary",
            Probe::OnPath("kanata".into()),
            StepAction::sudo(&["install", "-m", "0755", "/tmp/kanata", "/usr/local/bin/kanata"]),
        ),
        Step::new(
            "load uinput module at boot",
            path("/etc/modules-load.d/uinput.conf"),
            sudo_write("/etc/modules-load.d/uinput.conf", "uinput\n"),
        ),
        Step::new(
            "load uinput module",
            Probe::PathExists(PathBuf::from("/sys/module/uinput")),
            StepAction::sudo(&["modprobe", "uinput"]),
        ),
        Step::new(
            "install udev rule",
            path("/etc/udev/rules.d/50-kanata.rules"),
            sudo_write("/etc/udev/rules.d/50-kanata.rules", KANATA_UDEV_RULE),
        ),
        Step::new(
            "reload udev rules",
            Probe::Always,
            StepAction::Shell("sudo udevadm control --reload-rules && sudo udevadm trigger".to_string()),
        ),
        Step::new(
            "write default kanata config",
            Probe::PathExists(config.clone()),
            StepAction::WriteFile {
                path: config,
                content: KANATA_CONFIG.to_string(),
                privileged: false,
            },
        ),
        Step::new(
            "install user service",
            Probe::PathExists(unit.clone()),
            StepAction::WriteFile {
                path: unit,
                content: KANATA_UNIT.to_string(),
                privileged: false,
            },
        ),
        Step::new(
            "reload user units",
            Probe::Always,
            StepAction::run("systemctl", &["--user", "daemon-reload"]),
        ),
        Step::new(
            "enable kanata service",
            Probe::command("systemctl", &["--user", "is-enabled", "kanata.service"]),
            StepAction::run("systemctl", &["--user", "enable", "--now", "kanata.service"]),
        ),
    ]
}

fn ghostty_dnf() -> Vec<Step> {
    vec![
        Step::new(
            "enable ghostty copr",
            Probe::Always,
            StepAction::sudo(&["dnf", "copr", "enable", "-y", "scottames/ghostty"]),
        ),
        Step::new(
            "install ghostty",
            Probe::OnPath("ghostty".into()),
            StepAction::sudo(&["dnf", "install", "-y", "ghostty"]),
        ),
    ]
}

fn ghostty_apt() -> Vec<Step> {
    vec![Step::new(
        "run ghostty installer",
        Probe::OnPath("ghostty".into()),
        StepAction::Shell(
            "/bin/bash -c \"$(curl -fsLS https://raw.githubusercontent.com/mkasberg/ghostty-ubuntu/HEAD/install.sh)\""
                .to_string(),
        ),
    )]
}

fn tpm(home: &Path) -> Vec<Step> {
    let dir = tpm_dir(home);
    vec![Step::new(
        "clone tmux plugin manager",
        Probe::PathExists(dir.clone()),
        StepAction::Run {
            program: "git".to_string(),
            args: vec![
                "clone".to_string(),
                "https://github.com/tmux-plugins/tpm".to_string(),
                dir.to_string_lossy().into_owned(),
            ],
        },
    )]
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves_for_both_managers() {
        let home = Path::new("/home/russ");
        for name in TOOL_NAMES {
            for manager in [PackageManager::Dnf, PackageManager::Apt] {
                let tool = installer(name, manager, home)
                    .unwrap_or_else(|| panic!("{name} missing for {manager}"));
                assert_eq!(tool.name, *name);
                assert!(!tool.steps.is_empty(), "{name} has no steps");
            }
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(installer("emacs", PackageManager::Dnf, Path::new("/home/russ")).is_none());
    }

    #[test]
    fn non_system_manager_is_none() {
        assert!(installer("kubectl", PackageManager::Flatpak, Path::new("/home/russ")).is_none());
    }

    #[test]
    fn docker_desktop_marker_is_opt_directory() {
        let tool = installer("docker-desktop", PackageManager::Dnf, Path::new("/h")).unwrap();
        assert_eq!(
            tool.marker,
            Probe::PathExists(PathBuf::from("/opt/docker-desktop"))
        );
    }

    #[test]
    fn kubectl_dnf_writes_repo_definition() {
        let tool = installer("kubectl", PackageManager::Dnf, Path::new("/h")).unwrap();
        assert!(matches!(
            &tool.steps[0].action,
            StepAction::WriteFile { path, privileged: true, content }
                if path == Path::new("/etc/yum.repos.d/kubernetes.repo")
                    && content.contains("[kubernetes]")
        ));
    }

    #[test]
    fn kanata_unit_lands_in_user_config() {
        let tool = installer("kanata", PackageManager::Apt, Path::new("/home/russ")).unwrap();
        assert!(tool.steps.iter().any(|s| matches!(
            &s.action,
            StepAction::WriteFile { path, privileged: false, .. }
                if path == Path::new("/home/russ/.config/systemd/user/kanata.service")
        )));
        assert!(tool.steps.iter().any(|s| matches!(
            &s.action,
            StepAction::WriteFile { path, privileged: true, .. }
                if path == Path::new("/etc/udev/rules.d/50-kanata.rules")
        )));
    }

    #[test]
    fn kanata_config_is_written_before_the_service_starts() {
        let tool = installer("kanata", PackageManager::Dnf, Path::new("/home/russ")).unwrap();
        let config = Path::new("/home/russ/.config/kanata/config.kbd");
        let position = |description: &str| {
            tool.steps
                .iter()
                .position(|s| s.description == description)
                .unwrap()
        };
        let write = &tool.steps[position("write default kanata config")];
        assert_eq!(write.probe, Probe::PathExists(config.to_path_buf()));
        assert!(matches!(
            &write.action,
            StepAction::WriteFile { path, privileged: false, content }
                if path == config && content.contains("(defsrc")
        ));
        assert!(position("write default kanata config") < position("enable kanata service"));
        assert!(KANATA_UNIT.contains("%h/.config/kanata/config.kbd"));
    }

    #[test]
    fn tpm_clones_into_home() {
        let tool = installer("tpm", PackageManager::Dnf, Path::new("/home/russ")).unwrap();
        assert_eq!(
            tool.marker,
            Probe::PathExists(PathBuf::from("/home/russ/.tmux/plugins/tpm"))
        );
        assert_eq!(
            tool.steps[0].action,
            StepAction::run(
                "git",
                &[
                    "clone",
                    "https://github.com/tmux-plugins/tpm",
                    "/home/russ/.tmux/plugins/tpm"
                ]
            )
        );
    }
}
