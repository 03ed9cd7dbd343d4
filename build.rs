use std::process::Command;

fn main() {
    // Prefer PROVISION_VERSION if set (release builds), otherwise ask git.
    if let Ok(version) = std::env::var("PROVISION_VERSION") {
        println!("cargo:rustc-env=PROVISION_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=PROVISION_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=PROVISION_VERSION");
}
