use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-changed=../../version");

    let version = std::fs::read_to_string("../../version")?;
    println!("cargo:rustc-env=VERSION={}", version.trim());

    // empty outside of a git checkout
    let commit = Command::new("git")
        .args(["log", "-1", "--date=short", "--pretty=format:%h %cd"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
        .unwrap_or_default();

    println!("cargo:rustc-env=COMMIT={commit}");

    Ok(())
}
