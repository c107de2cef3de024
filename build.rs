fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags/");

    // "v0.4.0" on a release tag, "v0.4.0-3-gabc1234" after it, bare hash
    // without tags; "-dirty" appended for uncommitted changes.
    let describe = std::process::Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=NOTESITE_GIT_DESCRIBE={describe}");
}
