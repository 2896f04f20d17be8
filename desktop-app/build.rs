use std::process::Command;

/// Short commit of the tree being built, or `unknown` outside a git checkout.
fn git_short_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    // GIT_COMMIT_HASH goes into the startup log so a bug report names the
    // exact build; editor.html is compiled in through include_str!
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/heads");
    println!("cargo:rerun-if-changed=assets/editor.html");
    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", git_short_hash());
}
