use std::env;
use std::process::Command;

fn main() {
    // Stamped into `oa-addons --version`
    println!("cargo:rustc-env=GIT_HASH={}", short_commit());
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // musl targets link libgit2 and OpenSSL statically
    if env::var("TARGET").map_or(false, |target| target.contains("musl")) {
        println!("cargo:rustc-link-arg=-static");
    }
}

fn short_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
