//! Build script for music-lib
//!
//! Stamps the startup banner in `main.rs` with the build it came from:
//! commit (`GIT_HASH`), UTC build time (`BUILD_TIMESTAMP`) and cargo
//! profile (`BUILD_PROFILE`). Container builds without a `.git` directory
//! can pass `MUSIC_LIB_GIT_HASH` instead.

use std::process::Command;

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn main() {
    let commit = std::env::var("MUSIC_LIB_GIT_HASH")
        .ok()
        .filter(|hash| !hash.is_empty())
        .or_else(git_hash)
        .unwrap_or_else(|| "unknown".to_string());

    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", commit);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-env-changed=MUSIC_LIB_GIT_HASH");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
