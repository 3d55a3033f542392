//! Embeds the commit hash and build date so telemetry posts can identify the
//! reporter build that produced them.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn git_short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!commit.is_empty()).then_some(commit)
}

fn main() {
    // CI sets PORTAL_BUILD_COMMIT / PORTAL_BUILD_DATE; local builds ask git and the clock
    let commit = env::var("PORTAL_BUILD_COMMIT")
        .ok()
        .or_else(git_short_commit)
        .unwrap_or_else(|| "unknown".to_string());

    let date = env::var("PORTAL_BUILD_DATE")
        .unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%d").to_string());

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let generated = format!(
        r#"pub const BUILD_COMMIT: &str = "{commit}";
pub const BUILD_DATE: &str = "{date}";
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " ({commit}, built {date})");
pub const USER_AGENT: &str = concat!("brogue-portal/", env!("CARGO_PKG_VERSION"), " ({commit})");"#
    );
    fs::write(&dest_path, generated).expect("failed to write build_info.rs");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=PORTAL_BUILD_COMMIT");
    println!("cargo:rerun-if-env-changed=PORTAL_BUILD_DATE");
}
