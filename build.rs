use std::env;
use std::process::Command;

/// `v<version>` when HEAD carries exactly that tag
fn on_release_tag(version: &str) -> bool {
    Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .is_some_and(|tag| tag.trim() == format!("v{version}"))
}

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Release builds skip git entirely
    let display = if env::var("PROFILE").as_deref() == Ok("release") {
        version
    } else {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/refs/tags");
        if on_release_tag(&version) {
            version
        } else {
            format!("{version}-dev")
        }
    };

    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display}");
}
