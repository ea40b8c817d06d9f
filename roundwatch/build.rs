use std::env;
use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
        .trim()
        .to_string()
}

fn main() {
    // Release pipelines set these explicitly; local builds ask git.
    let commit = env::var("ROUNDWATCH_GIT_COMMIT").unwrap_or_else(|_| git(&["rev-parse", "--short", "HEAD"]));
    let branch = env::var("ROUNDWATCH_GIT_BRANCH").unwrap_or_else(|_| git(&["rev-parse", "--abbrev-ref", "HEAD"]));

    println!("cargo:rustc-env=GIT_COMMIT={}", commit);
    println!("cargo:rustc-env=GIT_BRANCH={}", branch);

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");
    println!("cargo:rerun-if-env-changed=ROUNDWATCH_GIT_BRANCH");
    println!("cargo:rerun-if-env-changed=ROUNDWATCH_GIT_COMMIT");
}
