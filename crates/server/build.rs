use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());

    if let Some(git_dir) = find_git_dir(&manifest_dir) {
        watch_head(&git_dir);
    }

    let revision = git_revision(&manifest_dir).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=DAYLOG_GIT_REV={revision}");
}

fn find_git_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".git"))
        .find(|candidate| candidate.is_dir())
}

/// Rebuild when HEAD moves, either by checkout or by a new commit on the
/// current branch.
fn watch_head(git_dir: &Path) {
    let head = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head.display());

    let Ok(head_ref) = std::fs::read_to_string(&head) else {
        return;
    };
    if let Some(target) = head_ref.strip_prefix("ref: ") {
        let ref_path = git_dir.join(target.trim());
        if ref_path.exists() {
            println!("cargo:rerun-if-changed={}", ref_path.display());
        }
    }
}

fn git_revision(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty", "--always"])
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let label = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!label.is_empty()).then_some(label)
}
