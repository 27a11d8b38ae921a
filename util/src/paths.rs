//! Path coercion for exam-authored paths.
//!
//! Authoring tools disagree on path conventions: some omit the drive letter
//! (`\WINDOWS\calc.exe`), some use forward slashes, some hand out paths
//! relative to a base directory chosen at grading time. Everything here is
//! pure string/`PathBuf` manipulation against the grading target's `\`
//! separator convention, so it behaves identically on every host.

use crate::config;
use std::path::{Path, PathBuf};

/// Directory name used to anchor relative exam paths when no base directory
/// was configured for the run. Resolution never fails outright.
pub const DEFAULT_BASE_DIR: &str = "Submissions";

/// True when the path carries an explicit drive marker (`C:`...).
pub fn is_drive_rooted(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// True for UNC paths (`\\server\share` or `//server/share`).
pub fn is_unc(path: &str) -> bool {
    path.starts_with("\\\\") || path.starts_with("//")
}

/// Rewrite an exam-authored path into canonical absolute form:
///
/// - forward slashes become backslashes;
/// - doubled separators collapse (the UNC prefix is preserved);
/// - a leading single separator without a drive marker receives the default
///   drive prefix;
/// - a trailing separator is dropped unless the path is a bare drive root.
///
/// Normalizing an already-normalized path returns it unchanged.
pub fn normalize_exam_path(path: &str, default_drive: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let rewritten = path.replace('/', "\\");
    let unc = rewritten.starts_with("\\\\");
    let body = if unc { &rewritten[2..] } else { &rewritten[..] };

    let mut collapsed = String::with_capacity(body.len());
    let mut prev_sep = false;
    for ch in body.chars() {
        if ch == '\\' {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        collapsed.push(ch);
    }

    let mut normalized = if unc {
        format!("\\\\{collapsed}")
    } else {
        collapsed
    };

    if !unc && normalized.starts_with('\\') {
        normalized = format!("{default_drive}{normalized}");
    }

    while normalized.len() > 3 && normalized.ends_with('\\') {
        normalized.pop();
    }

    normalized
}

/// Resolve an exam-authored path against a submission base directory.
///
/// Drive-rooted and UNC paths pass through normalized; everything else is
/// anchored under `base`, or under `{drive}\Submissions` when no base is
/// configured.
pub fn resolve_target(base: Option<&Path>, raw: &str, default_drive: &str) -> PathBuf {
    let normalized = normalize_exam_path(raw, default_drive);

    if is_drive_rooted(&normalized) || is_unc(&normalized) {
        return PathBuf::from(normalized);
    }

    let mut resolved = match base {
        Some(base) => base.to_path_buf(),
        None => PathBuf::from(format!("{default_drive}\\{DEFAULT_BASE_DIR}")),
    };
    for component in normalized.split('\\').filter(|c| !c.is_empty()) {
        resolved.push(component);
    }
    resolved
}

/// Global submission root (absolute), from `config::submission_root()`.
/// If relative in env, resolve against current_dir().
pub fn submission_root() -> PathBuf {
    let root = config::submission_root();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}
