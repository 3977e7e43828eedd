//! Workspace layout: locating the application module that owns a tier file.
//!
//! A BusinessWorks workspace keeps the application module next to its
//! `.module`/`.parent` siblings:
//!
//! ```text
//! workspace/
//!   Orders.module/          <- project being analyzed
//!   Orders.parent/
//!   Orders/                 <- application module
//!     META-INF/
//!       IT.substvar
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Directory holding the tier files inside an application module
pub const META_INF: &str = "META-INF";

/// Sibling directories never considered as application modules
const SKIPPED_SUFFIXES: [&str; 2] = [".module", ".parent"];

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no sibling of {} contains {}/{}", .project.display(), META_INF, .file_name)]
    NotFound { project: PathBuf, file_name: String },

    #[error("cannot list siblings of {}: {}", .project.display(), .reason)]
    Unreadable { project: PathBuf, reason: String },
}

/// Find `<sibling>/META-INF/<file_name>` next to `project_dir`.
///
/// Siblings are visited in directory-listing order and the first one that
/// holds the file wins. Directories ending in `.module` or `.parent`
/// (case-insensitive) are skipped; the file name match is exact.
pub fn resolve_tier_file(project_dir: &Path, file_name: &str) -> Result<PathBuf, ResolveError> {
    // `.` and `..` have no useful parent until resolved.
    let project = fs::canonicalize(project_dir).map_err(|e| ResolveError::Unreadable {
        project: project_dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    let parent = project.parent().ok_or_else(|| ResolveError::Unreadable {
        project: project_dir.to_path_buf(),
        reason: "project directory has no parent".to_string(),
    })?;

    let entries = fs::read_dir(parent).map_err(|e| {
        warn!(parent = %parent.display(), error = %e, "cannot read workspace directory");
        ResolveError::Unreadable {
            project: project_dir.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(parent = %parent.display(), error = %e, "skipping unreadable workspace entry");
                continue;
            }
        };
        let candidate = entry.path();
        if !candidate.is_dir() || is_skipped(&entry.file_name().to_string_lossy()) {
            continue;
        }

        if let Some(found) = find_file(&candidate.join(META_INF), file_name) {
            debug!(module = %candidate.display(), file = %found.display(), "resolved tier file");
            return Ok(found);
        }
    }

    Err(ResolveError::NotFound {
        project: project_dir.to_path_buf(),
        file_name: file_name.to_string(),
    })
}

fn is_skipped(dir_name: &str) -> bool {
    let lower = dir_name.to_lowercase();
    SKIPPED_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Exact-name lookup by listing the directory, so the match stays
/// case-sensitive on case-insensitive filesystems.
fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|entry| {
            entry
                .map_err(|e| debug!(dir = %dir.display(), error = %e, "skipping unreadable entry"))
                .ok()
        })
        .find(|e| e.file_name() == file_name && e.path().is_file())
        .map(|e| e.path())
}
