//! Baseline ("predefined") file loading.
//!
//! A baseline is only trusted once it is known to be an existing, readable
//! regular file; otherwise the comparison for the tier is skipped.

use crate::project::substvar::{self, ParseError, VariableMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("baseline {} does not exist", .path.display())]
    Missing { path: PathBuf },

    #[error("baseline {} is not a regular file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("baseline {} is not readable: {}", .path.display(), .reason)]
    Unreadable { path: PathBuf, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl BaselineError {
    /// True when the path itself is unusable, as opposed to its content
    pub fn is_invalid_path(&self) -> bool {
        !matches!(self, BaselineError::Parse(_))
    }
}

/// Check that `path` exists, is a regular file and can be opened.
pub fn check_baseline_path(path: &Path) -> Result<(), BaselineError> {
    if !path.exists() {
        return Err(BaselineError::Missing {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(BaselineError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|e| BaselineError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Validate and parse a baseline file.
pub fn load_baseline(path: &Path) -> Result<VariableMap, BaselineError> {
    if let Err(e) = check_baseline_path(path) {
        warn!(error = %e, "baseline rejected");
        return Err(e);
    }
    Ok(substvar::parse_file(path)?)
}
