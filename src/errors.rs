//! Error taxonomy for history acquisition and querying

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForensicsError {
    /// The Chrome profile root does not exist. Fatal for the whole run.
    #[error("Chrome directory not found: {}", .0.display())]
    ProfileRootNotFound(PathBuf),

    /// The profile root exists but holds no `Default` / `Profile*` directory.
    #[error("No Chrome profiles found in {}", .0.display())]
    NoProfilesFound(PathBuf),

    /// A profile directory without a `History` file. Skipped, not fatal.
    #[error("Profile '{0}' has no History file")]
    HistoryMissing(String),

    /// The working copy could not be opened or queried.
    #[error("Failed to read history database {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ForensicsError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ForensicsError::Io {
            context: context.into(),
            source,
        }
    }

    /// Acquisition failures end the run before any report section is produced.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            ForensicsError::ProfileRootNotFound(_) | ForensicsError::NoProfilesFound(_)
        )
    }
}

pub type ForensicsResult<T> = std::result::Result<T, ForensicsError>;
