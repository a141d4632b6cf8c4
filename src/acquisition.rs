//! History acquisition
//!
//! Locates Chrome profiles under the profile root and makes a working copy of
//! each profile's `History` database. All queries run against the copy so the
//! original evidence is never opened by SQLite.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{ForensicsError, ForensicsResult};

const HISTORY_FILE: &str = "History";
const COPY_PREFIX: &str = "History_copy_";
const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm"];

/// One Chrome profile directory (`Default`, `Profile 1`, ...).
#[derive(Debug, Clone)]
pub struct ProfileHandle {
    pub name: String,
    pub history_path: PathBuf,
    /// Working copy location, distinct per profile.
    pub copied_path: PathBuf,
}

/// Result of copying a profile's history into the work directory.
#[derive(Debug, Clone)]
pub struct AcquiredCopy {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

fn is_profile_dir_name(name: &str) -> bool {
    name == "Default" || name.starts_with("Profile")
}

/// `Default` first, then `Profile N` numerically, then anything else by name.
fn profile_sort_key(name: &str) -> (u8, u64, String) {
    if name == "Default" {
        return (0, 0, String::new());
    }
    match name.trim_start_matches("Profile").trim().parse::<u64>() {
        Ok(n) => (1, n, name.to_string()),
        Err(_) => (2, 0, name.to_string()),
    }
}

fn working_copy_name(profile: &str) -> String {
    let safe: String = profile
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}{}", COPY_PREFIX, safe)
}

/// Enumerate candidate profile directories under `root`.
///
/// Profiles without a `History` file are still returned; the caller decides
/// to skip them via [`ProfileHandle::has_history`].
pub fn discover_profiles(root: &Path, work_dir: &Path) -> ForensicsResult<Vec<ProfileHandle>> {
    if !root.is_dir() {
        return Err(ForensicsError::ProfileRootNotFound(root.to_path_buf()));
    }

    let entries = fs::read_dir(root)
        .map_err(|e| ForensicsError::io(format!("Failed to list {:?}", root), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ForensicsError::io(format!("Failed to list {:?}", root), e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_profile_dir_name(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(ForensicsError::NoProfilesFound(root.to_path_buf()));
    }

    names.sort_by_key(|n| profile_sort_key(n));
    debug!("Found {} candidate profiles in {:?}", names.len(), root);

    Ok(names
        .into_iter()
        .map(|name| ProfileHandle {
            history_path: root.join(&name).join(HISTORY_FILE),
            copied_path: work_dir.join(working_copy_name(&name)),
            name,
        })
        .collect())
}

impl ProfileHandle {
    pub fn has_history(&self) -> bool {
        self.history_path.is_file()
    }

    /// Copy the history database (and any sidecar files) to the working path,
    /// overwriting a previous copy, and verify the copy byte-for-byte.
    pub fn acquire(&self) -> ForensicsResult<AcquiredCopy> {
        if !self.has_history() {
            return Err(ForensicsError::HistoryMissing(self.name.clone()));
        }

        if let Some(parent) = self.copied_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ForensicsError::io(format!("Failed to create work directory {:?}", parent), e)
                })?;
            }
        }

        let bytes = fs::copy(&self.history_path, &self.copied_path).map_err(|e| {
            ForensicsError::io(format!("Failed to copy {:?}", self.history_path), e)
        })?;

        for suffix in SIDECAR_SUFFIXES {
            let source = sidecar_path(&self.history_path, suffix);
            let target = sidecar_path(&self.copied_path, suffix);
            if source.exists() {
                fs::copy(&source, &target)
                    .map_err(|e| ForensicsError::io(format!("Failed to copy {:?}", source), e))?;
            } else if target.exists() {
                // Stale sidecar from an earlier run would corrupt the new copy.
                fs::remove_file(&target).map_err(|e| {
                    ForensicsError::io(format!("Failed to remove stale {:?}", target), e)
                })?;
            }
        }

        let source_digest = sha256_file(&self.history_path)?;
        let copy_digest = sha256_file(&self.copied_path)?;
        if source_digest != copy_digest {
            return Err(ForensicsError::io(
                format!("Working copy of {:?} does not match the original", self.history_path),
                std::io::Error::new(std::io::ErrorKind::InvalidData, "SHA-256 mismatch"),
            ));
        }

        info!(
            "📋 Copied {} history ({} bytes) to {:?}",
            self.name, bytes, self.copied_path
        );

        Ok(AcquiredCopy {
            path: self.copied_path.clone(),
            sha256: copy_digest,
            bytes,
        })
    }
}

fn sidecar_path(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> ForensicsResult<String> {
    let mut file = fs::File::open(path)
        .map_err(|e| ForensicsError::io(format!("Failed to open {:?}", path), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| ForensicsError::io(format!("Failed to read {:?}", path), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
