//! JSON export of extracted evidence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::report::{SearchEvent, VisitedSite};

#[derive(Debug, Serialize)]
pub struct ProfileEvidence {
    pub name: String,
    pub history_sha256: String,
    pub searches: Vec<SearchEvent>,
    pub visits: Vec<VisitedSite>,
}

#[derive(Debug, Serialize)]
pub struct EvidenceExport {
    pub generated_at: DateTime<Utc>,
    pub profile_root: PathBuf,
    pub profiles: Vec<ProfileEvidence>,
}

impl EvidenceExport {
    pub fn new(profile_root: &Path) -> Self {
        Self {
            generated_at: Utc::now(),
            profile_root: profile_root.to_path_buf(),
            profiles: Vec::new(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Failed to serialize evidence")?;
        std::fs::write(path, data).with_context(|| format!("Failed to write JSON export {:?}", path))?;
        Ok(())
    }
}
