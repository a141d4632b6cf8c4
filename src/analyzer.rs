//! Per-profile analysis pipeline
//!
//! Profiles are processed one at a time: copy, verify, open, then print the
//! search section followed by the visited-sites section.

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::acquisition::{self, ProfileHandle};
use crate::config::ReportConfig;
use crate::errors::{ForensicsError, ForensicsResult};
use crate::export::{EvidenceExport, ProfileEvidence};
use crate::history_db::HistoryDb;
use crate::report;

#[derive(Debug)]
pub struct ForensicAnalyzer {
    config: ReportConfig,
    profiles: Vec<ProfileHandle>,
}

/// What a run produced. Filled in as profiles complete, so it stays usable
/// when the run stops early.
#[derive(Debug)]
pub struct RunSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub evidence: EvidenceExport,
}

impl RunSummary {
    pub fn new(profile_root: &Path) -> Self {
        Self {
            analyzed: 0,
            skipped: 0,
            evidence: EvidenceExport::new(profile_root),
        }
    }
}

impl ForensicAnalyzer {
    /// Locate profiles. Fails without touching any output when the profile
    /// root is missing or empty.
    pub fn discover(config: ReportConfig) -> ForensicsResult<Self> {
        let profiles = acquisition::discover_profiles(&config.profile_root, &config.work_dir)?;
        info!("🔍 Found {} Chrome profile(s)", profiles.len());
        Ok(Self { config, profiles })
    }

    pub fn profiles(&self) -> &[ProfileHandle] {
        &self.profiles
    }

    pub fn new_summary(&self) -> RunSummary {
        RunSummary::new(&self.config.profile_root)
    }

    /// Analyze every profile, writing the report body to `out` and recording
    /// progress in `summary`.
    ///
    /// A storage failure is reported through `out` and then returned; the
    /// remaining profiles are not processed, but `summary` keeps the profiles
    /// finished before it.
    pub fn run<W: Write + ?Sized>(&self, out: &mut W, summary: &mut RunSummary) -> Result<()> {
        for profile in &self.profiles {
            match self.analyze_profile(out, profile) {
                Ok(evidence) => {
                    summary.analyzed += 1;
                    summary.evidence.profiles.push(evidence);
                }
                Err(e) => match e.downcast_ref::<ForensicsError>() {
                    Some(ForensicsError::HistoryMissing(name)) => {
                        debug!("Skipping profile {}", name);
                        report::write_warning(out, &format!("Skipping profile {}: no History file", name))?;
                        summary.skipped += 1;
                    }
                    Some(err) => {
                        report::write_failure(out, &err.to_string())?;
                        out.flush()?;
                        return Err(e);
                    }
                    None => return Err(e),
                },
            }
        }

        if summary.analyzed == 0 {
            warn!("No profile had a History database");
            report::write_failure(out, "No Chrome History database found in any profile")?;
        } else {
            report::write_completion(out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn analyze_profile<W: Write + ?Sized>(&self, out: &mut W, profile: &ProfileHandle) -> Result<ProfileEvidence> {
        let copy = profile.acquire()?;
        let db = HistoryDb::open(&copy.path)?;

        report::write_profile_header(out, &profile.name, &copy.sha256)?;
        let zone = self.config.time_zone;
        let searches = report::write_search_history(out, &db, self.config.search_limit, zone)?;
        let visits = report::write_visited_sites(out, &db, self.config.visited_limit, zone)?;
        info!(
            "✅ {}: {} searches, {} visited sites ({} bytes analysed)",
            profile.name,
            searches.len(),
            visits.len(),
            copy.bytes
        );

        Ok(ProfileEvidence {
            name: profile.name.clone(),
            history_sha256: copy.sha256,
            searches,
            visits,
        })
    }
}
