use std::path::PathBuf;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_VISITED_LIMIT: usize = 20;

/// Which clock timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneMode {
    /// Wall-clock UTC, identical on every analysis machine.
    #[default]
    Utc,
    /// The analysing host's local zone, DST included.
    Local,
}

/// Everything a single run needs to know.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub search_limit: usize,
    pub visited_limit: usize,
    /// Explicit report file; `None` picks the next auto-numbered name.
    pub output_path: Option<PathBuf>,
    pub profile_root: PathBuf,
    /// Directory receiving the per-profile working copies.
    pub work_dir: PathBuf,
    pub time_zone: TimeZoneMode,
    pub json_path: Option<PathBuf>,
}

impl ReportConfig {
    pub fn with_profile_root(profile_root: PathBuf) -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            visited_limit: DEFAULT_VISITED_LIMIT,
            output_path: None,
            profile_root,
            work_dir: PathBuf::from("."),
            time_zone: TimeZoneMode::Utc,
            json_path: None,
        }
    }
}

/// Conventional Chrome "User Data" directory for the current platform.
pub fn default_profile_root() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = std::env::var("LOCALAPPDATA").unwrap_or_default();
        PathBuf::from(base).join("Google").join("Chrome").join("User Data")
    }

    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{}/Library/Application Support/Google/Chrome", home))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{}/.config/google-chrome", home))
    }
}
