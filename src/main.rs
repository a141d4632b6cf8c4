use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

mod acquisition;
mod analyzer;
mod chrome_time;
mod config;
mod errors;
mod export;
mod history_db;
mod report;
mod search;
mod sink;

use analyzer::ForensicAnalyzer;
use config::{ReportConfig, TimeZoneMode, DEFAULT_SEARCH_LIMIT, DEFAULT_VISITED_LIMIT};
use sink::TeeWriter;

#[derive(Parser)]
#[command(name = "chrome-history-forensics")]
#[command(about = "Chrome Browser History Forensic Analyzer", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of search queries to show per profile
    #[arg(short = 's', long = "search", default_value_t = DEFAULT_SEARCH_LIMIT)]
    search: usize,

    /// Number of visited sites to show per profile
    #[arg(short = 'v', long = "visited", default_value_t = DEFAULT_VISITED_LIMIT)]
    visited: usize,

    /// Output report filename (default: next chrome_history_report_<n>.txt)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Chrome "User Data" directory to analyze
    #[arg(long)]
    profile_root: Option<PathBuf>,

    /// Directory for the working copies of each History database
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Render timestamps in this machine's local time zone instead of UTC
    #[arg(long)]
    local_time: bool,

    /// Also write the extracted evidence as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> ReportConfig {
        let root = self.profile_root.unwrap_or_else(config::default_profile_root);
        let mut config = ReportConfig::with_profile_root(root);
        config.search_limit = self.search;
        config.visited_limit = self.visited;
        config.output_path = self.output;
        config.work_dir = self.work_dir;
        config.json_path = self.json;
        config.time_zone = if self.local_time {
            TimeZoneMode::Local
        } else {
            TimeZoneMode::Utc
        };
        config
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = Cli::parse().into_config();
    debug!("Configuration: {:?}", config);

    let output_path = config.output_path.clone();
    let json_path = config.json_path.clone();
    let profile_root = config.profile_root.clone();
    let time_zone = config.time_zone;

    // Discovery runs before the report file exists, so a missing or empty
    // profile root leaves no report behind.
    let analyzer = match ForensicAnalyzer::discover(config) {
        Ok(analyzer) => analyzer,
        Err(e) if e.is_acquisition_failure() => {
            let mut stdout = io::stdout();
            report::write_banner(&mut stdout, &profile_root, time_zone)?;
            report::write_failure(&mut stdout, &e.to_string())?;
            stdout.flush()?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    info!("Profiles to analyze: {}", analyzer.profiles().len());

    let report_path = match output_path {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
            sink::next_report_path(&cwd)?
        }
    };

    let mut tee = TeeWriter::create(io::stdout(), &report_path)?;
    info!("📝 Writing report to {:?}", tee.path());
    report::write_banner(&mut tee, &profile_root, time_zone)?;
    let mut summary = analyzer.new_summary();
    let outcome = analyzer.run(&mut tee, &mut summary);
    let report_path = tee.finish().context("Failed to flush report")?;
    info!(
        "Analyzed {} profile(s), skipped {}",
        summary.analyzed, summary.skipped
    );

    // Whatever was gathered before a failure is still saved and located.
    if let Some(json_path) = json_path {
        summary.evidence.write_to(&json_path)?;
        println!("🧾 JSON evidence saved to: {}", json_path.display());
    }

    println!("📄 Report saved to: {}", report_path.display());
    outcome
}
