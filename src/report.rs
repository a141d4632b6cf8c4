//! Report formatting
//!
//! Every function writes to an injected writer; the caller decides whether
//! that is the terminal, a file, or both.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::chrome_time;
use crate::config::TimeZoneMode;
use crate::history_db::{HistoryDb, VisitRecord};
use crate::search::{self, SearchEngine};

const SEPARATOR_WIDTH: usize = 62;

fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

/// A visit recognised as a search query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEvent {
    pub engine: SearchEngine,
    pub query: String,
    pub timestamp: String,
    pub url: String,
}

/// A visited-sites entry as printed.
#[derive(Debug, Clone, Serialize)]
pub struct VisitedSite {
    pub host: String,
    pub title: String,
    pub visit_count: i64,
    pub timestamp: String,
    pub url: String,
}

pub fn write_banner<W: Write + ?Sized>(out: &mut W, profile_root: &Path, zone: TimeZoneMode) -> Result<()> {
    let zone_label = match zone {
        TimeZoneMode::Utc => "UTC",
        TimeZoneMode::Local => "host local time",
    };
    let inner = SEPARATOR_WIDTH - 2;
    let line = |label: &str, value: &str| {
        let text = format!(" {:<13}: {}", label, value);
        let pad = inner.saturating_sub(text.chars().count());
        format!("║{}{}║", text, " ".repeat(pad))
    };

    writeln!(out)?;
    writeln!(out, "╔{}╗", "═".repeat(inner))?;
    writeln!(out, "║{:^width$}║", "CHROME SEARCH HISTORY ANALYZER (FORENSICS)", width = inner)?;
    writeln!(out, "╠{}╣", "═".repeat(inner))?;
    writeln!(out, "{}", line("OS", std::env::consts::OS))?;
    writeln!(out, "{}", line("Browser", "Google Chrome"))?;
    writeln!(out, "{}", line("Timestamps", zone_label))?;
    writeln!(out, "╚{}╝", "═".repeat(inner))?;
    writeln!(out, "📁 Profile root: {}", profile_root.display())?;
    Ok(())
}

pub fn write_profile_header<W: Write + ?Sized>(out: &mut W, profile: &str, sha256: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "📂 Analyzing Profile: {}", profile)?;
    writeln!(out, "   🔐 History SHA-256: {}", sha256)?;
    Ok(())
}

/// Print a diagnostic line with the failure marker.
pub fn write_failure<W: Write + ?Sized>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "❌ {}", message)?;
    Ok(())
}

pub fn write_warning<W: Write + ?Sized>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "⚠️  {}", message)?;
    Ok(())
}

/// Scan history newest-first and print up to `limit` recognised searches.
///
/// The cap counts printed entries, not scanned rows.
pub fn write_search_history<W: Write + ?Sized>(
    out: &mut W,
    db: &HistoryDb,
    limit: usize,
    zone: TimeZoneMode,
) -> Result<Vec<SearchEvent>> {
    writeln!(out)?;
    writeln!(out, "🔍 SEARCH HISTORY")?;
    writeln!(out, "{}", separator())?;

    let mut events = Vec::new();
    if limit == 0 {
        return Ok(events);
    }

    let mut write_result: std::io::Result<()> = Ok(());
    db.for_each_recent(|record| {
        let Some((engine, query)) = search::extract(&record.url, &record.title) else {
            return true;
        };
        let event = SearchEvent {
            engine,
            query,
            timestamp: chrome_time::decode(record.last_visit_time, zone),
            url: record.url,
        };
        write_result = write_search_entry(out, events.len() + 1, &event);
        if write_result.is_err() {
            return false;
        }
        events.push(event);
        events.len() < limit
    })?;
    write_result?;

    Ok(events)
}

fn write_search_entry<W: Write + ?Sized>(out: &mut W, index: usize, event: &SearchEvent) -> std::io::Result<()> {
    writeln!(out, "[{:02}] 🕒 {}", index, event.timestamp)?;
    writeln!(out, "     🔍 Engine : {}", event.engine)?;
    writeln!(out, "     🔑 Query  : {}", event.query)?;
    writeln!(out, "{}", separator())
}

/// Print the `limit` most recent visits, authentication redirects excluded.
pub fn write_visited_sites<W: Write + ?Sized>(
    out: &mut W,
    db: &HistoryDb,
    limit: usize,
    zone: TimeZoneMode,
) -> Result<Vec<VisitedSite>> {
    writeln!(out)?;
    writeln!(out, "🌐 VISITED WEBSITES (Last {})", limit)?;
    writeln!(out, "{}", separator())?;

    let records = db.recent_sites(limit)?;
    let mut sites = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let site = visited_site(record, zone);
        writeln!(out, "[{:02}] 🕒 {}", i + 1, site.timestamp)?;
        writeln!(out, "     🌍 Site   : {}", site.host)?;
        writeln!(out, "     📄 Title  : {}", site.title)?;
        writeln!(out, "     🔢 Visits : {}", site.visit_count)?;
        writeln!(out, "{}", separator())?;
        sites.push(site);
    }
    Ok(sites)
}

fn visited_site(record: VisitRecord, zone: TimeZoneMode) -> VisitedSite {
    VisitedSite {
        host: search::display_host(&record.url),
        title: record.title,
        visit_count: record.visit_count,
        timestamp: chrome_time::decode(record.last_visit_time, zone),
        url: record.url,
    }
}

pub fn write_completion<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "✔ Forensic Analysis Completed Successfully")?;
    Ok(())
}
