//! Console + file duplicating output
//!
//! Everything the report prints goes through a [`TeeWriter`] so the file on
//! disk matches what the investigator saw on screen.

use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{ForensicsError, ForensicsResult};

pub const REPORT_PREFIX: &str = "chrome_history_report_";
pub const REPORT_EXTENSION: &str = "txt";

pub struct TeeWriter<C: Write> {
    console: C,
    file: BufWriter<File>,
    path: PathBuf,
}

impl<C: Write> TeeWriter<C> {
    /// Create (or truncate) the report file at `path`.
    pub fn create(console: C, path: &Path) -> ForensicsResult<Self> {
        let file = File::create(path)
            .map_err(|e| ForensicsError::io(format!("Failed to create report file {:?}", path), e))?;
        debug!("Report file opened at {:?}", path);
        Ok(Self {
            console,
            file: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush both sides and return where the report was written.
    pub fn finish(mut self) -> io::Result<PathBuf> {
        self.flush()?;
        Ok(self.path.clone())
    }
}

impl<C: Write> Write for TeeWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

impl<C: Write> Drop for TeeWriter<C> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush report {:?}: {}", self.path, e);
        }
    }
}

fn report_name_pattern() -> Regex {
    Regex::new(&format!(
        r"^{}(\d+)\.{}$",
        regex::escape(REPORT_PREFIX),
        regex::escape(REPORT_EXTENSION)
    ))
    .expect("report name pattern is a valid regex")
}

/// Next free auto-numbered report path in `dir`: one past the highest
/// existing number, or 1 when there are none.
pub fn next_report_path(dir: &Path) -> ForensicsResult<PathBuf> {
    let pattern = report_name_pattern();
    let entries = fs::read_dir(dir)
        .map_err(|e| ForensicsError::io(format!("Failed to list {:?}", dir), e))?;

    let mut highest: u64 = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(caps) = pattern.captures(name) {
            if let Ok(n) = caps[1].parse::<u64>() {
                highest = highest.max(n);
            }
        }
    }

    Ok(dir.join(format!(
        "{}{}.{}",
        REPORT_PREFIX,
        highest.saturating_add(1),
        REPORT_EXTENSION
    )))
}
