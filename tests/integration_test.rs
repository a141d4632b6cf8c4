// Integration tests for chrome-history-forensics
// Run with: cargo test --test integration_test

use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

// 2024-05-01 09:30:00 UTC in Chrome time
const BASE: i64 = (1_714_555_800 + 11_644_473_600) * 1_000_000;

fn run_cli(cwd: &Path, args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_chrome-history-forensics"))
        .current_dir(cwd)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.success(), stdout, stderr)
}

fn write_history(path: &Path, rows: &[(&str, &str, i64, i64)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE urls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url LONGVARCHAR,
            title LONGVARCHAR,
            visit_count INTEGER DEFAULT 0 NOT NULL,
            typed_count INTEGER DEFAULT 0 NOT NULL,
            last_visit_time INTEGER NOT NULL,
            hidden INTEGER DEFAULT 0 NOT NULL
        );",
    )
    .unwrap();
    for (url, title, visits, time) in rows {
        conn.execute(
            "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![url, title, visits, time],
        )
        .unwrap();
    }
}

fn chrome_root(dir: &Path) -> std::path::PathBuf {
    let root = dir.join("google-chrome");
    let default = root.join("Default");
    fs::create_dir_all(&default).unwrap();
    let mut rows = vec![
        ("https://accounts.google.com/o/oauth2/auth", "Sign in", 1, BASE + 90_000_000),
        ("https://www.google.com/search?q=cats", "cats - Google Search", 3, BASE + 80_000_000),
        ("https://chatgpt.com/c/abc123", "How do I sort a list?", 1, BASE + 70_000_000),
        ("https://docs.rs/serde", "serde - Rust", 7, BASE + 60_000_000),
        ("https://www.youtube.com/results?search_query=rust+tutorial", "YouTube", 2, BASE + 50_000_000),
        ("https://example.com/page", "Home", 1, 0),
    ];
    for i in 0..30 {
        rows.push(("https://www.amazon.com/s?k=keyboard", "Amazon", 1, BASE - i * 1_000_000));
    }
    write_history(&default.join("History"), &rows);
    fs::create_dir_all(root.join("Profile 3")).unwrap();
    root
}

fn reports_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("chrome_history_report_"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_full_report() {
    let tmp = TempDir::new().unwrap();
    let root = chrome_root(tmp.path());

    let (success, stdout, stderr) = run_cli(
        tmp.path(),
        &["--profile-root", root.to_str().unwrap(), "-s", "5", "-v", "3"],
    );
    assert!(success, "stderr: {}", stderr);

    assert!(stdout.contains("📂 Analyzing Profile: Default"));
    assert!(stdout.contains("[01] 🕒 2024-05-01 09:31:20\n     🔍 Engine : Google\n     🔑 Query  : cats"));
    assert!(stdout.contains("     🔑 Query  : How do I sort a list?"));
    assert!(stdout.contains("     🔑 Query  : rust tutorial"));
    assert!(stdout.contains("[05] 🕒"));
    assert!(!stdout.contains("[06] 🕒"));
    assert!(stdout.contains("🌐 VISITED WEBSITES (Last 3)"));
    assert!(stdout.contains("     🌍 Site   : docs.rs"));
    assert!(!stdout.contains("accounts.google"));
    assert!(stdout.contains("Skipping profile Profile 3"));
    assert!(stdout.contains("📄 Report saved to:"));

    // The file holds exactly what went to the terminal, minus the trailing save notice.
    let report = fs::read_to_string(tmp.path().join("chrome_history_report_1.txt")).unwrap();
    assert!(stdout.starts_with(&report));
    assert!(report.contains("✔ Forensic Analysis Completed Successfully"));

    assert!(tmp.path().join("History_copy_Default").exists());
}

#[test]
fn test_auto_numbering_increases() {
    let tmp = TempDir::new().unwrap();
    let root = chrome_root(tmp.path());
    let root = root.to_str().unwrap();

    for _ in 0..3 {
        let (success, _, stderr) = run_cli(tmp.path(), &["--profile-root", root]);
        assert!(success, "stderr: {}", stderr);
    }
    assert_eq!(
        reports_in(tmp.path()),
        vec![
            "chrome_history_report_1.txt",
            "chrome_history_report_2.txt",
            "chrome_history_report_3.txt",
        ]
    );
}

#[test]
fn test_explicit_output_and_json() {
    let tmp = TempDir::new().unwrap();
    let root = chrome_root(tmp.path());

    let (success, stdout, stderr) = run_cli(
        tmp.path(),
        &[
            "--profile-root",
            root.to_str().unwrap(),
            "-o",
            "case42.txt",
            "--json",
            "case42.json",
        ],
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("case42.txt"));
    assert!(reports_in(tmp.path()).is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("case42.json")).unwrap()).unwrap();
    let searches = json["profiles"][0]["searches"].as_array().unwrap();
    assert_eq!(searches.len(), 20);
    assert_eq!(searches[0]["engine"], "Google");
}

#[test]
fn test_missing_root_is_soft_stop() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-chrome-here");

    let (success, stdout, _) = run_cli(tmp.path(), &["--profile-root", missing.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains(&format!("❌ Chrome directory not found: {}\n", missing.display())));
    assert!(!stdout.contains("🔍 SEARCH HISTORY"));
    assert!(reports_in(tmp.path()).is_empty());
}

#[test]
fn test_no_profiles_creates_no_report() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("google-chrome");
    fs::create_dir_all(root.join("Crashpad")).unwrap();

    let (success, stdout, _) = run_cli(tmp.path(), &["--profile-root", root.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("❌ No Chrome profiles found"));
    assert!(reports_in(tmp.path()).is_empty());
}

#[test]
fn test_corrupt_history_reports_path() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("google-chrome");
    fs::create_dir_all(root.join("Default")).unwrap();
    fs::write(
        root.join("Default").join("History"),
        b"this is not an sqlite database but it is long enough to look like one",
    )
    .unwrap();

    let (success, stdout, _) = run_cli(
        tmp.path(),
        &["--profile-root", root.to_str().unwrap(), "--json", "partial.json"],
    );
    assert!(!success);
    assert!(stdout.contains("📄 Report saved to:"));
    assert!(stdout.contains("🧾 JSON evidence saved to: partial.json"));

    let reports = reports_in(tmp.path());
    assert_eq!(reports, vec!["chrome_history_report_1.txt".to_string()]);
    let report = fs::read_to_string(tmp.path().join(&reports[0])).unwrap();
    assert!(report.contains("❌ Failed to read history database"));
    assert!(!report.contains("Completed Successfully"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("partial.json")).unwrap()).unwrap();
    assert!(json["profiles"].as_array().unwrap().is_empty());
}

#[test]
fn test_help_lists_flags() {
    let tmp = TempDir::new().unwrap();
    let (_, stdout, stderr) = run_cli(tmp.path(), &["--help"]);
    let combined = format!("{}{}", stdout, stderr);
    assert!(combined.contains("--search"));
    assert!(combined.contains("--visited"));
    assert!(combined.contains("--output"));
}
