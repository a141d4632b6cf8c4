//! Search query inference from visited URLs
//!
//! Rules are evaluated in order and the first match wins. Each rule pairs a
//! host predicate with an extractor; adding an engine means inserting a rule
//! at the position that gives it the right precedence.

use serde::Serialize;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchEngine {
    Google,
    YouTube,
    Amazon,
    ChatGPT,
}

impl SearchEngine {
    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::Google => "Google",
            SearchEngine::YouTube => "YouTube",
            SearchEngine::Amazon => "Amazon",
            SearchEngine::ChatGPT => "ChatGPT",
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a rule finds the query text.
#[derive(Debug, Clone, Copy)]
enum QuerySource {
    /// First non-blank value of this query parameter.
    Param(&'static str),
    /// The page title; used where the URL carries no query text.
    Title,
}

#[derive(Debug, Clone, Copy)]
struct SearchRule {
    engine: SearchEngine,
    host_contains: &'static str,
    source: QuerySource,
}

const SEARCH_RULES: &[SearchRule] = &[
    SearchRule {
        engine: SearchEngine::Google,
        host_contains: "google.",
        source: QuerySource::Param("q"),
    },
    SearchRule {
        engine: SearchEngine::YouTube,
        host_contains: "youtube.com",
        source: QuerySource::Param("search_query"),
    },
    SearchRule {
        engine: SearchEngine::Amazon,
        host_contains: "amazon.",
        source: QuerySource::Param("k"),
    },
    SearchRule {
        engine: SearchEngine::ChatGPT,
        host_contains: "chatgpt.com",
        source: QuerySource::Title,
    },
];

impl SearchRule {
    fn apply(&self, url: &Url, host: &str, title: &str) -> Option<String> {
        if !host.contains(self.host_contains) {
            return None;
        }
        match self.source {
            QuerySource::Param(key) => first_param(url, key),
            QuerySource::Title if !title.is_empty() => Some(title.to_string()),
            QuerySource::Title => None,
        }
    }
}

/// Only the first value counts when a parameter repeats; blank values are
/// treated as absent.
fn first_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Decide whether a visit was a search, and on which engine.
///
/// Unparseable URLs are simply not searches.
pub fn extract(url: &str, title: &str) -> Option<(SearchEngine, String)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();

    SEARCH_RULES
        .iter()
        .find_map(|rule| rule.apply(&parsed, &host, title).map(|q| (rule.engine, q)))
}

/// Host part of a URL for display, or an empty string when there is none.
///
/// URLs the parser rejects (bad IDNA, out-of-range port) still show their
/// raw authority text.
pub fn display_host(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        },
        Err(_) => raw_authority(url).to_string(),
    }
}

/// Text between `://` and the first `/`, `?` or `#`.
fn raw_authority(url: &str) -> &str {
    match url.find("://") {
        Some(pos) => {
            let rest = &url[pos + 3..];
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            &rest[..end]
        }
        None => "",
    }
}
