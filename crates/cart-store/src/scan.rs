//! Read-only scans of the token directory and the ledger index.
//!
//! Neither scan fails: a missing directory is an empty result, unreadable
//! token files are skipped, and a broken ledger index is reported in `error`.

use std::fs;
use std::path::Path;

use cart_core::{MemorySearch, now_iso8601};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::memory_source::MemorySource;

pub const LEDGER_INDEX: &str = "index.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenFile {
    pub file: String,
    pub data: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenScan {
    pub timestamp: String,
    pub pattern: Option<String>,
    pub tokens: Vec<TokenFile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerScan {
    pub timestamp: String,
    pub entries: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Memory, token and ledger results for one query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FullSearch {
    pub timestamp: String,
    pub query: String,
    pub brain_results: MemorySearch,
    pub token_results: TokenScan,
    pub ledger_results: LedgerScan,
}

fn token_matches(file: &str, data: &Value, pattern: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let stem = file.strip_suffix(".json").unwrap_or(file).to_lowercase();
    if stem.contains(&pattern) {
        return true;
    }
    data.get("hash")
        .and_then(Value::as_str)
        .is_some_and(|h| h.to_lowercase().contains(&pattern))
}

/// Load every `*.json` file in `dir`, in file-name order. With a pattern,
/// keep tokens whose file stem or `hash` field contains it.
pub fn scan_tokens(dir: &Path, pattern: Option<&str>) -> TokenScan {
    let mut scan = TokenScan {
        timestamp: now_iso8601(),
        pattern: pattern.map(str::to_string),
        tokens: Vec::new(),
    };

    let Ok(entries) = fs::read_dir(dir) else {
        return scan;
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".json"))
        .collect();
    names.sort();

    for name in names {
        let path = dir.join(&name);
        let data: Value = match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("skipping token file {}: {e}", path.display());
                continue;
            }
        };
        if let Some(p) = pattern
            && !p.is_empty()
            && !token_matches(&name, &data, p)
        {
            continue;
        }
        scan.tokens.push(TokenFile { file: name, data });
    }
    scan
}

/// Read `index.json` from the ledger directory.
pub fn read_ledger_index(dir: &Path) -> LedgerScan {
    let mut scan = LedgerScan {
        timestamp: now_iso8601(),
        entries: Value::Array(Vec::new()),
        error: None,
    };

    let path = dir.join(LEDGER_INDEX);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return scan,
        Err(e) => {
            scan.error = Some(format!("Failed to read ledger: {e}"));
            return scan;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => scan.entries = entries,
        Err(e) => {
            tracing::warn!("ledger index {} is malformed: {e}", path.display());
            scan.error = Some(format!("Failed to read ledger: {e}"));
        }
    }
    scan
}

pub fn full_search(
    memory: &MemorySource,
    tokens_dir: &Path,
    ledger_dir: &Path,
    query: &str,
) -> FullSearch {
    FullSearch {
        timestamp: now_iso8601(),
        query: query.to_string(),
        brain_results: memory.search(Some(query)),
        token_results: scan_tokens(tokens_dir, Some(query)),
        ledger_results: read_ledger_index(ledger_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_token_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let scan = scan_tokens(&dir.path().join("token"), None);
        assert!(scan.tokens.is_empty());
    }

    #[test]
    fn test_token_scan_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"hash": "beef", "value": 2}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"hash": "cafe", "value": 1}"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let scan = scan_tokens(dir.path(), None);
        let files: Vec<&str> = scan.tokens.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, vec!["a.json", "b.json"]);
        assert_eq!(scan.tokens[0].data["value"], 1);
    }

    #[test]
    fn test_token_scan_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.json"), r#"{"hash": "DEADbeef"}"#).unwrap();
        fs::write(dir.path().join("two.json"), r#"{"hash": "cafe"}"#).unwrap();
        fs::write(dir.path().join("beef-2.json"), r#"{"value": 3}"#).unwrap();

        let scan = scan_tokens(dir.path(), Some("beef"));
        let files: Vec<&str> = scan.tokens.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, vec!["beef-2.json", "one.json"]);
        assert_eq!(scan.pattern.as_deref(), Some("beef"));
    }

    #[test]
    fn test_ledger_absent() {
        let dir = tempfile::tempdir().unwrap();
        let scan = read_ledger_index(&dir.path().join("ledger"));
        assert_eq!(scan.entries, json!([]));
        assert!(scan.error.is_none());
    }

    #[test]
    fn test_ledger_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(LEDGER_INDEX),
            r#"[{"date": "20260101", "value": 12}]"#,
        )
        .unwrap();
        let scan = read_ledger_index(dir.path());
        assert_eq!(scan.entries[0]["date"], "20260101");
        assert!(scan.error.is_none());
    }

    #[test]
    fn test_ledger_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LEDGER_INDEX), "[1, 2").unwrap();
        let scan = read_ledger_index(dir.path());
        assert!(scan.error.unwrap().starts_with("Failed to read ledger"));
        assert_eq!(scan.entries, json!([]));
    }

    #[test]
    fn test_full_search() {
        let dir = tempfile::tempdir().unwrap();
        let memory = MemorySource::from_text("#====BLOCK====\n# cat nap");
        let result = full_search(
            &memory,
            &dir.path().join("token"),
            &dir.path().join("ledger"),
            "cat",
        );
        assert_eq!(result.query, "cat");
        assert_eq!(result.brain_results.matches.len(), 1);
        assert!(result.token_results.tokens.is_empty());
        assert!(result.ledger_results.error.is_none());
    }
}
