//! Block parsing and substring search over accumulated memory text.
//!
//! Accumulated content lives after [`BLOCK_MARKER`] lines; only lines carrying
//! [`LINE_PREFIX`] are kept, prefix stripped. Loading the text is the caller's
//! job, so a missing file is reported through [`MemorySearch::missing`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{BLOCK_MARKER, CATEGORIES, LINE_PREFIX};
use crate::time::now_iso8601;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub lines: Vec<String>,
}

impl MemoryBlock {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub block_index: usize,
    pub line_index: usize,
    pub content: String,
    /// The matching line with up to one neighbour on each side.
    pub context: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_blocks: usize,
    pub total_lines: usize,
    pub categories: BTreeMap<String, usize>,
    pub match_count: usize,
}

/// Result of a memory search. Check `error` before trusting the rest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemorySearch {
    pub timestamp: String,
    pub query: Option<String>,
    pub matches: Vec<SearchMatch>,
    pub stats: SearchStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MemorySearch {
    /// The memory source could not be found; carries `error` instead of stats.
    pub fn missing(query: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            timestamp: now_iso8601(),
            query: query.map(str::to_string),
            matches: Vec::new(),
            stats: SearchStats::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Split memory text into blocks. Lines before the first marker are ignored,
/// blocks without retained lines are dropped, and a trailing block with no
/// closing marker is kept.
pub fn parse_blocks(text: &str) -> Vec<MemoryBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        if line.contains(BLOCK_MARKER) {
            if !current.is_empty() {
                blocks.push(MemoryBlock {
                    lines: std::mem::take(&mut current),
                });
            }
            in_block = true;
            continue;
        }
        if in_block && let Some(rest) = line.strip_prefix(LINE_PREFIX) {
            current.push(rest.to_string());
        }
    }

    if !current.is_empty() {
        blocks.push(MemoryBlock { lines: current });
    }

    blocks
}

/// Case-insensitive substring search over every block line. An absent or empty
/// query matches nothing.
pub fn search(blocks: &[MemoryBlock], query: Option<&str>) -> Vec<SearchMatch> {
    let needle = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return Vec::new(),
    };

    let mut matches = Vec::new();
    for (block_index, block) in blocks.iter().enumerate() {
        for (line_index, line) in block.lines.iter().enumerate() {
            if line.to_lowercase().contains(&needle) {
                let lo = line_index.saturating_sub(1);
                let hi = (line_index + 2).min(block.lines.len());
                matches.push(SearchMatch {
                    block_index,
                    line_index,
                    content: line.clone(),
                    context: block.lines[lo..hi].to_vec(),
                });
            }
        }
    }
    matches
}

/// Count, per fixed category, the lines containing `"# <CATEGORY>"`. All
/// categories are present even at zero.
pub fn category_counts(text: &str) -> BTreeMap<String, usize> {
    let tags: Vec<(String, String)> = CATEGORIES
        .iter()
        .map(|c| (c.to_string(), format!("{LINE_PREFIX}{c}")))
        .collect();

    let mut counts: BTreeMap<String, usize> =
        tags.iter().map(|(name, _)| (name.clone(), 0)).collect();
    for line in text.lines() {
        for (name, tag) in &tags {
            if line.contains(tag.as_str())
                && let Some(n) = counts.get_mut(name)
            {
                *n += 1;
            }
        }
    }
    counts
}

/// Parse, search and summarize loaded memory text in one pass.
pub fn search_text(text: &str, query: Option<&str>) -> MemorySearch {
    let blocks = parse_blocks(text);
    let matches = search(&blocks, query);
    let stats = SearchStats {
        total_blocks: blocks.len(),
        total_lines: text.lines().count(),
        categories: category_counts(text),
        match_count: matches.len(),
    };

    MemorySearch {
        timestamp: now_iso8601(),
        query: query.map(str::to_string),
        matches,
        stats,
        error: None,
    }
}
