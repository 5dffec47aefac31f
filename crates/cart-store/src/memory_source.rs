use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cart_core::{MemorySearch, search_text};

use crate::error::Result;

enum Source {
    File(PathBuf),
    Text(String),
}

/// Where accumulated memory text comes from.
pub struct MemorySource {
    source: Source,
}

impl MemorySource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: Source::Text(text.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Text(_) => None,
        }
    }

    /// The full text, or `None` when the file does not exist.
    pub fn read(&self) -> Result<Option<String>> {
        match &self.source {
            Source::File(path) => match fs::read_to_string(path) {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            Source::Text(text) => Ok(Some(text.clone())),
        }
    }

    /// Search the memory text. Failures come back in the result's `error` field.
    pub fn search(&self, query: Option<&str>) -> MemorySearch {
        match self.read() {
            Ok(Some(text)) => search_text(&text, query),
            Ok(None) => MemorySearch::missing(query, format!("{} not found", self.label())),
            Err(e) => MemorySearch::missing(query, format!("failed to read {}: {e}", self.label())),
        }
    }

    fn label(&self) -> String {
        match &self.source {
            Source::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Source::Text(_) => "memory text".to_string(),
        }
    }
}
