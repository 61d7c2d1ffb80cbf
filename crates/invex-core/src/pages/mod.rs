//! Page text input.
//!
//! Decoding the source document is left to an external page-text reader.
//! This module accepts its output in two shapes and turns it into ordered,
//! non-blank lines per page:
//!
//! - JSON: an array of pages, each an array of line strings.
//! - Text: lines separated by newlines, pages separated by form feeds
//!   (the layout `pdftotext -layout` produces).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SourceError;

/// Page separator in text input.
pub const PAGE_BREAK: char = '\u{000c}';

/// Shape of a page text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFormat {
    /// JSON array of line arrays.
    Json,
    /// Form-feed separated plain text.
    Text,
}

impl PageFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Text),
            _ => Err(SourceError::UnsupportedFormat(extension)),
        }
    }
}

/// One page of ordered, non-blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: usize,
    /// Lines in document order.
    pub lines: Vec<String>,
}

impl Page {
    pub fn new<I, S>(number: usize, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number,
            lines: lines
                .into_iter()
                .map(Into::into)
                .filter(|l: &String| !l.trim().is_empty())
                .collect(),
        }
    }

    /// Lines joined with newlines.
    pub fn raw_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A source document as a sequence of pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    /// Build a document from per-page line lists.
    pub fn from_pages<P, L, S>(pages: P) -> Self
    where
        P: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, lines)| Page::new(i + 1, lines))
                .collect(),
        }
    }

    /// Parse a JSON array of line arrays.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let pages: Vec<Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::from_pages(pages))
    }

    /// Parse form-feed separated text. A trailing form feed does not start
    /// an extra page.
    pub fn from_text(text: &str) -> Self {
        let mut chunks: Vec<&str> = text.split(PAGE_BREAK).collect();
        if chunks.len() > 1 && chunks.last().is_some_and(|c| c.trim().is_empty()) {
            chunks.pop();
        }

        Self::from_pages(chunks.into_iter().map(|chunk| chunk.lines()))
    }

    /// Parse content in the given format.
    pub fn parse(content: &str, format: PageFormat) -> Result<Self, SourceError> {
        match format {
            PageFormat::Json => Self::from_json(content),
            PageFormat::Text => Ok(Self::from_text(content)),
        }
    }

    /// Load a page text file, detecting the format from its extension.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let format = PageFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let document = Self::parse(&content, format)?;

        debug!(
            "Loaded {} pages from {} ({:?})",
            document.page_count(),
            path.display(),
            format
        );

        Ok(document)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
