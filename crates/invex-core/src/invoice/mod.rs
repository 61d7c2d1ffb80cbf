//! Invoice page extraction module.
//!
//! Each page goes through the same pipeline: lines are folded into a raw
//! record by the [`RecordAccumulator`], and the raw record is sanitized into
//! a [`FinalRecord`]. Pages share nothing but the immutable rule table, so
//! they can be processed in any order or concurrently.

mod accumulator;
mod extractor;
pub mod rules;

pub use accumulator::RecordAccumulator;
pub use extractor::{LineDelta, LineExtractor};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, ExtractionError};
use crate::models::config::InvexConfig;
use crate::models::record::{FinalRecord, RawRecord};
use crate::pages::{Document, Page};
use crate::sanitize::sanitize_record;

use rules::RuleTable;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result of extracting one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Page number (1-indexed).
    pub page: usize,
    /// Sanitized record.
    pub record: FinalRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Outcome of one page within a document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    /// Page number (1-indexed).
    pub page: usize,
    /// Extracted page or the reason it failed.
    pub result: Result<ExtractionResult>,
}

/// Per-page outcomes of a document, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentReport {
    pub outcomes: Vec<PageOutcome>,
}

impl DocumentReport {
    /// Records of the pages that succeeded.
    pub fn records(&self) -> impl Iterator<Item = &FinalRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| &r.record)
    }

    /// Pages that failed and why.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ExtractionError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.page, e)))
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn into_records(self) -> Vec<FinalRecord> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .map(|r| r.record)
            .collect()
    }
}

/// Page parser bound to one rule table.
#[derive(Debug, Clone, Default)]
pub struct InvoiceParser {
    rules: RuleTable,
    attach_raw_text: bool,
}

impl InvoiceParser {
    /// Create a parser for a rule table.
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            attach_raw_text: false,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &InvexConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(RuleTable::from_config(&config.rules)?)
            .with_raw_text(config.output.attach_raw_text))
    }

    /// Attach the joined page text to each record as `rawText`.
    pub fn with_raw_text(mut self, attach: bool) -> Self {
        self.attach_raw_text = attach;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Accumulate a page's lines without sanitizing.
    pub fn extract_raw<S: AsRef<str>>(&self, lines: &[S]) -> Result<RawRecord> {
        RecordAccumulator::new(&self.rules).accumulate(lines)
    }

    /// Accumulate and sanitize a page's lines.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<FinalRecord> {
        let raw = self.extract_raw(lines)?;
        Ok(sanitize_record(&raw))
    }

    /// Parse one page.
    pub fn parse_page(&self, page: &Page) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        debug!("Parsing page {} ({} lines)", page.number, page.lines.len());

        let raw = self.extract_raw(page.lines.as_slice())?;
        if raw.fields().is_empty() {
            warnings.push("No fields matched".to_string());
        }
        if raw.line_items().is_empty() {
            warnings.push("No line items matched".to_string());
        }

        let mut record = sanitize_record(&raw);
        if self.attach_raw_text {
            record = record.with_raw_text(page.raw_text());
        }

        Ok(ExtractionResult {
            page: page.number,
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Parse every page of a document. A failing page is recorded in the
    /// report and does not stop the remaining pages.
    pub fn parse_document(&self, document: &Document) -> DocumentReport {
        info!("Parsing document with {} pages", document.page_count());

        let outcomes: Vec<PageOutcome> = document
            .pages()
            .iter()
            .map(|page| {
                let result = self.parse_page(page);
                if let Err(e) = &result {
                    warn!("Page {} failed: {}", page.number, e);
                }
                PageOutcome {
                    page: page.number,
                    result,
                }
            })
            .collect();

        let report = DocumentReport { outcomes };
        debug!(
            "Document parsed: {} pages ok, {} failed",
            report.success_count(),
            report.failure_count()
        );
        report
    }
}
