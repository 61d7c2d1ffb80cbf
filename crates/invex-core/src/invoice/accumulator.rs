//! Record accumulator: folds a page's lines into one raw record.

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::record::{RawLine, RawRecord};

use super::extractor::LineExtractor;
use super::rules::RuleTable;

/// Folds the line extractor over one page, strictly in line order.
#[derive(Debug, Clone, Copy)]
pub struct RecordAccumulator<'a> {
    extractor: LineExtractor<'a>,
}

impl<'a> RecordAccumulator<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Self {
            extractor: LineExtractor::new(rules),
        }
    }

    /// Accumulate one page's lines, starting from an empty record.
    pub fn accumulate<S: AsRef<str>>(&self, lines: &[S]) -> Result<RawRecord, ExtractionError> {
        if lines.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let record = lines
            .iter()
            .enumerate()
            .try_fold(RawRecord::new(), |mut record, (i, line)| {
                let line = RawLine::new(i + 1, line.as_ref());
                self.extractor.extract(line, &record)?.apply_to(&mut record);
                Ok::<_, ExtractionError>(record)
            })?;

        debug!(
            "Accumulated {} fields and {} line items from {} lines",
            record.fields().len(),
            record.line_items().len(),
            lines.len()
        );

        Ok(record)
    }
}
