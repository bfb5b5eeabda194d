//! End-to-end extraction pipeline.
//!
//! Data flows strictly one way: loader -> row grouper -> detector + field
//! extractor -> scorer -> validator. The run is synchronous, single-threaded,
//! and deterministic; two runs over the same fragment list produce identical
//! records.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ParseWarning, Result};
use crate::extract::detector::SecurityDetector;
use crate::extract::fields::FieldExtractor;
use crate::extract::scorer::score_record;
use crate::layout::RowGrouper;
use crate::loader::FragmentLoader;
use crate::models::config::PortexConfig;
use crate::models::fragment::TextFragment;
use crate::models::security::{ExtractionSummary, SecurityRecord};
use crate::validate::{ValidationReport, Validator};

/// Bookkeeping about one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Fragments fed into the pipeline.
    pub fragments_processed: usize,
    /// Input elements dropped for empty text (JSON entry point only).
    pub skipped_empty: usize,
    /// Input elements dropped as malformed (JSON entry point only).
    pub skipped_malformed: usize,
    /// Pages that contained at least one fragment.
    pub pages_processed: usize,
    /// Wall-clock processing time.
    pub processing_time_ms: u64,
}

/// Complete result of one pipeline run: best-effort records plus the
/// structured reports the caller uses to decide acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Extracted records, complete per the record invariant.
    pub records: Vec<SecurityRecord>,
    /// Summary statistics over the records.
    pub summary: ExtractionSummary,
    /// Non-fatal problems encountered during extraction.
    pub warnings: Vec<ParseWarning>,
    /// Validation report over the final record set.
    pub validation: ValidationReport,
    /// Run bookkeeping.
    pub metadata: RunMetadata,
}

/// The securities extraction pipeline.
pub struct Pipeline {
    loader: FragmentLoader,
    grouper: RowGrouper,
    detector: SecurityDetector,
    extractor: FieldExtractor,
    validator: Validator,
}

impl Pipeline {
    pub fn new(config: PortexConfig) -> Self {
        Self {
            loader: FragmentLoader::new(),
            grouper: RowGrouper::new(config.layout.clone()),
            detector: SecurityDetector::new(config.detector.clone()),
            extractor: FieldExtractor::new(&config.extractor),
            validator: Validator::new(config.validator.clone(), &config.extractor),
        }
    }

    /// Run the pipeline on a raw provider JSON document.
    pub fn run_json(&self, raw: &str) -> Result<PipelineOutput> {
        let loaded = self.loader.load_str(raw)?;
        let mut output = self.run(&loaded.fragments);
        output.metadata.skipped_empty = loaded.skipped_empty;
        output.metadata.skipped_malformed = loaded.skipped_malformed;
        Ok(output)
    }

    /// Run the pipeline on an already-loaded fragment list.
    pub fn run(&self, fragments: &[TextFragment]) -> PipelineOutput {
        let start = Instant::now();
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        // Pages in ascending order for a deterministic record order.
        let mut pages: BTreeMap<u32, Vec<&TextFragment>> = BTreeMap::new();
        for fragment in fragments {
            pages.entry(fragment.page).or_default().push(fragment);
        }

        info!(
            "processing {} fragments across {} pages",
            fragments.len(),
            pages.len()
        );

        let pages_processed = pages.len();
        for (page, page_fragments) in pages {
            self.process_page(page, &page_fragments, &mut records, &mut warnings);
        }

        let summary = ExtractionSummary::compute(&records);
        let validation = self.validator.validate(&records, &summary);

        debug!(
            "extracted {} records, {} warnings",
            records.len(),
            warnings.len()
        );

        PipelineOutput {
            records,
            summary,
            warnings,
            validation,
            metadata: RunMetadata {
                fragments_processed: fragments.len(),
                skipped_empty: 0,
                skipped_malformed: 0,
                pages_processed,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        }
    }

    fn process_page(
        &self,
        page: u32,
        fragments: &[&TextFragment],
        records: &mut Vec<SecurityRecord>,
        warnings: &mut Vec<ParseWarning>,
    ) {
        // When the source provides structural paths, restrict structured
        // parsing to the table substructure.
        let has_paths = fragments.iter().any(|f| f.structural_path.is_some());
        let scoped: Vec<TextFragment> = if has_paths {
            fragments
                .iter()
                .filter(|f| f.in_table())
                .map(|f| (*f).clone())
                .collect()
        } else {
            fragments.iter().map(|f| (*f).clone()).collect()
        };

        let rows = self.grouper.group(&scoped);
        let mut current: Option<SecurityRecord> = None;

        if self.grouper.has_table_rows(&rows) {
            // Narrow rows below the table-row minimum still carry data
            // (identifier or maturity continuation lines), so every row is
            // scanned in top-to-bottom order.
            debug!("page {}: structured table parse", page);
            for row in &rows {
                let text = row.text();
                if let Some(detection) = self.detector.detect(&text) {
                    self.finalize(current.take(), page, records, warnings);
                    let mut record = SecurityRecord::open(detection.name, page);
                    self.extractor.apply(&mut record, &text);
                    current = Some(record);
                } else if let Some(record) = current.as_mut() {
                    self.extractor.apply(record, &text);
                }
            }
        } else {
            // No table structure on this page: plain scan over each fragment
            // in reading order, unpositioned fragments last.
            debug!("page {}: fallback fragment scan", page);
            let mut texts: Vec<&str> = rows
                .iter()
                .flat_map(|r| r.fragments.iter().map(|f| f.text.as_str()))
                .collect();
            texts.extend(
                fragments
                    .iter()
                    .filter(|f| !f.has_bounds)
                    .map(|f| f.text.as_str()),
            );

            for text in texts {
                if let Some(detection) = self.detector.detect(text) {
                    self.finalize(current.take(), page, records, warnings);
                    let mut record = SecurityRecord::open(detection.name, page);
                    self.extractor.apply(&mut record, text);
                    current = Some(record);
                } else if let Some(record) = current.as_mut() {
                    self.extractor.apply(record, text);
                }
            }
        }

        // Page end finalizes the open record; records never span pages.
        self.finalize(current, page, records, warnings);
    }

    fn finalize(
        &self,
        record: Option<SecurityRecord>,
        page: u32,
        records: &mut Vec<SecurityRecord>,
        warnings: &mut Vec<ParseWarning>,
    ) {
        let Some(mut record) = record else {
            return;
        };

        score_record(&mut record);

        if record.is_complete() {
            records.push(record);
        } else {
            warnings.push(ParseWarning::new(
                page,
                format!("dropped incomplete record '{}'", record.name),
            ));
        }
    }
}
