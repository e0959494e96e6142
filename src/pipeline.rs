//! Batch driver: discover → read → standardize → assemble → aggregate →
//! export.
//!
//! Files are processed one at a time in name order. A file that cannot be
//! decoded is logged and skipped; only a bad input directory aborts the run.
//! When no file yields a table the report is [`CombinedReport::Empty`], no
//! output is written and the outcome says so.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};

use crate::{
    aggregate::{self, RegionSummary},
    aliases::CanonicalSchema,
    export::{self, ExportOptions},
    ingest::{self, ReadOptions},
    io_utils,
    report::{self, CombinedReport},
    standardize::{self, CanonicalTable},
};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub detail_name: String,
    pub summary_name: String,
    pub read: ReadOptions,
    pub export: ExportOptions,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub files_found: usize,
    pub files_read: usize,
    pub skipped: Vec<SkippedFile>,
    pub report: CombinedReport,
    pub summary: RegionSummary,
    pub detail_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

impl BatchOutcome {
    pub fn has_data(&self) -> bool {
        !self.report.is_empty()
    }
}

/// Reads and standardizes each file, skipping the ones no engine can decode.
pub fn standardize_files(
    files: &[PathBuf],
    schema: &CanonicalSchema,
    options: &ReadOptions,
) -> (Vec<CanonicalTable>, Vec<SkippedFile>) {
    let mut tables = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();
    for path in files {
        match ingest::read_table(path, options) {
            Ok((engine, raw)) => {
                let table = standardize::standardize(raw, &region_source_name(path), schema);
                if table.is_empty() {
                    warn!("{path:?} has a header row but no data rows");
                }
                info!(
                    "✓ Read {:?} with engine '{}' ({} row(s))",
                    path,
                    engine.name(),
                    table.row_count()
                );
                tables.push(table);
            }
            Err(err) => {
                warn!("✗ Skipping {path:?}: {err}");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    (tables, skipped)
}

pub fn run_batch(config: &BatchConfig, schema: &CanonicalSchema) -> Result<BatchOutcome> {
    let files = ingest::discover_files(&config.input_dir)?;
    info!("Found {} file(s) in {:?}", files.len(), config.input_dir);

    let (tables, skipped) = standardize_files(&files, schema, &config.read);
    let files_read = tables.len();
    let report = report::assemble(tables, schema);
    let summary = aggregate::aggregate(&report);

    let mut outcome = BatchOutcome {
        files_found: files.len(),
        files_read,
        skipped,
        report,
        summary,
        detail_path: None,
        summary_path: None,
    };

    if !outcome.has_data() {
        warn!("No usable data in {:?}; nothing written", config.input_dir);
        return Ok(outcome);
    }
    info!(
        "Combined {} row(s) from {} file(s)",
        outcome.report.row_count(),
        outcome.files_read
    );
    if outcome.summary.skipped_quantities > 0 {
        warn!(
            "{} row(s) had no numeric quantity and were counted as zero",
            outcome.summary.skipped_quantities
        );
    }
    if outcome.summary.out_of_range_quantities > 0 {
        warn!(
            "{} quantity value(s) did not fit a decimal total and were left out",
            outcome.summary.out_of_range_quantities
        );
    }

    let output_dir = export::ensure_output_dir(&config.output_dir)?;
    let detail_path = output_dir.join(&config.detail_name);
    export::write_detail(&outcome.report, &detail_path, &config.export)?;
    let summary_path = output_dir.join(&config.summary_name);
    export::write_summary(&outcome.summary, &summary_path, &config.export)?;
    outcome.detail_path = Some(detail_path);
    outcome.summary_path = Some(summary_path);
    Ok(outcome)
}

/// File name handed to the region cleaner. The cleaner only knows spreadsheet
/// extensions, so `.csv`/`.tsv` inputs pass their stem instead.
pub fn region_source_name(path: &Path) -> String {
    let name = if io_utils::has_delimited_extension(path) {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
