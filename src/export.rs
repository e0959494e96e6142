use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::{
    aggregate::RegionSummary,
    aliases::{REGION_COLUMN, SUMMARY_TOTAL_COLUMN},
    data::display_cell,
    io_utils,
    report::CombinedReport,
};

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Creates `dir` (and parents) when it does not exist yet.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
    Ok(dir.to_path_buf())
}

/// Writes every report row under a header row. No index column is emitted.
pub fn write_detail(report: &CombinedReport, path: &Path, options: &ExportOptions) -> Result<usize> {
    let mut writer = io_utils::open_csv_writer(path, options.delimiter, options.encoding)?;
    writer
        .write_record(report.columns())
        .with_context(|| format!("Writing header row to {path:?}"))?;
    for (idx, row) in report.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| display_cell(cell.as_ref())))
            .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing {path:?}"))?;
    info!("Wrote {} row(s) to {path:?}", report.row_count());
    Ok(report.row_count())
}

pub fn write_summary(summary: &RegionSummary, path: &Path, options: &ExportOptions) -> Result<usize> {
    let mut writer = io_utils::open_csv_writer(path, options.delimiter, options.encoding)?;
    writer
        .write_record([REGION_COLUMN, SUMMARY_TOTAL_COLUMN])
        .with_context(|| format!("Writing header row to {path:?}"))?;
    for entry in &summary.totals {
        writer
            .write_record([entry.region.as_str(), entry.total.to_string().as_str()])
            .with_context(|| format!("Writing region '{}' to {path:?}", entry.region))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing {path:?}"))?;
    info!("Wrote {} region(s) to {path:?}", summary.totals.len());
    Ok(summary.totals.len())
}
