//! Input discovery and spreadsheet decoding.
//!
//! [`discover_files`] lists the data files of the input directory in name
//! order. [`read_table`] tries each [`Engine`] of [`ENGINE_ORDER`] in turn and
//! keeps the first successful decode; a file that no engine can read is
//! reported as [`IngestError::Unreadable`] and left to the caller to skip.

use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Ods, Reader, Xls, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{
    data::{Value, text_cell},
    error::IngestError,
    io_utils,
    sheet::RawTable,
};

const IGNORED_FILES: &[&str] = &[".DS_Store"];
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Xlsx,
    Xls,
    Ods,
    Delimited,
}

pub const ENGINE_ORDER: [Engine; 4] = [Engine::Xlsx, Engine::Xls, Engine::Ods, Engine::Delimited];

/// Options for the delimited engine; spreadsheets ignore them.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::Xlsx => "xlsx",
            Engine::Xls => "xls",
            Engine::Ods => "ods",
            Engine::Delimited => "delimited",
        }
    }

    pub fn read(self, path: &Path, options: &ReadOptions) -> Result<RawTable> {
        match self {
            Engine::Xlsx => read_workbook::<Xlsx<BufReader<File>>>(path),
            Engine::Xls => read_workbook::<Xls<BufReader<File>>>(path),
            Engine::Ods => read_workbook::<Ods<BufReader<File>>>(path),
            Engine::Delimited => read_delimited(path, options),
        }
    }
}

/// Data files directly under `dir`, sorted by file name.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(IngestError::DirectoryNotFound(dir.to_path_buf()).into());
    }
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory(dir.to_path_buf()).into());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Listing directory {dir:?}"))? {
        let entry = entry.with_context(|| format!("Listing directory {dir:?}"))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_FILES.contains(&name.as_str()) || name.starts_with(LOCK_FILE_PREFIX) {
            debug!("Ignoring {path:?}");
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Decodes `path` with the first engine that succeeds.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<(Engine, RawTable), IngestError> {
    let mut attempts = Vec::new();
    for engine in ENGINE_ORDER {
        match engine.read(path, options) {
            Ok(table) => {
                debug!("Read {path:?} with engine '{}'", engine.name());
                return Ok((engine, table));
            }
            Err(err) => {
                debug!("Engine '{}' failed on {path:?}: {err:#}", engine.name());
                attempts.push((engine.name(), format!("{err:#}")));
            }
        }
    }
    warn!("No engine could read {path:?}");
    Err(IngestError::Unreadable {
        path: path.to_path_buf(),
        attempts,
    })
}

fn read_workbook<R>(path: &Path) -> Result<RawTable>
where
    R: Reader<BufReader<File>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = open_workbook(path).map_err(|err| anyhow!("{err}"))?;
    let sheet_name = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| anyhow!("Sheet '{sheet_name}': {err}"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row.iter().map(|cell| cell.to_string()).collect();
    Ok(RawTable::new(
        headers,
        rows.map(|row| row.iter().map(cell_value).collect()),
    ))
}

fn read_delimited(path: &Path, options: &ReadOptions) -> Result<RawTable> {
    if !io_utils::has_delimited_extension(path) {
        return Err(IngestError::UnsupportedByEngine {
            engine: Engine::Delimited.name(),
            path: path.to_path_buf(),
        }
        .into());
    }
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, options.encoding)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading header row of {path:?}"))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", idx + 2))?;
        rows.push(record.iter().map(text_cell).collect());
    }
    Ok(RawTable::new(headers, rows))
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::Text(s.clone())),
        Data::Int(i) => Some(Value::Integer(*i)),
        Data::Float(f) => Some(Value::Float(*f)),
        Data::Bool(b) => Some(Value::Boolean(*b)),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(Value::DateTime)
                .unwrap_or_else(|| Value::Float(dt.as_f64())),
        ),
        Data::DateTimeIso(s) => Some(parse_iso(s)),
        Data::DurationIso(s) => Some(Value::Text(s.clone())),
        Data::Error(err) => {
            debug!("Cell error {err:?} read as empty");
            None
        }
    }
}

fn parse_iso(raw: &str) -> Value {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Value::DateTime(dt)
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Value::Date(date)
    } else {
        Value::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_files_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["Омск.xlsx", ".DS_Store", "~$Омск.xlsx", "ЕКБ.xlsx"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("archive")).unwrap();

        let files = discover_files(dir.path()).unwrap();
        let names = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["ЕКБ.xlsx", "Омск.xlsx"]);
    }

    #[test]
    fn discover_files_rejects_missing_and_non_directories() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_files(&missing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::DirectoryNotFound(_))
        ));

        let file = dir.path().join("file.xlsx");
        fs::write(&file, b"").unwrap();
        let err = discover_files(&file).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::NotADirectory(_))
        ));
    }

    #[test]
    fn read_table_falls_back_to_delimited_engine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ЕКБ.csv");
        fs::write(&path, "Дата,Кол-во\n2024-01-05 08:00:00,1.5\n,\n").unwrap();

        let (engine, table) = read_table(&path, &ReadOptions::default()).unwrap();
        assert_eq!(engine, Engine::Delimited);
        assert_eq!(table.headers, vec!["Дата", "Кол-во"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 1), Some(&Value::Text("1.5".into())));
    }

    #[test]
    fn read_table_reports_every_engine_when_all_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"not a workbook").unwrap();

        match read_table(&path, &ReadOptions::default()) {
            Err(IngestError::Unreadable { attempts, .. }) => {
                let engines = attempts.iter().map(|(name, _)| *name).collect::<Vec<_>>();
                assert_eq!(engines, vec!["xlsx", "xls", "ods", "delimited"]);
            }
            other => panic!("expected unreadable error, got {other:?}"),
        }
    }

    #[test]
    fn cell_value_maps_spreadsheet_cells() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String(String::new())), None);
        assert_eq!(cell_value(&Data::Int(4)), Some(Value::Integer(4)));
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-03-01T10:30:00".into())),
            Some(Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(10, 30, 0)
                    .unwrap()
            ))
        );
    }
}
