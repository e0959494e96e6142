use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while locating and decoding input spreadsheets.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Input directory {0:?} does not exist")]
    DirectoryNotFound(PathBuf),

    #[error("Input path {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("No worksheet in {0:?}")]
    EmptyWorkbook(PathBuf),

    #[error("Engine '{engine}' does not handle {path:?}")]
    UnsupportedByEngine { engine: &'static str, path: PathBuf },

    #[error("Could not read {path:?} with any engine ({})", format_attempts(.attempts))]
    Unreadable {
        path: PathBuf,
        attempts: Vec<(&'static str, String)>,
    },
}

fn format_attempts(attempts: &[(&'static str, String)]) -> String {
    attempts
        .iter()
        .map(|(engine, message)| format!("{engine}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
