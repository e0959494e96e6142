use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_INPUT_DIR: &str = "files";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_DETAIL_NAME: &str = "результат_детально.csv";
pub const DEFAULT_SUMMARY_NAME: &str = "результат.csv";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile shipment spreadsheets onto one schema and total them by region",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Standardize every spreadsheet in a directory and write the detail and region reports
    Report(ReportArgs),
    /// List the canonical fields with their accepted header aliases
    Aliases(AliasesArgs),
    /// Standardize a single file and print the first rows
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Directory holding the source spreadsheets
    #[arg(short = 'i', long = "input", default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,
    /// Directory receiving both reports (created when missing)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,
    /// File name of the row-level export
    #[arg(long = "detail-name", default_value = DEFAULT_DETAIL_NAME)]
    pub detail_name: String,
    /// File name of the region summary export
    #[arg(long = "summary-name", default_value = DEFAULT_SUMMARY_NAME)]
    pub summary_name: String,
    /// Delimiter of .csv/.tsv inputs (defaults by extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter used for both exports
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of .csv/.tsv inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the exports (defaults to utf-8 with a byte-order mark)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AliasesArgs {
    /// Print the schema as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Spreadsheet (or .csv/.tsv) file to standardize
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Also show which source column fed each canonical field
    #[arg(long)]
    pub mappings: bool,
    /// Delimiter of .csv/.tsv inputs (defaults by extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of .csv/.tsv inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

/// Value parser for the delimiter flags: a separator name (`comma`,
/// `semicolon`, `tab`, `pipe`) or one ASCII punctuation or whitespace byte.
/// Letters and digits are refused since they would split quantities and codes.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    let named = match value {
        "comma" => Some(b','),
        "semicolon" => Some(b';'),
        "tab" | "\\t" => Some(b'\t'),
        "pipe" => Some(b'|'),
        _ => None,
    };
    if let Some(byte) = named {
        return Ok(byte);
    }
    match value.as_bytes() {
        [] => Err("Delimiter cannot be empty".to_string()),
        [byte] if byte.is_ascii_alphanumeric() => {
            Err(format!("Delimiter '{value}' would split letters or digits"))
        }
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("Delimiter '{value}' is not a single ASCII character")),
    }
}
