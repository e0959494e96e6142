pub mod aggregate;
pub mod aliases;
pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod ingest;
pub mod io_utils;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod resolver;
pub mod sheet;
pub mod standardize;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info};

use crate::{
    aliases::{CanonicalSchema, REGION_COLUMN, SUMMARY_TOTAL_COLUMN},
    cli::{Cli, Commands},
    data::display_cell,
    export::ExportOptions,
    ingest::ReadOptions,
    pipeline::BatchConfig,
    standardize::Resolution,
    table::Align,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("region_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let schema = CanonicalSchema::builtin().context("Building canonical schema")?;
    match cli.command {
        Commands::Report(args) => handle_report(&args, &schema),
        Commands::Aliases(args) => handle_aliases(&args, &schema),
        Commands::Preview(args) => handle_preview(&args, &schema),
    }
}

fn handle_report(args: &cli::ReportArgs, schema: &CanonicalSchema) -> Result<()> {
    let config = BatchConfig {
        input_dir: args.input.clone(),
        output_dir: args.output.clone(),
        detail_name: args.detail_name.clone(),
        summary_name: args.summary_name.clone(),
        read: ReadOptions {
            delimiter: args.delimiter,
            encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        },
        export: ExportOptions {
            delimiter: args
                .output_delimiter
                .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER),
            encoding: io_utils::resolve_encoding(args.output_encoding.as_deref())?,
        },
    };
    let outcome = pipeline::run_batch(&config, schema)
        .with_context(|| format!("Processing {:?}", args.input))?;

    if !outcome.has_data() {
        println!("No data to report ({} file(s) found)", outcome.files_found);
        return Ok(());
    }

    let mut rows = outcome
        .summary
        .totals
        .iter()
        .map(|t| vec![t.region.clone(), t.total.to_string()])
        .collect::<Vec<_>>();
    let grand_total = outcome
        .summary
        .grand_total()
        .map_or_else(|| "overflow".to_string(), |total| total.to_string());
    rows.push(vec!["Итого".to_string(), grand_total]);
    print!(
        "{}",
        table::render_aligned(
            &[REGION_COLUMN.to_string(), SUMMARY_TOTAL_COLUMN.to_string()],
            &rows,
            &[Align::Left, Align::Right],
        )
    );
    if let Some(path) = &outcome.detail_path {
        println!("Detail: {}", path.display());
    }
    if let Some(path) = &outcome.summary_path {
        println!("Summary: {}", path.display());
    }
    info!(
        "{} row(s) from {} of {} file(s), {} skipped",
        outcome.report.row_count(),
        outcome.files_read,
        outcome.files_found,
        outcome.skipped.len()
    );
    Ok(())
}

fn handle_aliases(args: &cli::AliasesArgs, schema: &CanonicalSchema) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(schema).context("Serializing schema")?;
        println!("{json}");
        return Ok(());
    }
    let headers = ["#", "field", "aliases", "fallback patterns", "default"]
        .map(String::from)
        .to_vec();
    let rows = schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            vec![
                (idx + 1).to_string(),
                field.canonical_name.clone(),
                field.aliases.join(" | "),
                field.regex_fallbacks.iter().map(|r| r.as_str()).join(" | "),
                field.default_value.clone().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs, schema: &CanonicalSchema) -> Result<()> {
    let options = ReadOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    let (engine, raw) = ingest::read_table(&args.input, &options)?;
    info!("Read {:?} with engine '{}'", args.input, engine.name());
    let canonical = standardize::standardize(raw, &pipeline::region_source_name(&args.input), schema);

    if args.mappings {
        let rows = canonical
            .resolutions
            .iter()
            .map(|(field, resolution)| {
                let source = match resolution {
                    Resolution::Header(header) => format!("column '{header}'"),
                    Resolution::Default(value) => format!("default '{value}'"),
                    Resolution::Missing => "missing".to_string(),
                };
                vec![field.clone(), source]
            })
            .collect::<Vec<_>>();
        table::print_table(&["field".to_string(), "source".to_string()], &rows);
        println!();
    }

    let rows = canonical
        .rows
        .iter()
        .take(args.rows)
        .map(|row| row.iter().map(|cell| display_cell(cell.as_ref())).collect())
        .collect::<Vec<Vec<String>>>();
    table::print_table(&canonical.columns, &rows);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        canonical.row_count(),
        args.input
    );
    Ok(())
}
