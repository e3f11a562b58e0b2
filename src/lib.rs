pub mod abundance;
pub mod cli;
pub mod config;
pub mod filter;
pub mod matrix;
pub mod pivot;
pub mod render;
pub mod source;
pub mod table;
pub mod xlsx;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, SourceArgs},
    config::DbConfig,
    filter::FilterSpec,
    source::{CsvSource, DataSource, PostgresSource},
    table::Table,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("releve_export", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Export(args) => handle_export(&args),
        Commands::Preview(args) => handle_preview(&args),
    }
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let table = fetch_table(&args.source)?;
    let matrix = matrix::build_matrix(&table).context("Pivoting relevé records")?;
    xlsx::write_matrix(&args.output, &matrix)
        .with_context(|| format!("Writing workbook {:?}", args.output))?;
    info!(
        "Export complete: {} matrix row(s) saved to {:?}",
        matrix.len(),
        args.output
    );
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let table = fetch_table(&args.source)?;
    let mut matrix = matrix::build_matrix(&table).context("Pivoting relevé records")?;
    if let Some(limit) = args.limit {
        matrix.truncate(limit);
    }
    render::print_matrix(&matrix);
    Ok(())
}

fn fetch_table(args: &SourceArgs) -> Result<Table> {
    let filter = FilterSpec::parse(
        args.releves.as_deref(),
        args.observers.as_deref(),
        args.dates.as_deref(),
    )?;
    debug!("Filter: {filter:?}");
    let source = build_source(args)?;
    let table = source.fetch(&filter).context("Fetching relevé records")?;
    info!(
        "Source produced {} row(s) across {} column(s)",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn build_source(args: &SourceArgs) -> Result<Box<dyn DataSource>> {
    if let Some(input) = &args.input {
        info!("Reading relevés offline from {:?}", input);
        return Ok(Box::new(CsvSource::new(input.clone())));
    }
    let mut config = DbConfig::resolve(args.config.as_deref())?;
    if let Some(view) = &args.view {
        config::validate_view_name(view)?;
        config.view = view.clone();
    }
    Ok(Box::new(PostgresSource::new(config)))
}
