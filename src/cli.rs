use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Extract phytosociological relevés into a pivoted spreadsheet matrix",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Query relevés and write the pivoted matrix to an .xlsx workbook
    Export(ExportArgs),
    /// Render the pivoted matrix as a text table on stdout
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// YAML file with database connection settings (env RELEVE_DB_* overrides)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Read a CSV dump of the relevé view instead of querying the database
    #[arg(short = 'i', long = "input", conflicts_with = "config")]
    pub input: Option<PathBuf>,
    /// Override the schema-qualified view to query
    #[arg(long)]
    pub view: Option<String>,
    /// Comma-separated numéros de relevé (substring match)
    #[arg(long = "releves")]
    pub releves: Option<String>,
    /// Comma-separated observer names (substring match)
    #[arg(long = "observers")]
    pub observers: Option<String>,
    /// Comma-separated survey dates, YYYY-MM-DD (exact match)
    #[arg(long = "dates")]
    pub dates: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output .xlsx file path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Limit number of matrix rows displayed
    #[arg(long)]
    pub limit: Option<usize>,
}
