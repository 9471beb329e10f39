//! CLI argument parsing for grid editing and enrichment.
//!
//! Every command reads a grid from a CSV file and, when it mutates, writes the
//! result back to the same file unless `--out` names another one.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "gridfill",
    version,
    about = "Spreadsheet grid with per-column batch enrichment",
    after_help = "Examples:\n  gridfill init --grid companies.csv\n  gridfill set-header --grid companies.csv --column 0 --text Company\n  gridfill set-cell --grid companies.csv --row 0 --column 0 --text Acme\n  gridfill enrich --grid companies.csv --column Revenue --column CEO\n  gridfill show --grid companies.csv --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Show(ShowArgs),
    AddRow(AddRowArgs),
    AddColumn(AddColumnArgs),
    DeleteColumn(DeleteColumnArgs),
    SetHeader(SetHeaderArgs),
    SetCell(SetCellArgs),
    Enrich(EnrichArgs),
    Health(HealthArgs),
    Config(ConfigArgs),
}

/// CSV file holding the grid.
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Grid CSV file (first line is the header row)
    #[arg(long, value_name = "FILE")]
    pub grid: PathBuf,

    /// Write the result here instead of back to --grid
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Settings for reaching the enrichment service.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Config file (default: <config_dir>/gridfill/config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the enrichment service
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Overall request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Write a fresh 5x5 grid")]
pub struct InitArgs {
    #[arg(long, value_name = "FILE")]
    pub grid: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the grid")]
pub struct ShowArgs {
    #[arg(long, value_name = "FILE")]
    pub grid: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Append an empty row")]
pub struct AddRowArgs {
    #[command(flatten)]
    pub grid: GridArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Append an empty column (at most 5)")]
pub struct AddColumnArgs {
    #[command(flatten)]
    pub grid: GridArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Delete a column (the last one cannot be deleted)")]
pub struct DeleteColumnArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Zero-based column index
    #[arg(long)]
    pub column: usize,
}

#[derive(Parser, Debug)]
#[command(about = "Set a column header")]
pub struct SetHeaderArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Zero-based column index
    #[arg(long)]
    pub column: usize,

    #[arg(long)]
    pub text: String,
}

#[derive(Parser, Debug)]
#[command(about = "Set a cell value by hand")]
pub struct SetCellArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Zero-based row index
    #[arg(long)]
    pub row: usize,

    /// Zero-based column index
    #[arg(long)]
    pub column: usize,

    #[arg(long)]
    pub text: String,
}

#[derive(Parser, Debug)]
#[command(about = "Fill columns from the enrichment service")]
pub struct EnrichArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Column to enrich, by zero-based index or header text (repeatable)
    #[arg(long = "column", value_name = "COLUMN", required = true)]
    pub columns: Vec<String>,

    /// Column whose values name each row's subject
    #[arg(long, value_name = "INDEX")]
    pub key_column: Option<usize>,

    /// Write a JSON report of outcomes and the enriched grid
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Emit the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Check that the enrichment service is reachable")]
pub struct HealthArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Show the resolved config or write a stub")]
pub struct ConfigArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Write a default config file (to --config or the per-user path)
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing config file
    #[arg(long, requires = "init")]
    pub force: bool,
}
