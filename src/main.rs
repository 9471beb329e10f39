use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Init(args) => commands::run_init(args),
        Command::Show(args) => commands::run_show(args),
        Command::AddRow(args) => commands::run_add_row(args),
        Command::AddColumn(args) => commands::run_add_column(args),
        Command::DeleteColumn(args) => commands::run_delete_column(args),
        Command::SetHeader(args) => commands::run_set_header(args),
        Command::SetCell(args) => commands::run_set_cell(args),
        Command::Enrich(args) => commands::run_enrich(args),
        Command::Health(args) => commands::run_health(args),
        Command::Config(args) => commands::run_config(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "gridfill=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
