//! Command runners behind the CLI.
//!
//! Each runner loads the grid file, applies one operation through the
//! library, and writes the result back. Refused mutations are errors so the
//! process exits non-zero and the file is left untouched.
use crate::cli::{
    AddColumnArgs, AddRowArgs, ConfigArgs, DeleteColumnArgs, EnrichArgs, GridArgs, HealthArgs,
    InitArgs, ServiceArgs, SetCellArgs, SetHeaderArgs, ShowArgs,
};
use anyhow::{anyhow, Context, Result};
use gridfill::config::{self, ConfigOverrides, EnrichConfig};
use gridfill::enrich::{
    Coordinator, EnrichOutcome, EnrichSummary, EnrichTransport, HttpTransport,
};
use gridfill::grid::csv::{export_csv, import_csv};
use gridfill::grid::{ops, Grid, Position};
use gridfill::lifecycle;
use gridfill::notify;
use gridfill::store::GridStore;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn run_init(args: InitArgs) -> Result<()> {
    if args.grid.exists() && !args.force {
        return Err(anyhow!(
            "grid already exists at {} (use --force to overwrite)",
            args.grid.display()
        ));
    }
    write_grid(&args.grid, &Grid::initial())?;
    println!("wrote {}", args.grid.display());
    Ok(())
}

pub fn run_show(args: ShowArgs) -> Result<()> {
    let grid = load_grid(&args.grid)?;
    if args.json {
        let text = serde_json::to_string_pretty(&grid).context("serialize grid")?;
        println!("{text}");
    } else {
        print!("{}", render_table(&grid));
    }
    Ok(())
}

pub fn run_add_row(args: AddRowArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    save_grid(&args.grid, &ops::add_row(&grid))
}

pub fn run_add_column(args: AddColumnArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    let next = ops::try_add_column(&grid).context("add column")?;
    save_grid(&args.grid, &next)
}

pub fn run_delete_column(args: DeleteColumnArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    let next = ops::try_delete_column(&grid, args.column)
        .with_context(|| format!("delete column {}", args.column))?;
    save_grid(&args.grid, &next)
}

pub fn run_set_header(args: SetHeaderArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    let next = ops::try_edit_header(&grid, args.column, &args.text)
        .with_context(|| format!("set header of column {}", args.column))?;
    save_grid(&args.grid, &next)
}

pub fn run_set_cell(args: SetCellArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    let next = lifecycle::hand_edit(&grid, Position::new(args.row, args.column), &args.text)
        .with_context(|| format!("set cell ({}, {})", args.row, args.column))?;
    save_grid(&args.grid, &next)
}

#[derive(Debug, Serialize)]
struct EnrichReport<'a> {
    endpoint: &'a str,
    key_column: usize,
    columns: Vec<ColumnReport>,
    grid: &'a Grid,
}

#[derive(Debug, Serialize)]
struct ColumnReport {
    column: usize,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<EnrichSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ColumnReport {
    fn new(column: usize, outcome: &EnrichOutcome) -> Self {
        let summary = match outcome {
            EnrichOutcome::Applied(summary) => Some(summary.clone()),
            _ => None,
        };
        Self {
            column,
            outcome: outcome.as_str(),
            summary,
            error: outcome.error().map(ToString::to_string),
        }
    }
}

/// Enrich every requested column concurrently, one batch call per column.
pub fn run_enrich(args: EnrichArgs) -> Result<()> {
    let grid = load_grid(&args.grid.grid)?;
    let config = resolve_service(&args.service, args.key_column)?;
    let mut columns = Vec::new();
    for wanted in &args.columns {
        let column = resolve_column(&grid, wanted)?;
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    let store = GridStore::new(grid);
    let (sink, receiver) = notify::channel();
    let coordinator = Coordinator::new(HttpTransport::from_config(&config), sink);
    let key_column = config.key_column;

    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = columns
            .iter()
            .map(|&column| {
                let coordinator = &coordinator;
                let store = &store;
                let handle =
                    scope.spawn(move || coordinator.enrich_column(store, column, key_column));
                (column, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(column, handle)| {
                handle
                    .join()
                    .map(|outcome| (column, outcome))
                    .map_err(|_| anyhow!("enrichment of column {column} panicked"))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    for notification in receiver.try_iter() {
        eprintln!("{notification}");
    }

    let grid = store.snapshot();
    save_grid(&args.grid, &grid)?;

    let report = EnrichReport {
        endpoint: &config.endpoint,
        key_column,
        columns: outcomes
            .iter()
            .map(|(column, outcome)| ColumnReport::new(*column, outcome))
            .collect(),
        grid: &grid,
    };
    let text = serde_json::to_string_pretty(&report).context("serialize enrich report")?;
    if let Some(path) = &args.report {
        fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    }
    if args.json {
        println!("{text}");
    }

    let unfinished = outcomes
        .iter()
        .filter(|(_, outcome)| !outcome.is_success())
        .count();
    if unfinished > 0 {
        return Err(anyhow!(
            "{unfinished} of {} column enrichments did not complete",
            outcomes.len()
        ));
    }
    Ok(())
}

pub fn run_health(args: HealthArgs) -> Result<()> {
    let config = resolve_service(&args.service, None)?;
    let transport = HttpTransport::from_config(&config);
    let health = transport
        .health()
        .with_context(|| format!("reach {}", config.endpoint))?;
    if !health.is_healthy() {
        return Err(anyhow!(
            "enrichment service at {} reported status {:?}",
            config.endpoint,
            health.status
        ));
    }
    println!("healthy ({})", config.endpoint);
    Ok(())
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    if args.init {
        let path = match &args.service.config {
            Some(path) => path.clone(),
            None => config::default_config_path()
                .ok_or_else(|| anyhow!("no per-user config directory; pass --config"))?,
        };
        if path.is_file() && !args.force {
            return Err(anyhow!(
                "config already exists at {} (use --force to overwrite)",
                path.display()
            ));
        }
        config::write_config(&path, &config::default_config())?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    let config = resolve_service(&args.service, None)?;
    let text = serde_json::to_string_pretty(&config).context("serialize config")?;
    println!("{text}");
    Ok(())
}

fn resolve_service(args: &ServiceArgs, key_column: Option<usize>) -> Result<EnrichConfig> {
    let overrides = ConfigOverrides {
        endpoint: args.endpoint.clone(),
        timeout_ms: args.timeout_ms,
        key_column,
    };
    config::resolve_config(args.config.as_deref(), &overrides)
}

/// Resolve a column given as a zero-based index or as header text.
fn resolve_column(grid: &Grid, wanted: &str) -> Result<usize> {
    if let Ok(index) = wanted.trim().parse::<usize>() {
        if index < grid.width() {
            return Ok(index);
        }
        return Err(anyhow!(
            "column {index} is out of range (grid has {} columns)",
            grid.width()
        ));
    }
    grid.headers()
        .iter()
        .position(|header| header == wanted)
        .ok_or_else(|| anyhow!("no column with header {wanted:?}"))
}

fn load_grid(path: &Path) -> Result<Grid> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    import_csv(&text).with_context(|| format!("parse grid {}", path.display()))
}

fn save_grid(args: &GridArgs, grid: &Grid) -> Result<()> {
    let path = args.out.as_deref().unwrap_or(&args.grid);
    write_grid(path, grid)?;
    tracing::debug!(
        path = %path.display(),
        rows = grid.height(),
        cols = grid.width(),
        "grid saved"
    );
    Ok(())
}

fn write_grid(path: &Path, grid: &Grid) -> Result<()> {
    let mut text = export_csv(grid).context("render grid as CSV")?;
    text.push('\n');
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))
}

/// Plain-text table with columns padded to their widest value.
fn render_table(grid: &Grid) -> String {
    let widths: Vec<usize> = (0..grid.width())
        .map(|col| {
            let header = grid.header(col).map_or(0, |h| h.chars().count());
            grid.column_values(col)
                .iter()
                .map(|value| value.chars().count())
                .fold(header.max(1), usize::max)
        })
        .collect();
    let line = |values: Vec<&str>| {
        let cells: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect();
        format!("{}\n", cells.join(" | ").trim_end())
    };

    let mut out = line(grid.headers().iter().map(String::as_str).collect());
    out.push_str(&format!(
        "{}\n",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-")
    ));
    for row in grid.rows() {
        out.push_str(&line(row.iter().map(|cell| cell.value.as_str()).collect()));
    }
    out
}
