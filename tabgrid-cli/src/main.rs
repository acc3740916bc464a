//! tabgrid demo
//!
//! Renders a sample file listing through the grid engine as plain text.
//!
//! # Usage
//!
//! ```bash
//! # Header and footer, sized to fit the content
//! tabgrid --headers --footers --mode fit-all
//!
//! # Sort by size twice (descending), show the first 10 rows
//! tabgrid --headers --sort size --sort size --visible 10
//!
//! # Load a GridConfig from JSON and log to a file
//! tabgrid --config grid.json --log tabgrid.log
//! ```

mod error;
mod sample;
mod text_host;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use simplelog::{Config, LevelFilter, WriteLogger};
use tabgrid::prelude::*;
use tabgrid::GridError;

use crate::error::CliError;
use crate::sample::{FileColumn, SampleData, SampleLayout, SampleSorter};
use crate::text_host::TextHost;

type Grid = GridController<FileColumn, SampleData, TextHost<FileColumn>>;

#[derive(Parser, Debug)]
#[command(name = "tabgrid")]
#[command(version)]
#[command(about = "Render a sample table through the tabgrid engine")]
struct Cli {
    /// Number of sample rows
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u64).range(0..=10_000))]
    rows: u64,

    /// Available width in terminal columns
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Spacing between columns
    #[arg(long)]
    gap: Option<f64>,

    /// Column sizing mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Show the header row
    #[arg(long)]
    headers: bool,

    /// Show the footer row
    #[arg(long)]
    footers: bool,

    /// Sort by a column; repeat to toggle the direction
    #[arg(long, value_enum)]
    sort: Vec<SortColumn>,

    /// Only the first N rendered rows are visible
    #[arg(long)]
    visible: Option<usize>,

    /// GridConfig as JSON. Flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write debug logs to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Equal,
    Custom,
    FitVisible,
    FitAll,
}

impl From<Mode> for SizingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Equal => SizingMode::EqualWidths,
            Mode::Custom => SizingMode::CustomWidths,
            Mode::FitVisible => SizingMode::FitVisibleContent,
            Mode::FitAll => SizingMode::FitAllContent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SortColumn {
    Name,
    Size,
    Owner,
    Kind,
}

impl From<SortColumn> for FileColumn {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => FileColumn::Name,
            SortColumn::Size => FileColumn::Size,
            SortColumn::Owner => FileColumn::Owner,
            SortColumn::Kind => FileColumn::Kind,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(path) = &cli.log {
        WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(path)?)?;
    }

    let controller = build(cli)?;
    let mut out = io::stdout().lock();
    render(&controller, &mut out)?;
    out.flush()?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GridConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(BufReader::new(file)).map_err(|e| CliError::config(path, e))?
        }
        None => GridConfig::new().gap(1.0),
    };

    if cli.headers {
        config.headers_enabled = true;
    }
    if cli.footers {
        config.footers_enabled = true;
    }
    if let Some(mode) = cli.mode {
        config.sizing_mode = mode.into();
    }
    if let Some(gap) = cli.gap {
        config.gap = gap;
    }
    Ok(config)
}

/// Build the controller, apply the requested sorts and settle every pass.
fn build(cli: &Cli) -> Result<Grid, CliError> {
    let config = load_config(cli)?;
    log::info!("grid config: {config:?}");

    let data = SampleData::new(sample::generate(cli.rows as usize));
    let failure: Rc<RefCell<Option<GridError>>> = Rc::default();
    let sink = Rc::clone(&failure);

    let mut controller = GridController::new(TextHost::new(cli.width, cli.visible), config)
        .with_sort_delegate(SampleSorter::new(data.rows()))
        .with_layout_delegate(SampleLayout)
        .with_data_source(data)
        .on_error(move |err| {
            log::error!("grid pass failed: {err}");
            sink.borrow_mut().get_or_insert_with(|| err.clone());
        });

    controller.request_reload(false);
    controller.request_layout();
    settle(&mut controller);

    for column in &cli.sort {
        controller.request_sort((*column).into());
        settle(&mut controller);
    }

    if let Some(err) = failure.borrow_mut().take() {
        return Err(err.into());
    }
    Ok(controller)
}

/// Run turns until idle, refreshing the host's text before each turn so
/// fit-to-content layouts measure the generation they follow.
fn settle(controller: &mut Grid) {
    let mut measured = None;
    loop {
        if measured != Some(controller.generation()) {
            let grid: &Grid = controller;
            let text: HashMap<ItemId, String> = grid
                .host()
                .snapshot()
                .items()
                .map(|item| (item, label(grid, item)))
                .collect();
            controller.host_mut().set_text(text);
            measured = Some(controller.generation());
        }
        if !controller.run_turn() {
            break;
        }
    }
}

fn label(controller: &Grid, item: ItemId) -> String {
    let text = controller.cell(item).unwrap_or_default();
    match controller.resolve_cell(item) {
        Some(cell) if cell.kind == CellKind::Header => match controller.sort_state(cell.column) {
            SortState::Ascending => format!("{text} ▲"),
            SortState::Descending => format!("{text} ▼"),
            SortState::Unknown => text,
        },
        _ => text,
    }
}

fn render(controller: &Grid, out: &mut impl Write) -> io::Result<()> {
    let host = controller.host();
    for section in host.visible_sections() {
        let kind = section
            .items
            .first()
            .and_then(|item| controller.resolve_cell(*item))
            .map(|cell| cell.kind);

        if kind == Some(CellKind::Footer) {
            writeln!(out, "{}", host.rule())?;
        }
        writeln!(out, "{}", host.render_row(&section.items, |item| label(controller, item)))?;
        if kind == Some(CellKind::Header) {
            writeln!(out, "{}", host.rule())?;
        }
    }

    let hidden = host.snapshot().section_count() - host.visible_sections().len();
    if hidden > 0 {
        writeln!(out, "({hidden} more rows)")?;
    }
    Ok(())
}
