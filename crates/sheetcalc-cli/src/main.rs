//! sheetcalc CLI - evaluate a CSV grid of values and formulas

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use serde::Serialize;
use sheetcalc::prelude::*;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetcalc")]
#[command(author, version, about = "Spreadsheet calculation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV grid, apply edits and print every display value
    Calc {
        /// Input CSV file; each field is the raw input of one cell
        input: PathBuf,

        /// Edit a cell after loading (repeatable)
        #[arg(short, long = "set", value_name = "ADDR=TEXT")]
        sets: Vec<String>,

        /// Regex matched against raw cell text
        #[arg(long, requires = "replace")]
        find: Option<String>,

        /// Replacement for --find matches ($1 etc. allowed)
        #[arg(long, requires = "find")]
        replace: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Show the raw input and display value of one cell
    Cell {
        /// Input CSV file
        input: PathBuf,

        /// Cell address, e.g. B3
        address: String,

        #[command(flatten)]
        grid: GridArgs,
    },
}

#[derive(clap::Args)]
struct GridArgs {
    /// Minimum number of columns
    #[arg(long, default_value_t = 16)]
    columns: u32,

    /// Minimum number of rows
    #[arg(long, default_value_t = 100)]
    rows: u32,

    /// Decimal places shown for numbers
    #[arg(long, default_value_t = 2)]
    decimals: usize,
}

/// Output format for results
#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Grid of display values
    #[default]
    Csv,
    /// Written cells with input and display value
    Json,
}

#[derive(Serialize)]
struct JsonSheet {
    columns: u32,
    rows: u32,
    cells: Vec<JsonCell>,
}

#[derive(Serialize)]
struct JsonCell {
    address: String,
    input: String,
    value: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command {
        Commands::Calc {
            input,
            sets,
            find,
            replace,
            output,
            format,
            grid,
        } => {
            let mut sheet = open_sheet(&input, &grid)?;
            apply_sets(&mut sheet, &sets)?;
            if let (Some(find), Some(replace)) = (find, replace) {
                let count = find_replace(&mut sheet, &find, &replace)?;
                eprintln!("Replaced {} cell(s)", count);
            }
            write_output(&sheet, output.as_deref(), format)
        }
        Commands::Cell {
            input,
            address,
            grid,
        } => {
            let sheet = open_sheet(&input, &grid)?;
            let raw = sheet.get_raw_input(&address)?;
            let value = sheet
                .get_display_value(&address)
                .with_context(|| format!("Failed to read cell {}", address))?;
            println!("input: {}", raw);
            println!("value: {}", value);
            Ok(())
        }
    }
}

fn open_sheet(path: &Path, grid: &GridArgs) -> Result<Spreadsheet> {
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    load_sheet(file, grid).with_context(|| format!("Failed to load '{}'", path.display()))
}

/// Read CSV records into a spreadsheet; record N fills row N
fn load_sheet<R: Read>(reader: R, grid: &GridArgs) -> Result<Spreadsheet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record.context("Failed to parse CSV")?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    let columns = grid.columns.max(u32::try_from(width)?);
    let rows = grid.rows.max(u32::try_from(records.len())?);

    let options = SheetOptions::default()
        .with_dimensions(columns, rows)
        .with_display_decimals(grid.decimals);
    if columns > options.max_columns || rows > options.max_rows {
        bail!("grid of {} x {} exceeds the size limit", columns, rows);
    }
    let mut sheet = Spreadsheet::with_options(options);

    for (row, fields) in records.iter().enumerate() {
        for (col, text) in fields.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let addr = CellAddress::new(u32::try_from(col)?, u32::try_from(row + 1)?);
            sheet.edit_cell_at(addr, text)?;
        }
    }

    debug!(
        columns,
        rows,
        formulas = sheet.formula_cells().len(),
        "loaded sheet"
    );
    Ok(sheet)
}

fn apply_sets(sheet: &mut Spreadsheet, sets: &[String]) -> Result<()> {
    for set in sets {
        let (address, text) = set
            .split_once('=')
            .with_context(|| format!("Invalid edit '{}'. Expected ADDR=TEXT", set))?;
        let stats = sheet
            .edit_cell(address.trim(), text)
            .with_context(|| format!("Failed to edit {}", address))?;
        if stats.circular {
            eprintln!("Warning: {} creates a circular reference", address.trim());
        }
    }
    Ok(())
}

fn find_replace(sheet: &mut Spreadsheet, find: &str, replace: &str) -> Result<usize> {
    let re = Regex::new(find).with_context(|| format!("Invalid regex '{}'", find))?;
    let count = sheet.batch_find_replace(
        |raw| re.is_match(raw),
        |raw| re.replace_all(raw, replace).into_owned(),
    )?;
    Ok(count)
}

/// Last written row and column, if any cell is inside the grid
fn used_extent(sheet: &Spreadsheet) -> Option<(u32, u32)> {
    sheet
        .grid()
        .iter()
        .filter(|cell| sheet.grid().contains(cell.address) && !cell.raw_input.is_empty())
        .fold(None, |extent, cell| {
            let (col, row) = extent.unwrap_or((0, 1));
            Some((col.max(cell.address.col), row.max(cell.address.row)))
        })
}

fn render_csv(sheet: &Spreadsheet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if let Some((max_col, max_row)) = used_extent(sheet) {
        for row in 1..=max_row {
            let values = (0..=max_col)
                .map(|col| sheet.get_display_value_at(CellAddress::new(col, row)))
                .collect::<sheetcalc::Result<Vec<_>>>()?;
            writer.write_record(&values)?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
}

fn render_json(sheet: &Spreadsheet) -> Result<Vec<u8>> {
    let (columns, rows) = sheet.dimensions();
    let mut cells = Vec::new();
    for cell in sheet.grid().iter() {
        if !sheet.grid().contains(cell.address) || cell.raw_input.is_empty() {
            continue;
        }
        cells.push(JsonCell {
            address: cell.address.to_string(),
            input: cell.raw_input.clone(),
            value: sheet.get_display_value_at(cell.address)?,
        });
    }

    let mut out = serde_json::to_vec_pretty(&JsonSheet {
        columns,
        rows,
        cells,
    })?;
    out.push(b'\n');
    Ok(out)
}

fn write_output(sheet: &Spreadsheet, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    let bytes = match format {
        OutputFormat::Csv => render_csv(sheet)?,
        OutputFormat::Json => render_json(sheet)?,
    };

    if let Some(path) = output {
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        eprintln!("Wrote '{}'", path.display());
    } else {
        io::stdout()
            .write_all(&bytes)
            .context("Failed to write to stdout")?;
    }

    Ok(())
}
