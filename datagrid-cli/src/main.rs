//! Command-line driver for the table engine.
//!
//! Loads columns and rows from JSON files, applies expansion, sorting and
//! column visibility changes, and prints the rows visible at a scroll
//! position.

mod error;
mod paths;

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use datagrid_lib::columns::ColumnStorage;
use datagrid_lib::columns::SqliteBackend;
use datagrid_lib::model::format_cell;
use datagrid_lib::model::ColumnDefinition;
use datagrid_lib::model::Row;
use datagrid_lib::model::Value;
use datagrid_lib::Table;
use datagrid_lib::TableConfig;
use datagrid_lib::TableEvent;
use log::info;
use log::warn;
use serde::de::DeserializeOwned;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::error::CliError;

/// Approximate pixels per printed character.
const PX_PER_CHAR: f32 = 8.0;

#[derive(Debug, Parser)]
#[command(name = "datagrid", about = "Print the visible window of a table")]
struct Args {
    /// JSON file with column definitions
    #[arg(long)]
    columns: PathBuf,

    /// JSON file with rows
    #[arg(long)]
    rows: PathBuf,

    /// JSON file with table configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Expand a row (repeatable)
    #[arg(long = "expand", value_name = "ID")]
    expand: Vec<String>,

    /// Expand every row
    #[arg(long)]
    expand_all: bool,

    /// Click a column header (repeatable, applied in order)
    #[arg(long = "sort", value_name = "KEY")]
    sort: Vec<String>,

    /// Toggle a column's visibility (repeatable, persisted)
    #[arg(long = "toggle", value_name = "KEY")]
    toggle: Vec<String>,

    /// Reset the persisted column configuration
    #[arg(long)]
    reset_columns: bool,

    /// Key for the persisted column configuration
    #[arg(long)]
    storage_key: Option<String>,

    /// Keep the column configuration in memory only
    #[arg(long)]
    in_memory: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

async fn open_storage(in_memory: bool) -> Result<ColumnStorage, CliError> {
    if in_memory {
        return Ok(ColumnStorage::in_memory());
    }
    let Some(path) = paths::columns_db() else {
        warn!("No data directory, column configuration kept in memory");
        return Ok(ColumnStorage::in_memory());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    info!("Column configuration database: {}", path.display());
    Ok(ColumnStorage::new(SqliteBackend::open(&path).await?))
}

async fn run(args: Args) -> Result<(), CliError> {
    let mut config: TableConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => TableConfig::default(),
    };
    if let Some(key) = &args.storage_key {
        config.storage_key = Some(key.clone());
    }
    let columns: Vec<ColumnDefinition> = read_json(&args.columns)?;
    let rows: Vec<Row> = read_json(&args.rows)?;
    info!("Loaded {} columns and {} rows", columns.len(), rows.len());

    let storage = match config.storage_key {
        Some(_) => Some(open_storage(args.in_memory).await?),
        None => None,
    };
    let mut table = Table::open(config, columns, storage).await;
    table.set_data(rows);

    if args.reset_columns {
        table.reset_columns();
    }
    for key in &args.toggle {
        if !table.toggle_column_visibility(key) {
            warn!("Cannot toggle column {}", key);
        }
    }
    if args.expand_all {
        table.expand_all();
    }
    for id in &args.expand {
        table.set_expanded(id, true);
    }
    for key in &args.sort {
        table.header_click(key);
    }

    let window = table.window(args.scroll, args.height)?;
    let total = table.total_extent()?;
    let range = table.range().clone();

    let layout = table.layout();
    let widths = layout.resolve_widths(args.width);
    let visible: Vec<&ColumnDefinition> = layout.columns().iter().collect();
    let chars: Vec<usize> = widths
        .iter()
        .map(|w| ((w.width / PX_PER_CHAR) as usize).max(3))
        .collect();

    println!("template: {}", layout.template_columns());
    let header: Vec<String> = visible
        .iter()
        .zip(&chars)
        .map(|(column, width)| fit(&column.label, *width))
        .collect();
    println!("{}", header.join(" | "));

    for (item, row) in &window {
        let cells: Vec<String> = visible
            .iter()
            .zip(&chars)
            .enumerate()
            .map(|(index, (column, width))| {
                let value = row.get_path(&column.key).cloned().unwrap_or(Value::Null);
                let mut text = format_cell(&value, column.format.as_ref(), Some(row.row.as_ref())).text;
                if index == 0 {
                    let marker = match (row.has_children, row.is_expanded) {
                        (true, true) => "v ",
                        (true, false) => "> ",
                        _ => "  ",
                    };
                    text = format!("{}{}{}", "  ".repeat(row.depth), marker, text);
                }
                fit(&text, *width)
            })
            .collect();
        println!("{:>6} {}", item.start, cells.join(" | "));
    }
    println!(
        "rows {}..{} of {} (visible {}..{}), content height {}px",
        range.items.start,
        range.items.end,
        table.rows()?.len(),
        range.visible.start,
        range.visible.end,
        total
    );

    for event in table.drain_events() {
        if let TableEvent::Request(payload) = event {
            match serde_json::to_string(&payload) {
                Ok(json) => println!("request: {}", json),
                Err(e) => warn!("Failed to encode request: {}", e),
            }
        }
    }

    if let Some(store) = table.column_store() {
        store.flush().await;
    }
    Ok(())
}

/// Pads or truncates text to a fixed number of characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('~');
        truncated
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

#[tokio::main]
async fn main() {
    paths::rotate_logs();
    if let Some(path) = paths::log_file() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let log_file = File::create(&path).expect("Failed to create log file");
        WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
            .expect("Failed to initialize logger");
    }

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
