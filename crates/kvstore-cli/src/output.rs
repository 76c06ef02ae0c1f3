//! Rendering of command results as aligned text or JSON.

use std::fmt;
use std::io::{self, Write};

use serde_json::{Map, Value};

pub type OutputRow = Vec<String>;

/// Rows returned by a command handler; the first row is the header.
pub type OutputTable = Vec<OutputRow>;

/// Gap between aligned columns.
const GUTTER: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Column-aligned text.
    #[default]
    Table,
    /// A JSON array with one object per data row, keyed by the header.
    Json,
}

/// Writes command output in the selected [`OutputFormat`].
pub struct Printer<W: Write = Box<dyn Write>> {
    sink: W,
    format: OutputFormat,
}

impl Printer<Box<dyn Write>> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }
}

impl<W: Write> Printer<W> {
    pub fn new(sink: W, format: OutputFormat) -> Self {
        Self { sink, format }
    }

    pub fn print_error(&mut self, message: &str) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            writeln!(self.sink, "{}", serde_json::json!({ "error": message }))
        } else {
            writeln!(self.sink, "Error: {message}")
        }
    }

    /// Print `table`. An empty table prints nothing.
    pub fn print_table(&mut self, table: &OutputTable) -> io::Result<()> {
        let Some((header, rows)) = table.split_first() else {
            return Ok(());
        };
        match self.format {
            OutputFormat::Table => {
                for line in align(table) {
                    writeln!(self.sink, "{line}")?;
                }
                Ok(())
            }
            OutputFormat::Json => {
                let objects: Vec<Map<String, Value>> = rows.iter().map(|row| to_object(header, row)).collect();
                let text = serde_json::to_string_pretty(&objects).map_err(io::Error::other)?;
                writeln!(self.sink, "{text}")
            }
        }
    }
}

impl<W: Write> fmt::Debug for Printer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer").field("format", &self.format).finish()
    }
}

/// Pad every cell but the last in each row to its column width.
fn align(table: &OutputTable) -> Vec<String> {
    let columns = table.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            table
                .iter()
                .filter_map(|row| row.get(col))
                .map(String::len)
                .max()
                .unwrap_or(0)
        })
        .collect();

    table
        .iter()
        .map(|row| {
            let last = row.len().saturating_sub(1);
            row.iter()
                .enumerate()
                .map(|(col, cell)| {
                    if col == last {
                        cell.clone()
                    } else {
                        format!("{cell:<width$}", width = widths[col] + GUTTER)
                    }
                })
                .collect()
        })
        .collect()
}

/// Cells beyond the header are keyed by position.
fn to_object(header: &OutputRow, row: &OutputRow) -> Map<String, Value> {
    row.iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = header.get(i).cloned().unwrap_or_else(|| format!("col_{i}"));
            (name, Value::String(cell.clone()))
        })
        .collect()
}

pub fn table_with_header(headers: &[&str]) -> OutputTable {
    vec![headers.iter().map(|h| h.to_string()).collect()]
}

pub fn kv_row(key: &str, value: impl fmt::Display) -> OutputRow {
    vec![key.to_string(), value.to_string()]
}
