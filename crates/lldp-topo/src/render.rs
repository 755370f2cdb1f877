//! Output renderers.
//!
//! Absent cells are shown as `None` in the text formats and as `null` in
//! the structured ones.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

use crate::error::{Result, TopoError};
use crate::report::Table;

/// Text shown for an absent cell in table and csv output.
pub const NONE_CELL: &str = "None";

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Left-aligned ASCII table
    #[default]
    Table,
    /// `;`-separated values with a header line
    Csv,
    /// List of header -> value maps
    Yaml,
    /// List of header -> value maps, 4-space indented
    Json,
}

/// Renders `table` in `format` to `out`.
pub fn render<W: Write>(table: &Table, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(table, out),
        OutputFormat::Csv => render_csv(table, out),
        OutputFormat::Yaml => render_yaml(table, out),
        OutputFormat::Json => render_json(table, out),
    }
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NONE_CELL)
}

fn render_table<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell(value).chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+";

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("| {:<w$} ", c, w = *w))
            .collect::<String>()
            + "|"
    };

    writeln!(out, "{border}")?;
    writeln!(out, "{}", line(table.headers.iter().map(String::as_str).collect()))?;
    writeln!(out, "{border}")?;
    for row in &table.rows {
        writeln!(out, "{}", line(row.iter().map(cell).collect()))?;
    }
    writeln!(out, "{border}")?;
    Ok(())
}

fn render_csv<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    writeln!(out, "{}", table.headers.join(";"))?;
    for row in &table.rows {
        let cells: Vec<&str> = row.iter().map(cell).collect();
        writeln!(out, "{}", cells.join(";"))?;
    }
    Ok(())
}

/// One header -> value map per row, keys in header order.
fn records(table: &Table) -> Vec<Map<String, Value>> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .zip(row)
                .map(|(header, value)| {
                    let value = value.clone().map(Value::String).unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn render_json<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    records(table)
        .serialize(&mut ser)
        .map_err(|e| TopoError::Render(format!("Failed to encode json: {}", e)))?;
    writeln!(out)?;
    Ok(())
}

fn render_yaml<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    let text = serde_yaml::to_string(&records(table))
        .map_err(|e| TopoError::Render(format!("Failed to encode yaml: {}", e)))?;
    out.write_all(text.as_bytes())?;
    Ok(())
}
