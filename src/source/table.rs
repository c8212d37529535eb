//! In-memory tables loaded from CSV and Excel files.

use super::{parse_error, SourceKind};
use crate::error::Result;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, instrument};

/// A single typed table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell type from raw CSV text.
    pub fn infer(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Empty;
        }
        match raw.to_lowercase().as_str() {
            "true" => return Cell::Bool(true),
            "false" => return Cell::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        Cell::Text(raw.to_string())
    }

    fn from_excel(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Bool(b) => Cell::Bool(*b),
            Data::Int(i) => Cell::Int(*i),
            // Spreadsheets store whole numbers as floats
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => Self::from_excel_datetime(dt),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Dates become ISO text so they compare and sort chronologically.
    fn from_excel_datetime(dt: &ExcelDateTime) -> Self {
        if dt.is_duration() {
            return match dt.as_duration() {
                Some(duration) => Cell::Text(duration.to_string()),
                None => Cell::Float(dt.as_f64()),
            };
        }
        match dt.as_datetime() {
            Some(at) if at.time().num_seconds_from_midnight() == 0 => {
                Cell::Text(at.format("%Y-%m-%d").to_string())
            }
            Some(at) => Cell::Text(at.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Float(dt.as_f64()),
        }
    }

    /// Numeric value, if the cell holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Name of the cell type, as shown in table schemas.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Empty => "empty",
            Cell::Bool(_) => "bool",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Text(_) => "text",
        }
    }

    /// Total order used for sorting: numbers (numerically), then every other
    /// value by its display text, then empty cells.
    pub fn sort_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => Ordering::Equal,
            (Cell::Empty, _) => Ordering::Greater,
            (_, Cell::Empty) => Ordering::Less,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A table with named columns and typed cells.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl StructuredTable {
    /// Create a table. Rows are padded or truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by exact name, falling back to a case-insensitive match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(name.trim()))
            })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> StructuredTable {
        StructuredTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Type of a column: the type shared by its non-empty cells, or "mixed".
    pub fn column_type(&self, index: usize) -> &'static str {
        let mut seen: Option<&'static str> = None;
        for row in &self.rows {
            let cell = &row[index];
            if cell.is_empty() {
                continue;
            }
            let name = match cell.type_name() {
                // Integers widen into float columns
                "int" if seen == Some("float") => "float",
                other => other,
            };
            seen = match seen {
                None => Some(name),
                Some("int") if name == "float" => Some("float"),
                Some(prev) if prev == name => Some(prev),
                Some(_) => return "mixed",
            };
        }
        seen.unwrap_or("empty")
    }

    /// One line per column with its inferred type.
    pub fn schema_description(&self) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| format!("- {} ({})", name, self.column_type(i)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render as an aligned plain-text table.
    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_line = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(cells.len() + 2);
        lines.push(format_line(self.columns.iter().map(String::as_str).collect()));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &cells {
            lines.push(format_line(row.iter().map(String::as_str).collect()));
        }

        lines.join("\n")
    }
}

/// Give blank headers a positional name and suffix duplicates with `.N`,
/// skipping suffixes that another header already uses.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, header)| {
            let base = match header.trim() {
                "" => format!("column_{}", i + 1),
                trimmed => trimmed.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while used.contains(&name) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Load a CSV file. The first record is the header row.
#[instrument(fields(path = %path.display()))]
pub fn load_csv(path: &Path) -> Result<StructuredTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| parse_error(SourceKind::Csv, e))?;

    let headers = reader
        .headers()
        .map_err(|e| parse_error(SourceKind::Csv, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = normalize_headers(headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| parse_error(SourceKind::Csv, e))?;
        rows.push(record.iter().map(Cell::infer).collect());
    }

    debug!("Loaded CSV with {} columns and {} rows", columns.len(), rows.len());
    Ok(StructuredTable::new(columns, rows))
}

/// Load the first worksheet of an Excel workbook. The first row is the header row.
#[instrument(fields(path = %path.display()))]
pub fn load_excel(path: &Path) -> Result<StructuredTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| parse_error(SourceKind::Excel, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error(SourceKind::Excel, "workbook contains no worksheets"))?
        .map_err(|e| parse_error(SourceKind::Excel, e))?;

    let mut sheet_rows = range.rows();
    let headers = sheet_rows
        .next()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let columns = normalize_headers(headers);

    let rows: Vec<Vec<Cell>> = sheet_rows
        .map(|row| row.iter().map(Cell::from_excel).collect())
        .collect();

    debug!("Loaded worksheet with {} columns and {} rows", columns.len(), rows.len());
    Ok(StructuredTable::new(columns, rows))
}
