//! Loosely-typed tabular data.
//!
//! Uploaded portfolios arrive as a header row plus data rows with unknown
//! casing and mixed field types. `Table` keeps the columns in dataset order
//! and each cell as a [`Cell`]: null, integer, float, or text. The cleaner
//! consumes and produces tables; the aggregator reads them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

use crate::error::CreditRiskError;
use crate::CreditRiskResult;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Int(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value, if this cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw CSV field. Empty strings and the usual NA spellings
    /// become `Null`; integral text becomes `Int`; numeric text becomes
    /// `Number`; everything else stays `Text` verbatim.
    pub fn parse(field: &str) -> Cell {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "na" | "n/a" | "nan" | "null" | "none" => return Cell::Null,
            _ => {}
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Cell::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Cell::Number(v);
        }
        Cell::Text(field.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A column-ordered table of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from pre-assembled rows, enforcing row arity.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> CreditRiskResult<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CreditRiskError::Storage(format!(
                    "row {} has {} fields, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate one column's cells in row order.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> CreditRiskResult<()> {
        if row.len() != self.columns.len() {
            return Err(CreditRiskError::Storage(format!(
                "row has {} fields, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a new column; `cells` must cover every row.
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) -> CreditRiskResult<()> {
        if cells.len() != self.rows.len() {
            return Err(CreditRiskError::Storage(format!(
                "column '{}' has {} cells, expected {}",
                name,
                cells.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    pub(crate) fn rename_columns(&mut self, names: Vec<String>) {
        debug_assert_eq!(names.len(), self.columns.len());
        self.columns = names;
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        &mut self.rows
    }

    /// Read a table from CSV. The first record is the header.
    pub fn read_csv<R: Read>(reader: R) -> CreditRiskResult<Table> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut table = Table::new(columns);
        for record in rdr.records() {
            let record = record?;
            let row: Vec<Cell> = record.iter().map(Cell::parse).collect();
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Write the table as CSV, nulls as empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> CreditRiskResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            wtr.write_record(&fields)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
