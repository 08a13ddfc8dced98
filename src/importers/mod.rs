// Import module - BTG control spreadsheet and daily PL parsers

pub mod controle_excel;
pub mod date_tag;
pub mod pl_excel;

use anyhow::{anyhow, Context, Result};
use calamine::{Data, DataType, Reader, Xlsx};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

pub use controle_excel::parse_controle_excel;
pub use date_tag::extract_date_tag;
pub use pl_excel::{parse_pl_excel, SnapshotBatch, SnapshotRow};

/// Open an in-memory .xlsx workbook
pub(crate) fn open_xlsx(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>> {
    Xlsx::new(Cursor::new(bytes)).context("Failed to open Excel workbook")
}

/// Map trimmed, NFC-normalized header names to column indices
pub(crate) fn header_columns(header: &[Data]) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for (idx, cell) in header.iter().enumerate() {
        if let Some(name) = cell.get_string() {
            // First occurrence wins for repeated headers
            columns
                .entry(name.trim().nfc().collect::<String>())
                .or_insert(idx);
        }
    }
    columns
}

/// Look up a required column by its header name
pub(crate) fn require_column(columns: &HashMap<String, usize>, name: &str) -> Result<usize> {
    let key: String = name.nfc().collect();
    columns
        .get(&key)
        .copied()
        .ok_or_else(|| anyhow!("Missing '{}' column", name))
}

pub(crate) fn is_empty_row(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::String(s) => s.trim().is_empty(),
        other => other.is_empty(),
    })
}

/// Text form of a cell, as the account key is compared.
///
/// Integral numbers render without a decimal point (12345678.0 -> "12345678").
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some((*f as i64).to_string())
        }
        other => Some(other.to_string()),
    }
}

/// Text form of a cell from a float-typed column.
///
/// A numeric column with blank cells reads back as floats, so integral
/// numbers keep a trailing `.0` (989247.0 -> "989247.0").
pub(crate) fn float_cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Int(i) => Some(format!("{}.0", i)),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(format!("{}.0", *f as i64))
        }
        other => cell_text(other),
    }
}

/// True when every non-blank cell in `col` is numeric and at least one is blank
pub(crate) fn is_sparse_numeric_column(rows: &[&[Data]], col: usize) -> bool {
    let mut has_blank = false;
    for row in rows {
        match row.get(col) {
            Some(Data::Int(_)) | Some(Data::Float(_)) => {}
            Some(cell) if cell_text(cell).is_some() => return false,
            _ => has_blank = true,
        }
    }
    has_blank
}

/// Parse decimal from cell (numbers, or strings in "0.02" / "1.234,56" form).
///
/// Empty cells yield `None`.
pub(crate) fn parse_decimal(cell: &Data) -> Result<Option<Decimal>> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(Decimal::from(*i))),
        Data::Float(f) => Decimal::from_str(&f.to_string())
            .map(Some)
            .context("Failed to parse float as decimal"),
        Data::String(s) => {
            let text = s.replace("R$", "").replace(' ', "");
            if text.is_empty() {
                return Ok(None);
            }
            // Brazilian format uses '.' for thousands and ',' for decimals
            let normalized = if text.contains(',') {
                text.replace('.', "").replace(',', ".")
            } else {
                text
            };
            Decimal::from_str(&normalized)
                .map(Some)
                .with_context(|| format!("Failed to parse decimal: {}", s))
        }
        other => Err(anyhow!("Unsupported numeric cell: {:?}", other)),
    }
}
