//! Daily PL ("PL Total - DD.MM") importer
//!
//! Each PL file is a single day's portfolio value per account. The date comes
//! from the file name, not from the sheet.

use anyhow::{anyhow, Context, Result};
use calamine::{Data, Reader};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::date_tag::extract_date_tag;
use super::{cell_text, header_columns, is_empty_row, open_xlsx, parse_decimal, require_column};
use crate::error::FeeError;

pub const ACCOUNT_COLUMN: &str = "Conta";
pub const VALUE_COLUMN: &str = "Valor";

/// One account's portfolio value on a snapshot date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub account_id: Option<String>,
    pub value: Option<Decimal>,
    pub date: NaiveDate,
}

/// Rows contributed by a single PL file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBatch {
    pub file_name: String,
    pub date: NaiveDate,
    pub rows: Vec<SnapshotRow>,
}

/// Parse a PL workbook, dating every row with the tag in `file_name`
pub fn parse_pl_excel(bytes: &[u8], file_name: &str, year: i32) -> Result<SnapshotBatch, FeeError> {
    let date = extract_date_tag(file_name, year)?;

    let rows = read_pl_rows(bytes, date).map_err(|e| FeeError::SnapshotLoad {
        file_name: file_name.to_string(),
        reason: format!("{:#}", e),
    })?;

    info!("Parsed {} PL rows from '{}' ({})", rows.len(), file_name, date);
    Ok(SnapshotBatch {
        file_name: file_name.to_string(),
        date,
        rows,
    })
}

fn read_pl_rows(bytes: &[u8], date: NaiveDate) -> Result<Vec<SnapshotRow>> {
    let mut workbook = open_xlsx(bytes)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no sheets"))?
        .context("Failed to read PL worksheet")?;

    let mut rows = range.rows();
    let header: &[Data] = rows.next().ok_or_else(|| anyhow!("Missing header row"))?;
    let columns = header_columns(header);
    let col_account = require_column(&columns, ACCOUNT_COLUMN)?;
    let col_value = require_column(&columns, VALUE_COLUMN)?;
    debug!("PL columns: conta={}, valor={}", col_account, col_value);

    let mut snapshot = Vec::new();
    for (idx, row) in rows.enumerate() {
        if is_empty_row(row) {
            continue;
        }

        let account_id = row.get(col_account).and_then(cell_text);
        let value = match row.get(col_value) {
            Some(cell) => parse_decimal(cell).with_context(|| {
                format!("Invalid value in data row {} (account {:?})", idx + 1, account_id)
            })?,
            None => None,
        };

        snapshot.push(SnapshotRow {
            account_id,
            value,
            date,
        });
    }

    Ok(snapshot)
}
