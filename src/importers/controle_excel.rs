//! Control spreadsheet ("planilha de controle") importer
//!
//! Reads the BTG tab (second sheet) of the control workbook and produces one
//! `AccountRecord` per account, plus the extra-padded copies for the
//! override accounts.

use anyhow::{anyhow, Context, Result};
use calamine::{Data, Reader};
use tracing::{debug, info, warn};

use super::{
    cell_text, float_cell_text, header_columns, is_empty_row, is_sparse_numeric_column,
    open_xlsx, parse_decimal, require_column,
};
use crate::accounts::{expand_with_extra_padding, normalize_account, AccountRecord};
use crate::error::FeeError;

/// The BTG tab is the second sheet of the control workbook
pub const CONTROLE_SHEET_INDEX: usize = 1;
/// Rows above the header (a title row)
const TITLE_ROWS: u32 = 1;

pub const ACCOUNT_COLUMN: &str = "Conta";
pub const RATE_COLUMN: &str = "Taxa de Gestão";

/// Parse the control workbook into account/rate records
pub fn parse_controle_excel(bytes: &[u8]) -> Result<Vec<AccountRecord>, FeeError> {
    read_controle(bytes).map_err(|e| FeeError::ReferenceLoad(format!("{:#}", e)))
}

fn read_controle(bytes: &[u8]) -> Result<Vec<AccountRecord>> {
    info!("Parsing control spreadsheet ({} bytes)", bytes.len());

    let mut workbook = open_xlsx(bytes)?;
    let sheet_names = workbook.sheet_names();
    let range = workbook
        .worksheet_range_at(CONTROLE_SHEET_INDEX)
        .ok_or_else(|| {
            anyhow!(
                "Workbook has no sheet at index {} (found: {:?})",
                CONTROLE_SHEET_INDEX,
                sheet_names
            )
        })?
        .context("Failed to read control worksheet")?;

    let first_row = range.start().map(|(row, _)| row).unwrap_or(0);

    let mut rows = range
        .rows()
        .enumerate()
        .filter(|(idx, _)| first_row + *idx as u32 >= TITLE_ROWS)
        .map(|(_, row)| row);

    let header: &[Data] = rows.next().ok_or_else(|| anyhow!("Missing header row"))?;
    let columns = header_columns(header);
    let col_account = require_column(&columns, ACCOUNT_COLUMN)?;
    let col_rate = require_column(&columns, RATE_COLUMN)?;
    debug!("Control columns: conta={}, taxa={}", col_account, col_rate);

    let rows: Vec<&[Data]> = rows.collect();
    // A numeric Conta column with gaps reads as floats: "989247.0" strips to "989247"
    let account_text = if is_sparse_numeric_column(&rows, col_account) {
        debug!("Conta column is numeric with blanks, using float text");
        float_cell_text
    } else {
        cell_text
    };

    let mut records = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        if is_empty_row(row) {
            continue;
        }

        let raw_account = match row.get(col_account).and_then(account_text) {
            Some(raw) => raw,
            None => {
                warn!("Skipping control row {}: empty account", idx + 1);
                continue;
            }
        };

        let annual_rate = match row.get(col_rate) {
            Some(cell) => parse_decimal(cell)
                .with_context(|| format!("Invalid rate for account {}", raw_account))?,
            None => None,
        };

        records.push(AccountRecord {
            account_id: normalize_account(&raw_account),
            annual_rate,
        });
    }

    let base_count = records.len();
    let records = expand_with_extra_padding(records);
    info!(
        "Loaded {} control accounts ({} extra-padded)",
        base_count,
        records.len() - base_count
    );

    Ok(records)
}
