//! Excel export of the daily fee report

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use super::daily_fees::FeeReport;
use crate::error::FeeError;

pub const EXPORT_SHEET_NAME: &str = "Taxa_Gestao_Diaria";
pub const DEFAULT_EXPORT_FILE: &str = "taxa_gestao_diaria.xlsx";

/// Serialize the report into an .xlsx buffer with a single sheet
pub fn export_report(report: &FeeReport) -> Result<Vec<u8>, FeeError> {
    write_workbook(report).map_err(|e| FeeError::Serialization(e.to_string()))
}

fn write_workbook(report: &FeeReport) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format("0.00");
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    let total_col = report.dates.len() as u16 + 1;
    sheet.write_string_with_format(0, 0, "conta", &bold)?;
    for (idx, label) in report.dates.iter().enumerate() {
        sheet.write_string_with_format(0, idx as u16 + 1, label, &bold)?;
    }
    sheet.write_string_with_format(0, total_col, "Total", &bold)?;

    for (idx, row) in report.rows.iter().enumerate() {
        let excel_row = idx as u32 + 1;
        sheet.write_string(excel_row, 0, &row.account_id)?;
        for (col, fee) in row.daily.iter().enumerate() {
            // Null cells stay blank
            if let Some(value) = fee.and_then(|f| f.to_f64()) {
                sheet.write_number_with_format(excel_row, col as u16 + 1, value, &money)?;
            }
        }
        let total = row.total.to_f64().unwrap_or_default();
        sheet.write_number_with_format(excel_row, total_col, total, &money)?;
    }

    let buffer = workbook.save_to_buffer()?;
    info!(
        "Exported {} accounts x {} dates ({} bytes)",
        report.rows.len(),
        report.dates.len(),
        buffer.len()
    );
    Ok(buffer)
}
