//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of fee calculation from presentation.

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
};

use taxa::utils::{format_currency, format_fee_cell};
use taxa::{FeeError, FeeReport};

/// Format the fee report for JSON output
pub fn format_report_json(report: &FeeReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the fee report as a terminal table
pub fn format_report_table(report: &FeeReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Daily management fees ({} accounts, {} dates)\n\n",
        "📊".cyan().bold(),
        report.rows.len(),
        report.dates.len()
    ));

    let mut builder = Builder::default();
    let mut header = vec!["Conta".to_string()];
    header.extend(report.dates.iter().cloned());
    header.push("Total".to_string());
    builder.push_record(header);

    for row in &report.rows {
        let mut record = vec![row.account_id.clone()];
        record.extend(row.daily.iter().map(|fee| format_fee_cell(*fee)));
        record.push(format_fee_cell(Some(row.total)));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    // Right-align everything except the account column
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!("\n\n{} Summary", "━".repeat(60).bright_black()));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Total fees:".bold(),
        format_currency(report.grand_total())
    ));

    output
}

/// Format a per-file warning
pub fn format_warning(err: &FeeError) -> String {
    format!("{} {}", "⚠".yellow().bold(), err)
}

/// Format a success line
pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg)
}
