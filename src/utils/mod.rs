//! Utility functions for formatting fee values
//!
//! Values are shown with Brazilian locale conventions: `.` as the thousands
//! separator and `,` as the decimal separator.

use rust_decimal::Decimal;

/// Placeholder for a fee that could not be computed (missing rate or value)
pub const MISSING_FEE: &str = "-";

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// No currency symbol (table cells)
    None,
}

/// Format a Decimal rounded to 2 places in Brazilian notation.
///
/// # Examples
/// ```
/// use taxa::utils::{format_brl, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_brl(dec!(1234.56), CurrencySymbol::BRL), "R$ 1.234,56");
/// assert_eq!(format_brl(dec!(-7.855), CurrencySymbol::None), "-7,86");
/// ```
pub fn format_brl(value: Decimal, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp(2);
    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::None => "",
    };

    format!("{}{}{},{}", prefix, sign, grouped, decimal_part)
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
pub fn format_currency(value: Decimal) -> String {
    format_brl(value, CurrencySymbol::BRL)
}

/// Format a report cell: number only, or a dash when the fee is null
///
/// # Examples
/// ```
/// use taxa::utils::format_fee_cell;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_fee_cell(Some(dec!(7.86))), "7,86");
/// assert_eq!(format_fee_cell(None), "-");
/// ```
pub fn format_fee_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| format_brl(v, CurrencySymbol::None))
        .unwrap_or_else(|| MISSING_FEE.to_string())
}
