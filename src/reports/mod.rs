// Reports module - Daily fee pivot and Excel export

pub mod daily_fees;
pub mod export;

pub use daily_fees::{compute_daily_fees, join_fee_rows, AccountFees, FeeReport, FeeRow};
pub use export::{export_report, DEFAULT_EXPORT_FILE, EXPORT_SHEET_NAME};
