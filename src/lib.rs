//! Taxa - daily management fee calculator
//!
//! This library computes per-account daily management fees from a BTG
//! control spreadsheet (annual rates) and a series of daily PL snapshot
//! spreadsheets, and exports the resulting account x date report.

pub mod accounts;
pub mod config;
pub mod error;
pub mod importers;
pub mod reports;
pub mod session;
pub mod utils;

pub use error::FeeError;
pub use reports::FeeReport;
pub use session::FeeSession;
