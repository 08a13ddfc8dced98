//! Daily management fee calculation
//!
//! Joins the control accounts with the accumulated PL snapshots, derives the
//! per-trading-day rate from each annual rate and pivots the fees into one
//! row per account with one column per snapshot date.
//!
//! Date columns are labelled `DD.MM`. The year is dropped, so snapshots from
//! different years with the same day and month share a column.

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::accounts::AccountRecord;
use crate::error::FeeError;
use crate::importers::{SnapshotBatch, SnapshotRow};

/// Trading days per year used to de-annualize the fee rate
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Label format for date columns
pub const DATE_LABEL_FORMAT: &str = "%d.%m";

/// Joined control/PL row with the derived rate and fee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeRow {
    pub account_id: String,
    pub annual_rate: Option<Decimal>,
    pub value: Option<Decimal>,
    pub date: Option<NaiveDate>,
    /// Daily rate in percent
    pub daily_rate: Option<Decimal>,
    pub fee_amount: Option<Decimal>,
}

/// Fees for one account across every date column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountFees {
    pub account_id: String,
    pub daily: Vec<Option<Decimal>>,
    pub total: Decimal,
}

/// Account x date fee matrix with a total column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeReport {
    /// `DD.MM` labels in first-seen order
    pub dates: Vec<String>,
    /// One row per account, sorted by account id
    pub rows: Vec<AccountFees>,
}

impl FeeReport {
    /// Sum of every account's total
    pub fn grand_total(&self) -> Decimal {
        self.rows.iter().map(|row| row.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Rows serialize as flat records: {"conta": .., "01.03": .., "Total": ..}
impl Serialize for FeeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a> {
            dates: &'a [String],
            fees: &'a AccountFees,
        }

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.dates.len() + 2))?;
                map.serialize_entry("conta", &self.fees.account_id)?;
                for (label, fee) in self.dates.iter().zip(&self.fees.daily) {
                    map.serialize_entry(label, fee)?;
                }
                map.serialize_entry("Total", &self.fees.total)?;
                map.end()
            }
        }

        serializer.collect_seq(self.rows.iter().map(|fees| Row {
            dates: &self.dates,
            fees,
        }))
    }
}

/// Daily rate in percent: ((annual_rate + 1) ^ (1/252) - 1) * 100
///
/// Returns `None` when the rate has no real daily equivalent (below -100%).
pub fn daily_rate_pct(annual_rate: Decimal) -> Option<Decimal> {
    let annual = annual_rate.to_f64()?;
    let daily = ((annual + 1.0).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0) * 100.0;
    Decimal::from_f64(daily)
}

/// Fee for one day: round(value * daily_rate / 100, 2), half-to-even
pub fn fee_amount(value: Decimal, daily_rate_pct: Decimal) -> Option<Decimal> {
    let fee = value.checked_mul(daily_rate_pct)?.checked_div(Decimal::ONE_HUNDRED)?;
    Some(fee.round_dp(2))
}

fn fee_row(
    account_id: &str,
    annual_rate: Option<Decimal>,
    snapshot: Option<&SnapshotRow>,
) -> FeeRow {
    let value = snapshot.and_then(|s| s.value);
    let daily_rate = annual_rate.and_then(daily_rate_pct);
    let fee = match (value, daily_rate) {
        (Some(v), Some(r)) => {
            let fee = fee_amount(v, r);
            if fee.is_none() {
                warn!("Fee overflow for account {} (value {}, rate {})", account_id, v, r);
            }
            fee
        }
        _ => None,
    };

    FeeRow {
        account_id: account_id.to_string(),
        annual_rate,
        value,
        date: snapshot.map(|s| s.date),
        daily_rate,
        fee_amount: fee,
    }
}

/// Outer join of control accounts and snapshot rows on the account id.
///
/// Unmatched rows on either side are kept with nulls on the other side.
/// Snapshot rows with no account are dropped.
pub fn join_fee_rows(reference: &[AccountRecord], batches: &[SnapshotBatch]) -> Vec<FeeRow> {
    let combined: Vec<&SnapshotRow> = batches.iter().flat_map(|b| b.rows.iter()).collect();

    let mut by_account: HashMap<&str, Vec<&SnapshotRow>> = HashMap::new();
    for &row in &combined {
        if let Some(account) = row.account_id.as_deref() {
            by_account.entry(account).or_default().push(row);
        }
    }

    let mut joined = Vec::new();
    for record in reference {
        match by_account.get(record.account_id.as_str()) {
            Some(matches) => joined.extend(
                matches
                    .iter()
                    .map(|&s| fee_row(&record.account_id, record.annual_rate, Some(s))),
            ),
            None => joined.push(fee_row(&record.account_id, record.annual_rate, None)),
        }
    }

    let known: HashSet<&str> = reference.iter().map(|r| r.account_id.as_str()).collect();
    let mut orphans = 0;
    for &row in &combined {
        match row.account_id.as_deref() {
            Some(account) if !known.contains(account) => {
                orphans += 1;
                joined.push(fee_row(account, None, Some(row)));
            }
            Some(_) => {}
            None => debug!("Dropping PL row without account ({})", row.date),
        }
    }

    if orphans > 0 {
        warn!("{} PL rows have no matching control account", orphans);
    }
    joined
}

/// Compute the daily fee report.
///
/// Fails with `InsufficientInput` when there are no control accounts or no
/// snapshot rows; nothing is joined in that case.
pub fn compute_daily_fees(
    reference: &[AccountRecord],
    batches: &[SnapshotBatch],
) -> Result<FeeReport, FeeError> {
    if reference.is_empty() {
        return Err(FeeError::InsufficientInput(
            "no control accounts loaded".to_string(),
        ));
    }
    if batches.iter().all(|b| b.rows.is_empty()) {
        return Err(FeeError::InsufficientInput("no PL rows loaded".to_string()));
    }

    let fee_rows = join_fee_rows(reference, batches);

    let dates: Vec<String> = batches
        .iter()
        .flat_map(|b| b.rows.iter())
        .filter(|row| row.account_id.is_some())
        .map(|row| date_label(row.date))
        .unique()
        .collect();
    let column_of: HashMap<&str, usize> = dates
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();

    let mut pivot: BTreeMap<&str, Vec<Option<Decimal>>> = BTreeMap::new();
    for row in &fee_rows {
        let cells = pivot
            .entry(row.account_id.as_str())
            .or_insert_with(|| vec![None; dates.len()]);

        let Some(date) = row.date else {
            continue;
        };
        let label = date_label(date);
        if let Some(&col) = column_of.get(label.as_str()) {
            // Any row for the pair fills the cell; null fees add zero
            let cell = &mut cells[col];
            let fee = row.fee_amount.unwrap_or(Decimal::ZERO);
            *cell = Some(cell.unwrap_or(Decimal::ZERO) + fee);
        }
    }

    let rows: Vec<AccountFees> = pivot
        .into_iter()
        .map(|(account_id, daily)| {
            let total = daily.iter().flatten().sum::<Decimal>().round_dp(2);
            AccountFees {
                account_id: account_id.to_string(),
                daily,
                total,
            }
        })
        .collect();

    info!(
        "Computed fees for {} accounts across {} dates",
        rows.len(),
        dates.len()
    );
    Ok(FeeReport { dates, rows })
}

fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(id: &str, rate: Option<Decimal>) -> AccountRecord {
        AccountRecord {
            account_id: id.to_string(),
            annual_rate: rate,
        }
    }

    fn batch(day: u32, month: u32, rows: &[(Option<&str>, Option<Decimal>)]) -> SnapshotBatch {
        let date = NaiveDate::from_ymd_opt(2025, month, day).unwrap();
        SnapshotBatch {
            file_name: format!("PL Total - {:02}.{:02}.xlsx", day, month),
            date,
            rows: rows
                .iter()
                .map(|(account, value)| SnapshotRow {
                    account_id: account.map(str::to_string),
                    value: *value,
                    date,
                })
                .collect(),
        }
    }

    #[test]
    fn test_daily_rate_zero() {
        assert_eq!(daily_rate_pct(dec!(0)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_daily_rate_hundred_percent() {
        let rate = daily_rate_pct(dec!(1)).unwrap().to_f64().unwrap();
        let expected = (2f64.powf(1.0 / 252.0) - 1.0) * 100.0;
        assert!((rate - expected).abs() < 1e-12);
        assert!((rate - 0.27544).abs() < 1e-4);
    }

    #[test]
    fn test_daily_rate_below_minus_one_is_null() {
        assert_eq!(daily_rate_pct(dec!(-2)), None);
    }

    #[test]
    fn test_fee_amount_rounds_half_even() {
        assert_eq!(fee_amount(dec!(1), dec!(112.5)), Some(dec!(1.12)));
        assert_eq!(fee_amount(dec!(1), dec!(113.5)), Some(dec!(1.14)));
    }

    #[test]
    fn test_single_account_single_day() {
        let reference = vec![account("00123", Some(dec!(0.02)))];
        let batches = vec![batch(1, 3, &[(Some("00123"), Some(dec!(100000)))])];

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["01.03"]);
        assert_eq!(
            report.rows,
            vec![AccountFees {
                account_id: "00123".to_string(),
                daily: vec![Some(dec!(7.86))],
                total: dec!(7.86),
            }]
        );
    }

    #[test]
    fn test_outer_join_keeps_both_sides() {
        let reference = vec![
            account("00111", Some(dec!(0.02))),
            account("00222", Some(dec!(0.01))),
        ];
        let batches = vec![batch(
            2,
            3,
            &[(Some("00111"), Some(dec!(50000))), (Some("00999"), Some(dec!(1000)))],
        )];

        let rows = join_fee_rows(&reference, &batches);
        assert_eq!(rows.len(), 3);

        let no_snapshot = rows.iter().find(|r| r.account_id == "00222").unwrap();
        assert_eq!(no_snapshot.value, None);
        assert_eq!(no_snapshot.date, None);
        assert_eq!(no_snapshot.fee_amount, None);

        let no_rate = rows.iter().find(|r| r.account_id == "00999").unwrap();
        assert_eq!(no_rate.annual_rate, None);
        assert_eq!(no_rate.value, Some(dec!(1000)));
        assert_eq!(no_rate.fee_amount, None);

        let report = compute_daily_fees(&reference, &batches).unwrap();
        let ids: Vec<&str> = report.rows.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(ids, vec!["00111", "00222", "00999"]);
        assert_eq!(report.rows[1].daily, vec![None]);
        assert_eq!(report.rows[1].total, Decimal::ZERO);
        // A PL row without a rate still fills its cell, with a zero fee
        assert_eq!(report.rows[2].daily, vec![Some(Decimal::ZERO)]);
        assert_eq!(report.rows[2].total, Decimal::ZERO);
    }

    #[test]
    fn test_null_fees_fill_cells_with_zero() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        let batches = vec![
            batch(1, 3, &[(Some("00111"), None)]),
            batch(2, 3, &[(Some("00111"), Some(dec!(100000)))]),
            batch(2, 3, &[(Some("00111"), None)]),
        ];

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["01.03", "02.03"]);
        assert_eq!(report.rows[0].daily, vec![Some(Decimal::ZERO), Some(dec!(7.86))]);
        assert_eq!(report.rows[0].total, dec!(7.86));
    }

    #[test]
    fn test_rows_without_account_are_dropped() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        let batches = vec![
            batch(3, 3, &[(None, Some(dec!(500)))]),
            batch(4, 3, &[(Some("00111"), Some(dec!(1000)))]),
        ];

        let rows = join_fee_rows(&reference, &batches);
        assert_eq!(rows.len(), 1);

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["04.03"]);
    }

    #[test]
    fn test_duplicate_accounts_are_summed() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        let batches = vec![
            batch(5, 3, &[(Some("00111"), Some(dec!(100000)))]),
            batch(5, 3, &[(Some("00111"), Some(dec!(100000)))]),
        ];

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["05.03"]);
        assert_eq!(report.rows[0].daily, vec![Some(dec!(15.72))]);
        assert_eq!(report.rows[0].total, dec!(15.72));
    }

    #[test]
    fn test_dates_in_first_seen_order_and_total() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        let batches = vec![
            batch(10, 3, &[(Some("00111"), Some(dec!(100000)))]),
            batch(3, 3, &[(Some("00111"), Some(dec!(200000)))]),
        ];

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["10.03", "03.03"]);

        let row = &report.rows[0];
        let summed: Decimal = row.daily.iter().flatten().sum();
        assert_eq!(row.total, summed.round_dp(2));
        assert_eq!(report.grand_total(), row.total);
    }

    #[test]
    fn test_year_collision_merges_columns() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        let mut last_year = batch(1, 3, &[(Some("00111"), Some(dec!(100000)))]);
        let old = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        last_year.date = old;
        last_year.rows[0].date = old;
        let batches = vec![last_year, batch(1, 3, &[(Some("00111"), Some(dec!(100000)))])];

        let report = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(report.dates, vec!["01.03"]);
        assert_eq!(report.rows[0].daily, vec![Some(dec!(15.72))]);
    }

    #[test]
    fn test_insufficient_input() {
        let reference = vec![account("00111", Some(dec!(0.02)))];
        assert!(matches!(
            compute_daily_fees(&reference, &[]),
            Err(FeeError::InsufficientInput(_))
        ));
        assert!(matches!(
            compute_daily_fees(&[], &[batch(1, 3, &[(Some("00111"), Some(dec!(1)))])]),
            Err(FeeError::InsufficientInput(_))
        ));
        assert!(matches!(
            compute_daily_fees(&reference, &[batch(1, 3, &[])]),
            Err(FeeError::InsufficientInput(_))
        ));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let reference = vec![
            account("00111", Some(dec!(0.02))),
            account("00222", Some(dec!(0.015))),
        ];
        let batches = vec![
            batch(1, 3, &[(Some("00111"), Some(dec!(123456.78)))]),
            batch(2, 3, &[(Some("00222"), Some(dec!(98765.43)))]),
        ];

        let first = compute_daily_fees(&reference, &batches).unwrap();
        let second = compute_daily_fees(&reference, &batches).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_serializes_as_flat_records() {
        let report = FeeReport {
            dates: vec!["01.03".to_string(), "02.03".to_string()],
            rows: vec![AccountFees {
                account_id: "00111".to_string(),
                daily: vec![Some(dec!(7.86)), None],
                total: dec!(7.86),
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["conta"], "00111");
        assert_eq!(json[0]["01.03"], "7.86");
        assert!(json[0]["02.03"].is_null());
        assert_eq!(json[0]["Total"], "7.86");
    }
}
