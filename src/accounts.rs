//! Account identifier normalization for the control spreadsheet
//!
//! Control spreadsheet accounts carry two trailing characters that the PL
//! exports do not. Normalizing drops them and pads with "00" so both sides
//! join on the same key.

use rust_decimal::Decimal;

/// Accounts whose PL identifier carries one extra leading zero.
///
/// Historical correction list, kept literal.
pub const EXTRA_PADDING_ACCOUNTS: [&str; 9] = [
    "00989247", "00938440", "00626491", "00806386", "00431814", "00827730", "00772433",
    "00834301", "00330949",
];

const STRIPPED_SUFFIX_LEN: usize = 2;
const PADDING: &str = "00";

/// Account and annual fee rate from the control spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account_id: String,
    /// Annual rate as a fraction (0.02 = 2%)
    pub annual_rate: Option<Decimal>,
}

/// Drop the 2-character suffix and left-pad with "00".
///
/// Inputs of 2 characters or fewer collapse to "00".
pub fn normalize_account(raw: &str) -> String {
    let keep = raw.chars().count().saturating_sub(STRIPPED_SUFFIX_LEN);
    let stem: String = raw.chars().take(keep).collect();
    format!("{}{}", PADDING, stem)
}

/// Extra-padded form for accounts on the override list
pub fn extra_padded(account_id: &str) -> Option<String> {
    if EXTRA_PADDING_ACCOUNTS.contains(&account_id) {
        Some(format!("0{}", account_id))
    } else {
        None
    }
}

/// Append extra-padded copies of override accounts beneath the base records.
///
/// Both forms are kept: the base id and the id with one more leading zero.
pub fn expand_with_extra_padding(mut records: Vec<AccountRecord>) -> Vec<AccountRecord> {
    let extra: Vec<AccountRecord> = records
        .iter()
        .filter_map(|record| {
            extra_padded(&record.account_id).map(|account_id| AccountRecord {
                account_id,
                annual_rate: record.annual_rate,
            })
        })
        .collect();

    records.extend(extra);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_strips_suffix_and_pads() {
        assert_eq!(normalize_account("98924712"), "00989247");
        assert_eq!(normalize_account("12345"), "00123");
    }

    #[test]
    fn test_normalize_preserves_length() {
        for raw in ["123", "4567", "12345678", "1234567890"] {
            assert_eq!(normalize_account(raw).len(), raw.len());
        }
    }

    #[test]
    fn test_normalize_short_inputs_collapse() {
        assert_eq!(normalize_account("12"), "00");
        assert_eq!(normalize_account("7"), "00");
        assert_eq!(normalize_account(""), "00");
    }

    #[test]
    fn test_normalize_multibyte_input() {
        assert_eq!(normalize_account("çãé12"), "00çãé");
    }

    #[test]
    fn test_extra_padded_only_for_override_list() {
        assert_eq!(extra_padded("00989247"), Some("000989247".to_string()));
        assert_eq!(extra_padded("00123456"), None);
    }

    #[test]
    fn test_expand_keeps_both_forms() {
        let records = vec![
            AccountRecord {
                account_id: "00330949".to_string(),
                annual_rate: Some(dec!(0.01)),
            },
            AccountRecord {
                account_id: "00111111".to_string(),
                annual_rate: Some(dec!(0.02)),
            },
        ];

        let expanded = expand_with_extra_padding(records);
        let ids: Vec<&str> = expanded.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(ids, vec!["00330949", "00111111", "000330949"]);
        assert_eq!(expanded[2].annual_rate, Some(dec!(0.01)));
    }
}
