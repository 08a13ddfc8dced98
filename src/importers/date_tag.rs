use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::FeeError;

static DATE_TAG: OnceLock<Regex> = OnceLock::new();

fn date_tag_regex() -> &'static Regex {
    DATE_TAG.get_or_init(|| {
        Regex::new(r"PL Total - (\d{2})\.(\d{2})").expect("date tag pattern is valid")
    })
}

/// Extract the snapshot date from a PL file name (e.g. 'PL Total - 31.07.xlsx').
///
/// The year is not part of the file name; `year` is the processing year.
pub fn extract_date_tag(file_name: &str, year: i32) -> Result<NaiveDate, FeeError> {
    let caps = date_tag_regex()
        .captures(file_name)
        .ok_or_else(|| FeeError::MissingDateTag {
            file_name: file_name.to_string(),
        })?;

    let invalid = || FeeError::InvalidDateTag {
        file_name: file_name.to_string(),
        tag: format!("{}.{}", &caps[1], &caps[2]),
    };

    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    debug!("Extracted date {} from '{}'", date, file_name);
    Ok(date)
}
