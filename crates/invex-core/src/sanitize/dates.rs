//! Date leaf parsing.

use chrono::NaiveDate;

use crate::invoice::rules::patterns::DATE_MDY;

/// Parse a `month/day/year` date such as `"09/01/21"`.
///
/// Two-digit years are read as `20YY`. The date must exist on the calendar;
/// `02/30/21` is rejected rather than rolled over.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_MDY.captures(s.trim())?;

    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 { Some(2000 + year) } else { Some(year) }
}
