use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{StudyError, StudyResult};

/// Longest custom window accepted, in days (about five years).
pub const MAX_WINDOW_DAYS: i64 = 1830;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RangeType {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl RangeType {
    /// Window length for the preset ranges.
    fn preset_days(self) -> Option<u64> {
        match self {
            RangeType::Daily => Some(1),
            RangeType::Weekly => Some(7),
            RangeType::Monthly => Some(30),
            RangeType::Yearly => Some(365),
            RangeType::Custom => None,
        }
    }
}

impl FromStr for RangeType {
    type Err = StudyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "daily" => Ok(RangeType::Daily),
            "weekly" => Ok(RangeType::Weekly),
            "monthly" => Ok(RangeType::Monthly),
            "yearly" => Ok(RangeType::Yearly),
            "custom" => Ok(RangeType::Custom),
            other => Err(StudyError::validation(
                "range_type",
                format!("unknown range type '{other}'"),
            )),
        }
    }
}

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Epoch-second bounds `[from, to)` of the window in `tz`.
    pub fn timestamp_bounds<Tz: TimeZone>(&self, tz: &Tz) -> (i64, i64) {
        let from = day_start_ts(self.start, tz);
        let to = self
            .end
            .succ_opt()
            .map(|next| day_start_ts(next, tz))
            .unwrap_or(i64::MAX);
        (from, to)
    }
}

/// Epoch seconds of local midnight. Days that skip midnight fall back to the
/// UTC reading of the same wall time.
pub fn day_start_ts<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> i64 {
    let midnight = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|moment| moment.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

fn parse_date(field: &'static str, raw: Option<&str>) -> StudyResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| StudyError::validation(field, "required for a custom range"))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| StudyError::validation(field, format!("'{raw}' is not a YYYY-MM-DD date")))
}

/// Resolves the requested window relative to `today`.
pub fn resolve_window(
    range: RangeType,
    start_date: Option<&str>,
    end_date: Option<&str>,
    today: NaiveDate,
) -> StudyResult<DateWindow> {
    if let Some(days) = range.preset_days() {
        let start = today
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(NaiveDate::MIN);
        return Ok(DateWindow { start, end: today });
    }

    let start = parse_date("start_date", start_date)?;
    let end = parse_date("end_date", end_date)?;
    if start > end {
        return Err(StudyError::validation(
            "start_date",
            "start date must not be after end date",
        ));
    }

    let window = DateWindow { start, end };
    if window.len_days() > MAX_WINDOW_DAYS {
        return Err(StudyError::validation(
            "end_date",
            format!("range may span at most {MAX_WINDOW_DAYS} days"),
        ));
    }
    Ok(window)
}
