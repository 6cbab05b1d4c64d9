//! Fixed-width `YYYYDDDHHMM` capture time-codes, as used in GOES CDN filenames.
use crate::error::TimeCodeError;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeCode {
    datetime: NaiveDateTime,
}

impl TimeCode {
    /// Decode a time-code as Jan 1 of the year at HH:MM plus `DDD - 1` days.
    ///
    /// Only the layout and the clock time are checked. A day-of-year past the end of the year
    /// rolls over into the following year.
    pub fn parse(code: &str) -> Result<Self, TimeCodeError> {
        let re = Regex::new(r"^(?<year>[0-9]{4})(?<day>[0-9]{3})(?<hour>[0-9]{2})(?<minute>[0-9]{2})$")
            .expect("Regex pattern should always compile");

        let captures = re
            .captures(code)
            .ok_or_else(|| TimeCodeError::Malformed(code.to_string()))?;
        let (_, [year, day, hour, minute]) = captures.extract();

        let malformed = |_| TimeCodeError::Malformed(code.to_string());
        let year: i32 = year.parse().map_err(malformed)?;
        let day: i64 = day.parse().map_err(malformed)?;
        let hour: u32 = hour.parse().map_err(malformed)?;
        let minute: u32 = minute.parse().map_err(malformed)?;

        let invalid = || TimeCodeError::InvalidTime(code.to_string());
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
        let datetime = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(invalid)?
            .and_time(time)
            .checked_add_signed(Duration::days(day - 1))
            .ok_or_else(invalid)?;

        Ok(Self { datetime })
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn format(&self) -> String {
        let dt = self.datetime;
        format!(
            "{:04}{:03}{:02}{:02}",
            dt.year(),
            dt.ordinal(),
            dt.hour(),
            dt.minute()
        )
    }
}

impl FromStr for TimeCode {
    type Err = TimeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
