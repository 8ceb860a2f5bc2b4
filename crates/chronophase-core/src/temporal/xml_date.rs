//! XML Schema `dateTime` values.

use super::Temporal;
use crate::converter::ConvertError;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};
use std::fmt;
use std::str::FromStr;

/// Field-wise `xs:dateTime`, with an optional timezone.
///
/// A value without a timezone is read as UTC when converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmlDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    /// Offset from UTC in minutes.
    pub timezone: Option<i32>,
}

impl XmlDate {
    /// Midnight on the given date, in the given timezone.
    pub fn date(year: i32, month: u32, day: u32, timezone: Option<i32>) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            timezone,
        }
    }

    /// Local fields as a naive date-time.
    pub fn to_naive(&self) -> Result<NaiveDateTime, ConvertError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_milli_opt(self.hour, self.minute, self.second, self.millisecond))
            .ok_or_else(|| ConvertError::InvalidInput(format!("{self} has out-of-range fields")))
    }

    /// The timezone, defaulting to UTC.
    pub fn offset(&self) -> Result<FixedOffset, ConvertError> {
        let minutes = self.timezone.unwrap_or(0);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConvertError::InvalidInput(format!("timezone offset {minutes} minutes")))
    }

    fn from_parts(local: NaiveDateTime, timezone: Option<i32>) -> Self {
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            millisecond: local.nanosecond() / 1_000_000,
            timezone,
        }
    }
}

/// Keeps the zone of the value it is built from.
impl Temporal for XmlDate {
    const NAME: &'static str = "xml-date";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        let local = self.to_naive()?;
        let offset = self.offset()?;
        offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| ConvertError::OutOfRange(format!("{self}")))
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        let minutes = zoned.offset().local_minus_utc() / 60;
        Ok(Self::from_parts(zoned.naive_local(), Some(minutes)))
    }
}

impl fmt::Display for XmlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.millisecond != 0 {
            write!(f, ".{:03}", self.millisecond)?;
        }
        match self.timezone {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
            }
        }
    }
}

impl FromStr for XmlDate {
    type Err = ConvertError;

    /// Parse the lexical form, e.g. `2019-09-01T00:00:00Z` or `2019-09-01T12:30:00.250`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
            return Self::from_zoned(&zoned);
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|local| Self::from_parts(local, None))
            .map_err(|e| ConvertError::InvalidInput(format!("'{s}' is not an xs:dateTime: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_timezone_means_utc() {
        let xml = XmlDate::date(2019, 9, 1, None);
        assert_eq!(xml.to_zoned().unwrap().to_rfc3339(), "2019-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_timezone_is_kept() {
        let xml = XmlDate::date(2019, 9, 1, Some(90));
        let zoned = xml.to_zoned().unwrap();
        assert_eq!(zoned.to_rfc3339(), "2019-09-01T00:00:00+01:30");
        assert_eq!(XmlDate::from_zoned(&zoned).unwrap(), xml);
    }

    #[test]
    fn test_invalid_fields() {
        let xml = XmlDate::date(2019, 13, 1, None);
        assert!(matches!(xml.to_zoned(), Err(ConvertError::InvalidInput(_))));
    }

    #[test]
    fn test_extreme_timezones() {
        for minutes in [i32::MAX, i32::MIN, 24 * 60] {
            let xml = XmlDate::date(2019, 9, 1, Some(minutes));
            assert!(matches!(xml.offset(), Err(ConvertError::InvalidInput(_))));
            assert!(matches!(xml.to_zoned(), Err(ConvertError::InvalidInput(_))));
        }
        assert_eq!(
            XmlDate::date(2019, 9, 1, Some(i32::MIN)).to_string(),
            "2019-09-01T00:00:00-35791394:08"
        );
        let bad = XmlDate::date(2019, 13, 1, Some(i32::MAX));
        assert!(matches!(bad.to_zoned(), Err(ConvertError::InvalidInput(_))));
    }

    #[test]
    fn test_lexical_form() {
        let xml: XmlDate = "2019-09-01T12:30:00.250-05:00".parse().unwrap();
        assert_eq!(xml.hour, 12);
        assert_eq!(xml.millisecond, 250);
        assert_eq!(xml.timezone, Some(-300));
        assert_eq!(xml.to_string(), "2019-09-01T12:30:00.250-05:00");

        let naive: XmlDate = "2019-09-01T00:00:00".parse().unwrap();
        assert_eq!(naive, XmlDate::date(2019, 9, 1, None));
        assert_eq!(naive.to_string(), "2019-09-01T00:00:00");

        assert_eq!(XmlDate::date(2019, 9, 1, Some(0)).to_string(), "2019-09-01T00:00:00Z");
        assert!("yesterday".parse::<XmlDate>().is_err());
    }
}
