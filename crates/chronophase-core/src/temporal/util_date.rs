//! Millisecond instants: `UtilDate` and its `SqlDate` / `SqlTimestamp` subtypes.

use super::Temporal;
use crate::converter::ConvertError;
use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, TimeZone, Utc};

const NANOS_PER_MILLI: u32 = 1_000_000;

/// An instant counted in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtilDate {
    millis: i64,
}

impl UtilDate {
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Build from calendar fields in the given zone.
    ///
    /// `month` is 1-based and `year` is the plain calendar year.
    #[allow(clippy::too_many_arguments)]
    pub fn from_ymd_hms_milli(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        milli: u32,
        offset: FixedOffset,
    ) -> Result<Self, ConvertError> {
        let local = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_milli_opt(hour, minute, second, milli))
            .ok_or_else(|| {
                ConvertError::InvalidInput(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{milli:03} is not a valid date-time"
                ))
            })?;
        let zoned = offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| ConvertError::OutOfRange(format!("{local} at {offset}")))?;
        Ok(Self::new(zoned.timestamp_millis()))
    }

    pub fn to_datetime(&self) -> Result<DateTime<Utc>, ConvertError> {
        Utc.timestamp_millis_opt(self.millis)
            .single()
            .ok_or_else(|| ConvertError::OutOfRange(format!("{} ms since epoch", self.millis)))
    }

    /// Add whole days (negative to go back). Calendar arithmetic is done at UTC.
    pub fn plus_days(&self, days: i64) -> Result<Self, ConvertError> {
        let dt = self.to_datetime()?;
        let step = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            dt.checked_add_days(step)
        } else {
            dt.checked_sub_days(step)
        };
        shifted
            .map(|d| Self::new(d.timestamp_millis()))
            .ok_or_else(|| ConvertError::OutOfRange(format!("{dt} plus {days} days")))
    }

    /// Add calendar months, clamping the day to the end of shorter months.
    pub fn plus_months(&self, months: i32) -> Result<Self, ConvertError> {
        let dt = self.to_datetime()?;
        let step = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            dt.checked_add_months(step)
        } else {
            dt.checked_sub_months(step)
        };
        shifted
            .map(|d| Self::new(d.timestamp_millis()))
            .ok_or_else(|| ConvertError::OutOfRange(format!("{dt} plus {months} months")))
    }

    pub fn plus_years(&self, years: i32) -> Result<Self, ConvertError> {
        let months = years
            .checked_mul(12)
            .ok_or_else(|| ConvertError::OutOfRange(format!("{years} years")))?;
        self.plus_months(months)
    }

    /// Calendar year at UTC.
    pub fn year(&self) -> Result<i32, ConvertError> {
        Ok(self.to_datetime()?.year())
    }
}

impl Temporal for UtilDate {
    const NAME: &'static str = "util-date";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.to_datetime()?.fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(Self::new(zoned.timestamp_millis()))
    }
}

/// A date stored as a millisecond instant, as handed out by SQL drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SqlDate(UtilDate);

impl SqlDate {
    pub fn new(millis: i64) -> Self {
        Self(UtilDate::new(millis))
    }

    pub fn millis(&self) -> i64 {
        self.0.millis()
    }
}

impl AsRef<UtilDate> for SqlDate {
    fn as_ref(&self) -> &UtilDate {
        &self.0
    }
}

impl From<UtilDate> for SqlDate {
    fn from(date: UtilDate) -> Self {
        Self(date)
    }
}

impl Temporal for SqlDate {
    const NAME: &'static str = "sql-date";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        self.0.to_zoned()
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        UtilDate::from_zoned(zoned).map(Self)
    }
}

/// A millisecond instant with a separate nanosecond field.
///
/// The millisecond part of `nanos` always agrees with the wrapped instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SqlTimestamp {
    date: UtilDate,
    nanos: u32,
}

impl SqlTimestamp {
    pub fn new(millis: i64) -> Self {
        let nanos = millis.rem_euclid(1000) as u32 * NANOS_PER_MILLI;
        Self {
            date: UtilDate::new(millis),
            nanos,
        }
    }

    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self {
            date: UtilDate::new(dt.timestamp_millis()),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    /// Replace the fractional second, keeping the whole seconds.
    pub fn with_nanos(&self, nanos: u32) -> Result<Self, ConvertError> {
        if nanos >= 1_000_000_000 {
            return Err(ConvertError::InvalidInput(format!(
                "{nanos} is not a valid nanosecond of second"
            )));
        }
        let seconds = self.date.millis().div_euclid(1000);
        Ok(Self {
            date: UtilDate::new(seconds * 1000 + (nanos / NANOS_PER_MILLI) as i64),
            nanos,
        })
    }

    pub fn millis(&self) -> i64 {
        self.date.millis()
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn to_datetime(&self) -> Result<DateTime<Utc>, ConvertError> {
        let seconds = self.date.millis().div_euclid(1000);
        Utc.timestamp_opt(seconds, self.nanos)
            .single()
            .ok_or_else(|| ConvertError::OutOfRange(format!("{seconds} s since epoch")))
    }
}

impl AsRef<UtilDate> for SqlTimestamp {
    fn as_ref(&self) -> &UtilDate {
        &self.date
    }
}

impl Temporal for SqlTimestamp {
    const NAME: &'static str = "sql-timestamp";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.to_datetime()?.fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(Self::from_datetime(&zoned.with_timezone(&Utc)))
    }
}
