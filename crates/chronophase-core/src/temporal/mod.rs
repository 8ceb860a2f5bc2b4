//! Built-in temporal types and the core provider.
//!
//! Every built-in type can be viewed as a zoned date-time. Conversions between
//! two types go through that view: the source produces it (zone-less sources
//! are placed at UTC) and the target reads back whatever it keeps of it.

mod calendar;
mod provider;
mod util_date;
mod xml_date;

pub use calendar::{BuddhistCalendar, Calendar, GregorianCalendar};
pub use provider::{CoreProvider, register_all};
pub use util_date::{SqlDate, SqlTimestamp, UtilDate};
pub use xml_date::XmlDate;

use crate::converter::ConvertError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use std::any::Any;

/// A temporal type that round-trips through a zoned date-time.
pub trait Temporal: Clone + Send + Sync + 'static {
    /// Short identifier used in converter ids, e.g. `local-date`.
    const NAME: &'static str;

    /// The value as a zoned date-time. Types without a zone are placed at UTC.
    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError>;

    /// Build a value from a zoned date-time.
    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError>;
}

/// Convert between two temporal types through their zoned view.
///
/// When `S` and `T` are the same type the value is returned unchanged.
pub fn convert_between<S: Temporal, T: Temporal>(value: &S) -> Result<T, ConvertError> {
    if let Some(same) = (value as &dyn Any).downcast_ref::<T>() {
        return Ok(same.clone());
    }
    T::from_zoned(&value.to_zoned()?)
}

/// The UTC offset as a `FixedOffset`.
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Local date and time of day, taken from its own fields.
impl Temporal for NaiveDate {
    const NAME: &'static str = "local-date";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.and_time(NaiveTime::MIN).and_utc().fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(zoned.date_naive())
    }
}

impl Temporal for NaiveDateTime {
    const NAME: &'static str = "local-date-time";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.and_utc().fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(zoned.naive_local())
    }
}

/// Zoned date-times produced by conversion are always at UTC.
impl Temporal for DateTime<FixedOffset> {
    const NAME: &'static str = "zoned-date-time";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(*self)
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(zoned.with_timezone(&utc()))
    }
}

impl Temporal for DateTime<Utc> {
    const NAME: &'static str = "instant";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(zoned.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_local_date_at_utc_midnight() {
        let zoned = date(2019, 9, 1).to_zoned().unwrap();
        assert_eq!(zoned.to_rfc3339(), "2019-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_local_fields_kept_from_offset_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let zoned = date(2019, 9, 1)
            .and_hms_opt(1, 0, 0)
            .unwrap()
            .and_local_timezone(plus_two)
            .unwrap();

        // Local targets keep the wall-clock fields.
        let local: NaiveDate = convert_between(&zoned).unwrap();
        assert_eq!(local, date(2019, 9, 1));

        // Zoned and instant targets normalize to UTC.
        let normalized: DateTime<FixedOffset> = DateTime::<FixedOffset>::from_zoned(&zoned).unwrap();
        assert_eq!(normalized.offset(), &utc());
        assert_eq!(normalized.to_rfc3339(), "2019-08-31T23:00:00+00:00");
        let instant: DateTime<Utc> = convert_between(&zoned).unwrap();
        assert_eq!(instant.to_rfc3339(), "2019-08-31T23:00:00+00:00");
    }

    #[test]
    fn test_same_type_is_unchanged() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let zoned = date(2019, 9, 1)
            .and_hms_opt(1, 0, 0)
            .unwrap()
            .and_local_timezone(plus_two)
            .unwrap();
        let same: DateTime<FixedOffset> = convert_between(&zoned).unwrap();
        assert_eq!(same.offset(), &plus_two);
    }
}
