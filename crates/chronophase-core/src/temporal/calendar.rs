//! Zone-aware calendars: `Calendar`, `GregorianCalendar`, `BuddhistCalendar`.
//!
//! Only `Calendar` and `GregorianCalendar` have converters of their own.
//! `BuddhistCalendar` is converted through its ancestors.

use super::{Temporal, utc};
use crate::converter::ConvertError;
use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Difference between the Buddhist era and the ISO year.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// An instant together with the zone its fields are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Calendar {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl Calendar {
    pub fn new(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { instant, offset }
    }

    /// A calendar reading its fields at UTC.
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self::new(instant, utc())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The instant in the calendar's own zone.
    pub fn local(&self) -> DateTime<FixedOffset> {
        self.instant.with_timezone(&self.offset)
    }

    pub fn year(&self) -> i32 {
        self.local().year()
    }

    pub fn millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }
}

/// Calendars convert at UTC and are produced at UTC.
impl Temporal for Calendar {
    const NAME: &'static str = "calendar";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        Ok(self.instant.fixed_offset())
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(Self::utc(zoned.with_timezone(&Utc)))
    }
}

/// The proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GregorianCalendar(Calendar);

impl GregorianCalendar {
    pub fn new(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(Calendar::new(instant, offset))
    }

    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self(Calendar::utc(instant))
    }

    pub fn calendar(&self) -> &Calendar {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl AsRef<Calendar> for GregorianCalendar {
    fn as_ref(&self) -> &Calendar {
        &self.0
    }
}

impl From<Calendar> for GregorianCalendar {
    fn from(calendar: Calendar) -> Self {
        Self(calendar)
    }
}

/// Thai solar calendar: Gregorian months and days, years counted in the Buddhist era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuddhistCalendar(GregorianCalendar);

impl BuddhistCalendar {
    pub fn new(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(GregorianCalendar::new(instant, offset))
    }

    pub fn gregorian(&self) -> &GregorianCalendar {
        &self.0
    }

    /// Year in the Buddhist era.
    pub fn year(&self) -> i32 {
        self.0.year() + BUDDHIST_ERA_OFFSET
    }
}

impl AsRef<GregorianCalendar> for BuddhistCalendar {
    fn as_ref(&self) -> &GregorianCalendar {
        &self.0
    }
}

impl From<GregorianCalendar> for BuddhistCalendar {
    fn from(calendar: GregorianCalendar) -> Self {
        Self(calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sept_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_local_fields_use_offset() {
        let minus_one = FixedOffset::west_opt(3600).unwrap();
        let cal = Calendar::new(sept_first(), minus_one);
        assert_eq!(cal.year(), 2019);
        assert_eq!(cal.local().to_rfc3339(), "2019-08-31T23:00:00-01:00");
        assert_eq!(cal.to_zoned().unwrap().to_rfc3339(), "2019-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_from_zoned_normalizes_to_utc() {
        let plus_two = FixedOffset::east_opt(7200).unwrap();
        let zoned = sept_first().with_timezone(&plus_two);
        let cal = Calendar::from_zoned(&zoned).unwrap();
        assert_eq!(cal, Calendar::utc(sept_first()));
    }

    #[test]
    fn test_buddhist_year() {
        let cal = BuddhistCalendar::new(sept_first(), utc());
        assert_eq!(cal.year(), 2562);
        assert_eq!(cal.gregorian().year(), 2019);
        let gregorian: &GregorianCalendar = cal.as_ref();
        assert_eq!(gregorian.calendar().instant(), sept_first());
    }
}
