//! A third-party date type plugged into Chronophase.
//!
//! `MyDate` knows nothing of the core crate's internals: its converters are
//! declared through `rhi-chronophase-plugin` and installed like any other
//! provider.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rhi_chronophase_plugin::temporal::{
    Calendar, GregorianCalendar, SqlDate, SqlTimestamp, UtilDate, XmlDate,
};
use rhi_chronophase_plugin::{ConvertError, Temporal, convert_between, provider};
use std::fmt;

/// A plain calendar date with 1-based month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MyDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl MyDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_naive(&self) -> Result<NaiveDate, ConvertError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| ConvertError::InvalidInput(format!("{self} is not a calendar date")))
    }
}

impl From<NaiveDate> for MyDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for MyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Temporal for MyDate {
    const NAME: &'static str = "my-date";

    fn to_zoned(&self) -> Result<DateTime<FixedOffset>, ConvertError> {
        self.to_naive()?.to_zoned()
    }

    fn from_zoned(zoned: &DateTime<FixedOffset>) -> Result<Self, ConvertError> {
        Ok(zoned.date_naive().into())
    }
}

provider! {
    /// Converters between [`MyDate`] and the core temporal types.
    pub struct MyDateProvider("my-date");

    converters {
        "my-date.to-local-date": MyDate => NaiveDate = convert_between::<MyDate, NaiveDate>;
        "my-date.to-local-date-time": MyDate => NaiveDateTime = convert_between::<MyDate, NaiveDateTime>;
        "my-date.to-zoned-date-time": MyDate => DateTime<FixedOffset> = convert_between::<MyDate, DateTime<FixedOffset>>;
        "my-date.to-instant": MyDate => DateTime<Utc> = convert_between::<MyDate, DateTime<Utc>>;
        "my-date.to-util-date": MyDate => UtilDate = convert_between::<MyDate, UtilDate>;
        "my-date.to-sql-date": MyDate => SqlDate = convert_between::<MyDate, SqlDate>;
        "my-date.to-sql-timestamp": MyDate => SqlTimestamp = convert_between::<MyDate, SqlTimestamp>;
        "my-date.to-calendar": MyDate => Calendar = convert_between::<MyDate, Calendar>;
        "my-date.to-xml-date": MyDate => XmlDate = convert_between::<MyDate, XmlDate>;

        "my-date.from-local-date": NaiveDate => MyDate = |d: &NaiveDate| Ok(MyDate::from(*d));
        "my-date.from-local-date-time": NaiveDateTime => MyDate = |d: &NaiveDateTime| Ok(MyDate::from(d.date()));
        "my-date.from-zoned-date-time": DateTime<FixedOffset> => MyDate = |d: &DateTime<FixedOffset>| Ok(MyDate::from(d.date_naive()));
        "my-date.from-instant": DateTime<Utc> => MyDate = convert_between::<DateTime<Utc>, MyDate>;
        "my-date.from-util-date": UtilDate => MyDate = convert_between::<UtilDate, MyDate>;
        "my-date.from-sql-date": SqlDate => MyDate = convert_between::<SqlDate, MyDate>;
        "my-date.from-sql-timestamp": SqlTimestamp => MyDate = convert_between::<SqlTimestamp, MyDate>;
        "my-date.from-calendar": Calendar | GregorianCalendar => MyDate = convert_between::<Calendar, MyDate>;
        "my-date.from-xml-date": XmlDate => MyDate = |x: &XmlDate| Ok(MyDate::new(x.year, x.month, x.day));

        "my-date.identity": MyDate => MyDate = |d: &MyDate| Ok(*d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rhi_chronophase_plugin::temporal::{BuddhistCalendar, CoreProvider, utc};
    use rhi_chronophase_plugin::{Convertible, Provider, Registry};

    fn registry() -> Registry {
        Registry::from_providers([&CoreProvider as &dyn Provider, &MyDateProvider]).unwrap()
    }

    fn sept_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_provider_name_and_size() {
        let mut registry = Registry::new();
        registry.install(&MyDateProvider).unwrap();
        assert_eq!(MyDateProvider.name(), "my-date");
        assert_eq!(registry.len(), 20);
    }

    #[test]
    fn test_round_trip_with_core_types() {
        let registry = registry();
        let expected = MyDate::new(2019, 9, 1);
        let instant = sept_first();
        let values: Vec<Box<dyn Convertible>> = vec![
            Box::new(instant.date_naive()),
            Box::new(instant.naive_utc()),
            Box::new(instant.fixed_offset()),
            Box::new(instant),
            Box::new(UtilDate::new(instant.timestamp_millis())),
            Box::new(SqlDate::new(instant.timestamp_millis())),
            Box::new(SqlTimestamp::new(instant.timestamp_millis())),
            Box::new(Calendar::utc(instant)),
            Box::new(XmlDate::date(2019, 9, 1, None)),
        ];

        for value in &values {
            let value: &dyn Convertible = value.as_ref();
            let mine: MyDate = registry.convert(value).unwrap();
            assert_eq!(mine, expected, "from {}", value.type_key());

            let back = registry
                .convert_dyn(Some(&mine as &dyn Convertible), value.type_key())
                .unwrap()
                .unwrap();
            let again: MyDate = registry.convert(back.as_ref()).unwrap();
            assert_eq!(again, expected, "back to {}", value.type_key());
        }
    }

    #[test]
    fn test_identity_and_fallback() {
        let registry = registry();
        let date = MyDate::new(2019, 9, 1);
        assert_eq!(registry.convert::<MyDate>(&date).unwrap(), date);

        let buddhist = BuddhistCalendar::new(sept_first(), utc());
        assert_eq!(registry.convert::<MyDate>(&buddhist).unwrap(), date);
    }

    #[test]
    fn test_invalid_date() {
        let registry = registry();
        let err = registry.convert::<NaiveDate>(&MyDate::new(2019, 2, 30)).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
        assert_eq!(MyDate::new(2019, 9, 1).to_string(), "2019-09-01");
    }
}
