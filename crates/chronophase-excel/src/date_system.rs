//! Spreadsheet date systems and serial number arithmetic.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rhi_chronophase_core::ConvertError;
use std::fmt;
use std::str::FromStr;

const MILLIS_PER_DAY: i64 = 86_400_000;

// Day numbers counted from 0001-01-01 (= 1), see `Datelike::num_days_from_ce`.
const CE_1899_12_30: i64 = 693_594;
const CE_1900_01_01: i64 = 693_596;
const CE_1900_03_01: i64 = 693_655;
const CE_1904_01_01: i64 = 695_056;

/// Serial numbers below this are shifted by the fictitious 1900-02-29.
const FIRST_SERIAL_AFTER_LEAP_BUG: i64 = 61;

/// Which day serial number zero refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateSystem {
    /// Day 1 is 1900-01-01. Keeps the Lotus 1-2-3 leap year bug: serial 60
    /// is the non-existent 1900-02-29, read here as 1900-03-01.
    #[default]
    Windows1900,
    /// Day 0 is 1904-01-01.
    Mac1904,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown date system '{0}', expected 1900 or 1904")]
pub struct UnknownDateSystem(pub String);

impl DateSystem {
    /// First date representable in this system.
    pub fn epoch(&self) -> NaiveDate {
        let ce = match self {
            DateSystem::Windows1900 => CE_1900_01_01,
            DateSystem::Mac1904 => CE_1904_01_01,
        };
        NaiveDate::from_num_days_from_ce_opt(ce as i32).unwrap_or(NaiveDate::MIN)
    }

    /// Serial number of a local date-time. The fraction is the time of day.
    pub fn to_serial(&self, value: &NaiveDateTime) -> Result<f64, ConvertError> {
        let ce = i64::from(value.date().num_days_from_ce());
        let days = match self {
            DateSystem::Windows1900 if ce < CE_1900_01_01 => None,
            DateSystem::Windows1900 if ce < CE_1900_03_01 => Some(ce - CE_1899_12_30 - 1),
            DateSystem::Windows1900 => Some(ce - CE_1899_12_30),
            DateSystem::Mac1904 if ce < CE_1904_01_01 => None,
            DateSystem::Mac1904 => Some(ce - CE_1904_01_01),
        }
        .ok_or_else(|| {
            ConvertError::OutOfRange(format!("{value} is before the {self} epoch"))
        })?;

        let time = value.time();
        let millis = i64::from(time.num_seconds_from_midnight()) * 1000
            + i64::from(time.nanosecond() / 1_000_000);
        Ok(days as f64 + millis as f64 / MILLIS_PER_DAY as f64)
    }

    /// Local date-time of a serial number, rounded to the millisecond.
    pub fn from_serial(&self, serial: f64) -> Result<NaiveDateTime, ConvertError> {
        if !serial.is_finite() || serial < 0.0 {
            return Err(ConvertError::InvalidInput(format!(
                "{serial} is not a spreadsheet date"
            )));
        }

        let out_of_range = || ConvertError::OutOfRange(format!("serial {serial} in {self}"));

        // Casts saturate, so huge serials land on i64::MAX and fail below.
        let whole = serial.trunc();
        let mut days = whole as i64;
        let mut millis = ((serial - whole) * MILLIS_PER_DAY as f64).round() as i64;
        if millis >= MILLIS_PER_DAY {
            days = days.checked_add(1).ok_or_else(out_of_range)?;
            millis -= MILLIS_PER_DAY;
        }

        let ce = match self {
            DateSystem::Windows1900 if days < FIRST_SERIAL_AFTER_LEAP_BUG => {
                days.checked_add(CE_1899_12_30 + 1)
            }
            DateSystem::Windows1900 => days.checked_add(CE_1899_12_30),
            DateSystem::Mac1904 => days.checked_add(CE_1904_01_01),
        };
        let date = ce
            .and_then(|ce| i32::try_from(ce).ok())
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(out_of_range)?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(
            (millis / 1000) as u32,
            (millis % 1000) as u32 * 1_000_000,
        )
        .ok_or_else(out_of_range)?;
        Ok(date.and_time(time))
    }
}

impl FromStr for DateSystem {
    type Err = UnknownDateSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1900" | "windows" => Ok(DateSystem::Windows1900),
            "1904" | "mac" => Ok(DateSystem::Mac1904),
            _ => Err(UnknownDateSystem(s.to_string())),
        }
    }
}

impl fmt::Display for DateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSystem::Windows1900 => f.write_str("1900 date system"),
            DateSystem::Mac1904 => f.write_str("1904 date system"),
        }
    }
}
