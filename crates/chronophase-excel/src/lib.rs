//! Spreadsheet serial number converters for Chronophase.
//!
//! Spreadsheets store dates as `f64` day counts. This crate registers
//! converters between those serial numbers and every core temporal type,
//! in either the 1900 or the 1904 date system.
//!
//! # Options
//!
//! - `date_system`: `"1900"` (default) or `"1904"`

mod date_system;

pub use date_system::{DateSystem, UnknownDateSystem};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rhi_chronophase_core::{
    Calendar, ConvertError, ConverterDecl, GregorianCalendar, Options, OptionsExt, Provider,
    Registry, RegistryError, SettingsError, SqlDate, SqlTimestamp, Temporal, UtilDate, XmlDate,
    convert_between,
};

/// Name of this provider in settings files.
pub const PROVIDER_NAME: &str = "excel";

/// Provider for spreadsheet serial numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExcelProvider {
    system: DateSystem,
}

impl ExcelProvider {
    pub fn new(system: DateSystem) -> Self {
        Self { system }
    }

    /// Build from settings options.
    pub fn from_options(options: &Options) -> Result<Self, SettingsError> {
        let invalid = |key: &str, message: String| SettingsError::InvalidOption {
            provider: PROVIDER_NAME.to_string(),
            key: key.to_string(),
            message,
        };

        if let Some(key) = options.keys().find(|k| k.as_str() != "date_system") {
            return Err(invalid(key, "unknown option".to_string()));
        }

        let system = match (options.get("date_system"), options.get_text("date_system")) {
            (None, _) => DateSystem::default(),
            (Some(_), Some(text)) => text
                .parse()
                .map_err(|e: UnknownDateSystem| invalid("date_system", e.to_string()))?,
            (Some(value), None) => {
                let message = format!("expected 1900 or 1904, found a {}", value.kind());
                return Err(invalid("date_system", message));
            }
        };
        Ok(Self::new(system))
    }

    pub fn system(&self) -> DateSystem {
        self.system
    }
}

impl Provider for ExcelProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn register(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        register_all(registry, self.system);
        Ok(())
    }
}

/// Register serial number converters for `system`.
pub fn register_all(registry: &mut Registry, system: DateSystem) {
    registry.register(
        ConverterDecl::<f64, f64>::new("excel.serial-identity").description("Serial number as is"),
        |serial: &f64| Ok(*serial),
    );

    register_pair::<NaiveDate>(registry, system);
    register_pair::<NaiveDateTime>(registry, system);
    register_pair::<DateTime<FixedOffset>>(registry, system);
    register_pair::<DateTime<Utc>>(registry, system);
    register_pair::<UtilDate>(registry, system);
    register_pair::<SqlDate>(registry, system);
    register_pair::<SqlTimestamp>(registry, system);
    register_pair::<XmlDate>(registry, system);

    registry.register(
        serial_decl::<Calendar>().also_from::<GregorianCalendar>(),
        move |value: &Calendar| to_serial(system, value),
    );
    register_from_serial::<Calendar>(registry, system);
}

fn register_pair<T: Temporal>(registry: &mut Registry, system: DateSystem) {
    registry.register(serial_decl::<T>(), move |value: &T| to_serial(system, value));
    register_from_serial::<T>(registry, system);
}

fn register_from_serial<T: Temporal>(registry: &mut Registry, system: DateSystem) {
    let decl = ConverterDecl::<f64, T>::new(format!("excel.serial-to-{}", T::NAME))
        .description(format!("Spreadsheet serial number to {}", T::NAME));
    registry.register(decl, move |serial: &f64| {
        convert_between::<NaiveDateTime, T>(&system.from_serial(*serial)?)
    });
}

fn serial_decl<S: Temporal>() -> ConverterDecl<S, f64> {
    ConverterDecl::new(format!("excel.{}-to-serial", S::NAME))
        .description(format!("{} to spreadsheet serial number", S::NAME))
}

fn to_serial<S: Temporal>(system: DateSystem, value: &S) -> Result<f64, ConvertError> {
    system.to_serial(&convert_between::<S, NaiveDateTime>(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rhi_chronophase_core::temporal::utc;
    use rhi_chronophase_core::{BuddhistCalendar, CoreProvider, TypeKey, Value};

    fn registry(system: DateSystem) -> Registry {
        Registry::from_providers([&CoreProvider as &dyn Provider, &ExcelProvider::new(system)])
            .unwrap()
    }

    fn sept_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_count() {
        let mut registry = Registry::new();
        register_all(&mut registry, DateSystem::Windows1900);
        // Identity, 9 targets, 9 sources plus GregorianCalendar.
        assert_eq!(registry.len(), 20);
    }

    #[test]
    fn test_serial_to_core_types() {
        let registry = registry(DateSystem::Windows1900);
        let date: NaiveDate = registry.convert(&43709.0f64).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 9, 1).unwrap());
        let instant: DateTime<Utc> = registry.convert(&43709.0f64).unwrap();
        assert_eq!(instant, sept_first());
        let millis: UtilDate = registry.convert(&43709.25f64).unwrap();
        assert_eq!(millis.millis(), sept_first().timestamp_millis() + 6 * 3_600_000);
        let same: f64 = registry.convert(&43709.25f64).unwrap();
        assert_eq!(same, 43709.25);
    }

    #[test]
    fn test_core_types_to_serial() {
        let registry = registry(DateSystem::Windows1900);
        let serial: f64 = registry.convert(&sept_first()).unwrap();
        assert_eq!(serial, 43709.0);

        let gregorian = GregorianCalendar::utc(sept_first());
        assert_eq!(registry.convert::<f64>(&gregorian).unwrap(), 43709.0);
        let buddhist = BuddhistCalendar::new(sept_first(), utc());
        assert_eq!(registry.convert::<f64>(&buddhist).unwrap(), 43709.0);

        // Zoned values use their local fields.
        let plus_six = FixedOffset::east_opt(6 * 3600).unwrap();
        let zoned = sept_first().with_timezone(&plus_six);
        assert_eq!(registry.convert::<f64>(&zoned).unwrap(), 43709.25);
    }

    #[test]
    fn test_1904_system() {
        let registry = registry(DateSystem::Mac1904);
        let serial: f64 = registry.convert(&NaiveDate::from_ymd_opt(2019, 9, 1).unwrap()).unwrap();
        assert_eq!(serial, 42247.0);
    }

    #[test]
    fn test_errors_propagate() {
        let registry = registry(DateSystem::Windows1900);
        let err = registry.convert::<NaiveDate>(&-3.0f64).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
        let err = registry.convert::<NaiveDate>(&1e19f64).unwrap_err();
        assert!(matches!(err, ConvertError::OutOfRange(_)));
        let early = NaiveDate::from_ymd_opt(1850, 1, 1).unwrap();
        let err = registry.convert::<f64>(&early).unwrap_err();
        assert!(matches!(err, ConvertError::OutOfRange(_)));
        assert!(!registry.supports(TypeKey::of::<f32>(), TypeKey::of::<NaiveDate>()));
    }

    #[test]
    fn test_from_options() {
        assert_eq!(
            ExcelProvider::from_options(&Options::new()).unwrap().system(),
            DateSystem::Windows1900
        );
        let opts = Options::new().with("date_system", 1904i64);
        assert_eq!(
            ExcelProvider::from_options(&opts).unwrap().system(),
            DateSystem::Mac1904
        );

        let opts = Options::new().with("date_system", "1970");
        assert!(matches!(
            ExcelProvider::from_options(&opts),
            Err(SettingsError::InvalidOption { ref key, .. }) if key == "date_system"
        ));
        let opts = Options::new().with("date_system", Value::Bool(true));
        assert!(ExcelProvider::from_options(&opts).is_err());
        let opts = Options::new().with("epoch", "1900");
        assert!(matches!(
            ExcelProvider::from_options(&opts),
            Err(SettingsError::InvalidOption { ref key, .. }) if key == "epoch"
        ));
    }
}
