//! Converters between the built-in temporal types.

use super::{
    BuddhistCalendar, Calendar, GregorianCalendar, SqlDate, SqlTimestamp, Temporal, UtilDate,
    XmlDate, convert_between,
};
use crate::converter::ConverterDecl;
use crate::hierarchy::RegistryError;
use crate::registry::{Provider, Registry};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Provider for every pair of built-in temporal types, identities included.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreProvider;

impl Provider for CoreProvider {
    fn name(&self) -> &str {
        "core"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        register_all(registry)
    }
}

/// Register the legacy type hierarchy and all core converters.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.extends::<SqlDate, UtilDate>()?;
    registry.extends::<SqlTimestamp, UtilDate>()?;
    registry.extends::<GregorianCalendar, Calendar>()?;
    registry.extends::<BuddhistCalendar, GregorianCalendar>()?;

    register_target::<NaiveDate>(registry);
    register_target::<NaiveDateTime>(registry);
    register_target::<DateTime<FixedOffset>>(registry);
    register_target::<DateTime<Utc>>(registry);
    register_target::<UtilDate>(registry);
    register_target::<SqlDate>(registry);
    register_target::<SqlTimestamp>(registry);
    register_target::<Calendar>(registry);
    register_target::<XmlDate>(registry);
    Ok(())
}

/// Register converters from every core source into `T`.
fn register_target<T: Temporal>(registry: &mut Registry) {
    bridge::<NaiveDate, T>(registry);
    bridge::<NaiveDateTime, T>(registry);
    bridge::<DateTime<FixedOffset>, T>(registry);
    bridge::<DateTime<Utc>, T>(registry);
    bridge::<UtilDate, T>(registry);
    bridge::<SqlDate, T>(registry);
    bridge::<SqlTimestamp, T>(registry);
    bridge::<XmlDate, T>(registry);

    let decl = ConverterDecl::<Calendar, T>::new(converter_id::<Calendar, T>())
        .description(describe::<Calendar, T>())
        .also_from::<GregorianCalendar>();
    registry.register(decl, convert_between::<Calendar, T>);
}

fn bridge<S: Temporal, T: Temporal>(registry: &mut Registry) {
    let decl = ConverterDecl::<S, T>::new(converter_id::<S, T>()).description(describe::<S, T>());
    registry.register(decl, convert_between::<S, T>);
}

fn converter_id<S: Temporal, T: Temporal>() -> String {
    format!("core.{}-to-{}", S::NAME, T::NAME)
}

fn describe<S: Temporal, T: Temporal>() -> String {
    format!("Convert {} to {}", S::NAME, T::NAME)
}
