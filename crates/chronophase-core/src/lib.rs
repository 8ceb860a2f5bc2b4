//! Chronophase: type-keyed conversion registry for temporal values
//!
//! Converters are registered under a (source type, target type) pair. A
//! conversion looks up the value's exact runtime type first and then walks
//! up the declared type hierarchy until a converter is found.

mod converter;
mod hierarchy;
mod key;
mod registry;
mod settings;
pub mod temporal;
mod value;

pub use converter::{ConvertError, ConverterDecl, ConverterEntry, ErasedFn};
pub use hierarchy::RegistryError;
pub use key::{ConversionKey, Convertible, TypeKey};
pub use registry::{Provider, Registry, Resolution};
pub use settings::{ProviderSpec, Settings, SettingsError, SettingsFormat};
pub use temporal::{
    BuddhistCalendar, Calendar, CoreProvider, GregorianCalendar, SqlDate, SqlTimestamp, Temporal,
    UtilDate, XmlDate, convert_between,
};
pub use value::{Options, OptionsExt, Value};
