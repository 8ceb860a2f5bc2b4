//! Converter declarations, registered entries, and conversion errors.

use crate::key::{ConversionKey, Convertible, TypeKey};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased conversion function as stored in the registry.
///
/// Receives the source value viewed as `dyn Any` (already upcast to the
/// registered source type) and produces a boxed value of the target type.
pub type ErasedFn =
    Arc<dyn Fn(&dyn Any) -> Result<Box<dyn Convertible>, ConvertError> + Send + Sync>;

/// One accepted source type of a declaration, plus how to view its values as `S`.
struct SourceDecl<S> {
    key: TypeKey,
    view: fn(&dyn Any) -> Option<&S>,
}

impl<S> Clone for SourceDecl<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SourceDecl<S> {}

fn view_exact<S: Any>(value: &dyn Any) -> Option<&S> {
    value.downcast_ref::<S>()
}

fn view_via<C: AsRef<S> + Any, S: Any>(value: &dyn Any) -> Option<&S> {
    value.downcast_ref::<C>().map(AsRef::as_ref)
}

/// Declaration of a conversion from `S` (and any extra source types) into `T`.
///
/// The declaration is the typed half of a registration; the function is
/// supplied to [`Registry::register`](crate::Registry::register).
pub struct ConverterDecl<S, T> {
    /// Identifier, used in logs and introspection.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    sources: Vec<SourceDecl<S>>,
    _target: PhantomData<fn() -> T>,
}

impl<S: Any, T: Convertible> ConverterDecl<S, T> {
    /// Declare a converter accepting `S` exactly.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            sources: vec![SourceDecl {
                key: TypeKey::of::<S>(),
                view: view_exact::<S>,
            }],
            _target: PhantomData,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Also accept values of `C`, converted by viewing them as `S`.
    ///
    /// Registers the same function under `(C, T)`.
    pub fn also_from<C: AsRef<S> + Any>(mut self) -> Self {
        self.sources.push(SourceDecl {
            key: TypeKey::of::<C>(),
            view: view_via::<C, S>,
        });
        self
    }

    /// Source types this declaration registers under.
    pub fn source_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.sources.iter().map(|s| s.key)
    }

    pub fn target_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    /// Erase `func` once per declared source type.
    pub(crate) fn into_entries<F>(self, func: F) -> Vec<ConverterEntry>
    where
        F: Fn(&S) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        let func = Arc::new(func);
        let target = TypeKey::of::<T>();
        self.sources
            .into_iter()
            .map(|source| {
                let func = Arc::clone(&func);
                let erased: ErasedFn = Arc::new(move |value: &dyn Any| {
                    let input = (source.view)(value).ok_or(ConvertError::TypeMismatch {
                        expected: source.key,
                    })?;
                    Ok(Box::new(func(input)?) as Box<dyn Convertible>)
                });
                ConverterEntry::new(
                    self.id.clone(),
                    ConversionKey::new(source.key, target),
                    erased,
                )
                .description(self.description.clone())
            })
            .collect()
    }
}

/// A conversion function registered under one [`ConversionKey`].
#[derive(Clone)]
pub struct ConverterEntry {
    pub id: String,
    pub description: String,
    pub key: ConversionKey,
    func: ErasedFn,
}

impl ConverterEntry {
    pub fn new(id: impl Into<String>, key: ConversionKey, func: ErasedFn) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            key,
            func,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Apply the function. Errors from the function are returned unchanged.
    pub fn apply(&self, value: &dyn Any) -> Result<Box<dyn Convertible>, ConvertError> {
        (self.func)(value)
    }

    /// The shared function, for registering it under further keys.
    pub fn func(&self) -> ErasedFn {
        Arc::clone(&self.func)
    }
}

impl fmt::Debug for ConverterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterEntry")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur during conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no converter from {from} to {to}")]
    NoConverter { from: TypeKey, to: TypeKey },

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("converter expected a value of type {expected}")]
    TypeMismatch { expected: TypeKey },

    #[error("conversion failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Whether this is a dispatch failure rather than a converter failure.
    pub fn is_no_converter(&self) -> bool {
        matches!(self, ConvertError::NoConverter { .. })
    }
}
