//! Registry of converters and the `convert` dispatcher.

use crate::converter::{ConvertError, ConverterDecl, ConverterEntry, ErasedFn};
use crate::hierarchy::{Hierarchy, RegistryError};
use crate::key::{ConversionKey, Convertible, TypeKey};
use indexmap::IndexMap;
use std::any::Any;

/// A source of converter registrations, installed once at start-up.
pub trait Provider {
    /// Name used in settings files and logs.
    fn name(&self) -> &str;

    /// Register converters and hierarchy edges.
    fn register(&self, registry: &mut Registry) -> Result<(), RegistryError>;
}

/// Outcome of a type-level lookup, see [`Registry::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// The entry that would be applied.
    pub entry: &'a ConverterEntry,
    /// Number of hierarchy steps taken before a match (0 for an exact match).
    pub steps: usize,
}

impl Resolution<'_> {
    /// Source type the matching entry is registered under.
    pub fn via(&self) -> TypeKey {
        self.entry.key.source
    }

    pub fn is_exact(&self) -> bool {
        self.steps == 0
    }
}

/// Registry of available converters.
///
/// Built once during start-up (registration takes `&mut self`) and then
/// shared, typically behind an `Arc`. Lookups never lock.
#[derive(Clone, Default)]
pub struct Registry {
    /// Converters indexed by (source, target).
    entries: IndexMap<ConversionKey, ConverterEntry>,
    /// Child → parent edges for fallback.
    hierarchy: Hierarchy,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a fixed set of providers.
    pub fn from_providers<'a>(
        providers: impl IntoIterator<Item = &'a dyn Provider>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.install(provider)?;
        }
        Ok(registry)
    }

    /// Run a provider's registration.
    pub fn install(&mut self, provider: &dyn Provider) -> Result<(), RegistryError> {
        let before = self.entries.len();
        provider.register(self)?;
        tracing::debug!(
            provider = provider.name(),
            entries = self.entries.len() - before,
            "installed converter provider"
        );
        Ok(())
    }

    /// Register a typed converter under every source type of `decl`.
    pub fn register<S, T, F>(&mut self, decl: ConverterDecl<S, T>, func: F)
    where
        S: Any,
        T: Convertible,
        F: Fn(&S) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        for entry in decl.into_entries(func) {
            self.insert(entry);
        }
    }

    /// Register an already-erased function under `(source, target)` for each
    /// source type. An empty source set registers nothing.
    pub fn register_erased(
        &mut self,
        id: &str,
        sources: impl IntoIterator<Item = TypeKey>,
        target: TypeKey,
        func: ErasedFn,
    ) {
        for source in sources {
            let key = ConversionKey::new(source, target);
            self.insert(ConverterEntry::new(id, key, func.clone()));
        }
    }

    /// Insert an entry. A later entry for the same key replaces the earlier one.
    pub fn insert(&mut self, entry: ConverterEntry) {
        if let Some(previous) = self.entries.insert(entry.key, entry) {
            tracing::debug!(
                key = %previous.key,
                previous = %previous.id,
                replacement = %self.entries[&previous.key].id,
                "replaced converter"
            );
        }
    }

    /// Declare that `C` is a subtype of `P` for fallback purposes.
    pub fn extends<C, P>(&mut self) -> Result<(), RegistryError>
    where
        C: AsRef<P> + Any,
        P: Any,
    {
        self.hierarchy.extend::<C, P>()
    }

    /// Exact lookup, no fallback.
    pub fn lookup_exact(&self, source: TypeKey, target: TypeKey) -> Option<&ConverterEntry> {
        self.entries.get(&ConversionKey::new(source, target))
    }

    /// Whether an exact converter exists.
    pub fn contains(&self, source: TypeKey, target: TypeKey) -> bool {
        self.entries.contains_key(&ConversionKey::new(source, target))
    }

    /// Parent of `key` in the fallback hierarchy.
    pub fn parent_of(&self, key: TypeKey) -> Option<TypeKey> {
        self.hierarchy.parent_of(key)
    }

    /// Ancestors of `key`, nearest first.
    pub fn ancestors(&self, key: TypeKey) -> impl Iterator<Item = TypeKey> + '_ {
        self.hierarchy.ancestors(key)
    }

    /// Find the converter `convert` would use for a value of type `source`.
    pub fn resolve(&self, source: TypeKey, target: TypeKey) -> Option<Resolution<'_>> {
        std::iter::once(source)
            .chain(self.ancestors(source))
            .enumerate()
            .find_map(|(steps, key)| {
                self.lookup_exact(key, target)
                    .map(|entry| Resolution { entry, steps })
            })
    }

    /// Whether values of `source` can be converted to `target`, fallback included.
    pub fn supports(&self, source: TypeKey, target: TypeKey) -> bool {
        self.resolve(source, target).is_some()
    }

    /// Convert a value to the type identified by `target`.
    ///
    /// `None` converts to `None` without consulting any converter. Otherwise
    /// the exact runtime type is tried first, then each ancestor in turn.
    /// Errors raised by the converter itself are returned unchanged.
    pub fn convert_dyn(
        &self,
        value: Option<&dyn Convertible>,
        target: TypeKey,
    ) -> Result<Option<Box<dyn Convertible>>, ConvertError> {
        let Some(value) = value else {
            return Ok(None);
        };

        let origin = value.type_key();
        let mut key = origin;
        let mut current = value.as_any();

        loop {
            if let Some(entry) = self.lookup_exact(key, target) {
                if key != origin {
                    tracing::debug!(
                        from = %origin,
                        via = %key,
                        to = %target,
                        "no direct converter, using ancestor"
                    );
                }
                return entry.apply(current).map(Some);
            }

            let Some(edge) = self.hierarchy.edge(key) else {
                return Err(ConvertError::NoConverter {
                    from: origin,
                    to: target,
                });
            };
            current = (edge.upcast)(current).ok_or(ConvertError::TypeMismatch { expected: key })?;
            key = edge.parent;
        }
    }

    /// Convert a value into `T`.
    pub fn convert<T: Any>(&self, value: &dyn Convertible) -> Result<T, ConvertError> {
        let target = TypeKey::of::<T>();
        let out = self
            .convert_dyn(Some(value), target)?
            .ok_or(ConvertError::NoConverter {
                from: value.type_key(),
                to: target,
            })?;
        downcast_output(out, target)
    }

    /// Convert an optional value into `T`; `None` stays `None`.
    pub fn convert_opt<T: Any>(
        &self,
        value: Option<&dyn Convertible>,
    ) -> Result<Option<T>, ConvertError> {
        match value {
            Some(value) => self.convert(value).map(Some),
            None => Ok(None),
        }
    }

    /// Convert a batch of values into `T`, one result per input.
    #[cfg(not(feature = "parallel"))]
    pub fn convert_many<T: Any>(&self, values: &[&dyn Convertible]) -> Vec<Result<T, ConvertError>> {
        values.iter().map(|v| self.convert(*v)).collect()
    }

    /// Convert a batch of values into `T`, one result per input, in parallel.
    #[cfg(feature = "parallel")]
    pub fn convert_many<T: Any + Send>(
        &self,
        values: &[&dyn Convertible],
    ) -> Vec<Result<T, ConvertError>> {
        use rayon::prelude::*;

        values.par_iter().map(|v| self.convert(*v)).collect()
    }

    /// Iterate over all entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &ConverterEntry> {
        self.entries.values()
    }

    /// Targets with an exact converter from `source`.
    pub fn targets_from(&self, source: TypeKey) -> Vec<TypeKey> {
        self.entries
            .keys()
            .filter(|k| k.source == source)
            .map(|k| k.target)
            .collect()
    }

    /// Sources with an exact converter into `target`.
    pub fn sources_to(&self, target: TypeKey) -> Vec<TypeKey> {
        self.entries
            .keys()
            .filter(|k| k.target == target)
            .map(|k| k.source)
            .collect()
    }

    /// Number of registered (source, target) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of declared hierarchy edges.
    pub fn hierarchy_len(&self) -> usize {
        self.hierarchy.len()
    }
}

fn downcast_output<T: Any>(out: Box<dyn Convertible>, target: TypeKey) -> Result<T, ConvertError> {
    out.into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| ConvertError::TypeMismatch { expected: target })
}
