//! Provider authoring helpers for Chronophase.
//!
//! Third-party crates depend on this crate alone to add temporal types:
//! it re-exports the registration surface and provides [`provider!`], a
//! declarative table of converters and hierarchy edges.

pub use rhi_chronophase_core::{
    ConvertError, ConverterDecl, Convertible, Options, OptionsExt, Provider, Registry,
    RegistryError, Temporal, TypeKey, Value, convert_between, temporal,
};

/// Declare a provider as a table of converters.
///
/// ```
/// use rhi_chronophase_plugin::{ConvertError, provider};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Meters(f64);
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Feet(f64);
///
/// fn to_feet(m: &Meters) -> Result<Feet, ConvertError> {
///     Ok(Feet(m.0 / 0.3048))
/// }
///
/// provider! {
///     /// Length conversions.
///     pub struct LengthProvider("length");
///
///     converters {
///         "length.meters-to-feet": Meters => Feet = to_feet;
///     }
/// }
/// ```
///
/// Each converter row is `"id": Source | Also | ... => Target = function;`.
/// Extra sources after `|` must implement `AsRef<Source>` and share the
/// function. An optional `extends { Child => Parent; }` block declares
/// hierarchy edges before any converter is registered.
#[macro_export]
macro_rules! provider {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($label:literal);

        $(extends {
            $($child:ty => $parent:ty;)*
        })?

        converters {
            $($id:literal : $src:ty $(| $also:ty)* => $dst:ty = $func:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Provider for $name {
            fn name(&self) -> &str {
                $label
            }

            #[allow(unused_variables)]
            fn register(
                &self,
                registry: &mut $crate::Registry,
            ) -> ::core::result::Result<(), $crate::RegistryError> {
                $($(registry.extends::<$child, $parent>()?;)*)?
                $(
                    registry.register(
                        $crate::ConverterDecl::<$src, $dst>::new($id)$(.also_from::<$also>())*,
                        $func,
                    );
                )*
                Ok(())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ticks(u64);

    #[derive(Debug, Clone, PartialEq)]
    struct Seconds(u64);

    #[derive(Debug, Clone, PartialEq)]
    struct LeapTicks(Ticks);

    impl AsRef<Ticks> for LeapTicks {
        fn as_ref(&self) -> &Ticks {
            &self.0
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SlowTicks(Ticks);

    impl AsRef<Ticks> for SlowTicks {
        fn as_ref(&self) -> &Ticks {
            &self.0
        }
    }

    fn ticks_to_seconds(t: &Ticks) -> Result<Seconds, ConvertError> {
        Ok(Seconds(t.0 / 100))
    }

    provider! {
        /// Test provider.
        struct TickProvider("ticks");

        extends {
            SlowTicks => Ticks;
        }

        converters {
            "ticks.to-seconds": Ticks | LeapTicks => Seconds = ticks_to_seconds;
            "ticks.from-seconds": Seconds => Ticks = |s: &Seconds| Ok(Ticks(s.0 * 100));
        }
    }

    provider! {
        struct EmptyProvider("empty");

        converters {}
    }

    #[test]
    fn test_table_registers_every_source() {
        let registry = Registry::from_providers([&TickProvider as &dyn Provider]).unwrap();
        assert_eq!(TickProvider.name(), "ticks");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.hierarchy_len(), 1);

        let ids: Vec<_> = registry.entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ticks.to-seconds", "ticks.to-seconds", "ticks.from-seconds"]);
    }

    #[test]
    fn test_declared_sources_and_edges_convert() {
        let registry = Registry::from_providers([&TickProvider as &dyn Provider]).unwrap();
        assert_eq!(registry.convert::<Seconds>(&Ticks(500)).unwrap(), Seconds(5));
        assert_eq!(
            registry.convert::<Seconds>(&LeapTicks(Ticks(700))).unwrap(),
            Seconds(7)
        );
        // Not a declared source, reached through the extends edge.
        assert_eq!(
            registry.convert::<Seconds>(&SlowTicks(Ticks(900))).unwrap(),
            Seconds(9)
        );
        assert_eq!(registry.convert::<Ticks>(&Seconds(2)).unwrap(), Ticks(200));
    }

    #[test]
    fn test_empty_table() {
        let registry = Registry::from_providers([&EmptyProvider as &dyn Provider]).unwrap();
        assert!(registry.is_empty());
    }
}
