//! Single-inheritance type hierarchy used for ancestor fallback.
//!
//! Rust has no subclassing, so "child extends parent" is declared explicitly
//! for types that wrap their parent (`Child: AsRef<Parent>`). The edge keeps
//! the upcast needed to hand a child value to a converter registered for the
//! parent.

use crate::key::TypeKey;
use indexmap::IndexMap;
use std::any::Any;

/// Views a child value as its parent type.
pub(crate) type Upcast = fn(&dyn Any) -> Option<&dyn Any>;

fn upcast<C: AsRef<P> + Any, P: Any>(value: &dyn Any) -> Option<&dyn Any> {
    value
        .downcast_ref::<C>()
        .map(|child| child.as_ref() as &dyn Any)
}

#[derive(Clone, Copy)]
pub(crate) struct ParentEdge {
    pub(crate) parent: TypeKey,
    pub(crate) upcast: Upcast,
}

/// Errors raised while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("declaring {child} as a subtype of {parent} would create a cycle")]
    HierarchyCycle { child: TypeKey, parent: TypeKey },

    #[error("{child} already extends {existing}, cannot also extend {requested}")]
    ParentAlreadyDeclared {
        child: TypeKey,
        existing: TypeKey,
        requested: TypeKey,
    },

    #[error("provider '{name}' failed to register: {message}")]
    Provider { name: String, message: String },
}

/// Child → parent table. Acyclic by construction.
#[derive(Clone, Default)]
pub(crate) struct Hierarchy {
    parents: IndexMap<TypeKey, ParentEdge>,
}

impl Hierarchy {
    pub(crate) fn extend<C: AsRef<P> + Any, P: Any>(&mut self) -> Result<(), RegistryError> {
        let child = TypeKey::of::<C>();
        let parent = TypeKey::of::<P>();

        if let Some(edge) = self.parents.get(&child) {
            if edge.parent == parent {
                return Ok(());
            }
            return Err(RegistryError::ParentAlreadyDeclared {
                child,
                existing: edge.parent,
                requested: parent,
            });
        }

        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(RegistryError::HierarchyCycle { child, parent });
        }

        self.parents.insert(
            child,
            ParentEdge {
                parent,
                upcast: upcast::<C, P>,
            },
        );
        Ok(())
    }

    pub(crate) fn edge(&self, child: TypeKey) -> Option<&ParentEdge> {
        self.parents.get(&child)
    }

    pub(crate) fn parent_of(&self, child: TypeKey) -> Option<TypeKey> {
        self.edge(child).map(|e| e.parent)
    }

    /// Ancestors of `key`, nearest first, excluding `key` itself.
    pub(crate) fn ancestors(&self, key: TypeKey) -> impl Iterator<Item = TypeKey> + '_ {
        std::iter::successors(self.parent_of(key), move |k| self.parent_of(*k))
    }

    pub(crate) fn len(&self) -> usize {
        self.parents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base;
    struct Mid(Base);
    struct Leaf(Mid);
    struct Other(Base);

    impl AsRef<Base> for Mid {
        fn as_ref(&self) -> &Base {
            &self.0
        }
    }

    impl AsRef<Mid> for Leaf {
        fn as_ref(&self) -> &Mid {
            &self.0
        }
    }

    impl AsRef<Base> for Other {
        fn as_ref(&self) -> &Base {
            &self.0
        }
    }

    // Only to exercise cycle detection; never instantiated.
    impl AsRef<Leaf> for Base {
        fn as_ref(&self) -> &Leaf {
            unreachable!()
        }
    }

    impl AsRef<Base> for Base {
        fn as_ref(&self) -> &Base {
            self
        }
    }

    fn chain() -> Hierarchy {
        let mut h = Hierarchy::default();
        h.extend::<Mid, Base>().unwrap();
        h.extend::<Leaf, Mid>().unwrap();
        h
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let h = chain();
        let ancestors: Vec<_> = h.ancestors(TypeKey::of::<Leaf>()).collect();
        assert_eq!(ancestors, vec![TypeKey::of::<Mid>(), TypeKey::of::<Base>()]);
        assert_eq!(h.ancestors(TypeKey::of::<Base>()).count(), 0);
    }

    #[test]
    fn test_redeclaring_same_parent_is_noop() {
        let mut h = chain();
        h.extend::<Leaf, Mid>().unwrap();
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_second_parent_rejected() {
        let mut h = chain();
        h.extend::<Other, Base>().unwrap();

        struct Twin(Base);
        impl AsRef<Base> for Twin {
            fn as_ref(&self) -> &Base {
                &self.0
            }
        }
        impl AsRef<Mid> for Twin {
            fn as_ref(&self) -> &Mid {
                unreachable!()
            }
        }
        h.extend::<Twin, Base>().unwrap();
        let err = h.extend::<Twin, Mid>().unwrap_err();
        assert!(matches!(err, RegistryError::ParentAlreadyDeclared { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut h = chain();
        let err = h.extend::<Base, Leaf>().unwrap_err();
        assert!(matches!(err, RegistryError::HierarchyCycle { .. }));

        let err = Hierarchy::default().extend::<Base, Base>().unwrap_err();
        assert!(matches!(err, RegistryError::HierarchyCycle { .. }));
    }

    #[test]
    fn test_upcast_views_parent() {
        let h = chain();
        let leaf = Leaf(Mid(Base));
        let edge = h.edge(TypeKey::of::<Leaf>()).unwrap();
        let mid = (edge.upcast)(&leaf).unwrap();
        assert!(mid.is::<Mid>());
        assert!((edge.upcast)(&Base).is_none());
    }
}
