//! Type resolution for polymorphism tags.
//!
//! A tagged object names its concrete type as `!module: full::type::Name`. The mapper
//! hands both halves to a [`TypeResolver`], which answers with the type's descriptor.
//! [`TypeRegistry`] is the stock resolver: an explicit table filled at startup.

use std::collections::HashMap;

use crate::reflect::{TypeInfo, Typed};
use crate::{Error, Result};

/// Maps a `(module, type name)` pair from a polymorphism tag to a type descriptor.
pub trait TypeResolver {
    /// # Errors
    ///
    /// Returns [`Error::UnknownModule`] or [`Error::UnknownType`] when the pair names
    /// nothing this resolver knows.
    fn resolve(&self, module: &str, name: &str) -> Result<TypeInfo>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str, &str) -> Result<TypeInfo>,
{
    fn resolve(&self, module: &str, name: &str) -> Result<TypeInfo> {
        self(module, name)
    }
}

/// Registry of the types that may appear behind a polymorphism tag.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{reflect_record, TypeRegistry, TypeResolver};
///
/// #[derive(Default)]
/// struct Slime {
///     health: u8,
/// }
///
/// reflect_record!(Slime in "game" { health: u8 });
///
/// let registry = TypeRegistry::new().with::<Slime>();
/// let info = registry.resolve("game", std::any::type_name::<Slime>()).unwrap();
/// assert!(info.is::<Slime>());
/// assert!(registry.resolve("engine", "Slime").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    modules: HashMap<&'static str, HashMap<&'static str, TypeInfo>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its own module and name.
    pub fn register<T: Typed>(&mut self) -> &mut Self {
        self.register_info(T::type_info())
    }

    /// Registers a descriptor; a later registration of the same name replaces it.
    pub fn register_info(&mut self, info: TypeInfo) -> &mut Self {
        tracing::trace!(module = info.module, name = info.name, "registering type");
        self.modules
            .entry(info.module)
            .or_default()
            .insert(info.name, info);
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<T: Typed>(mut self) -> Self {
        self.register::<T>();
        self
    }

    #[must_use]
    pub fn get(&self, module: &str, name: &str) -> Option<TypeInfo> {
        self.modules.get(module)?.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, module: &str, name: &str) -> bool {
        self.get(module, name).is_some()
    }

    /// Number of registered types across all modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, module: &str, name: &str) -> Result<TypeInfo> {
        let Some(types) = self.modules.get(module) else {
            tracing::debug!(module, name, "polymorphism tag names an unknown module");
            return Err(Error::UnknownModule(module.to_string()));
        };
        types.get(name).copied().ok_or_else(|| {
            tracing::debug!(module, name, "polymorphism tag names an unknown type");
            Error::UnknownType {
                module: module.to_string(),
                name: name.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types_resolve_under_std() {
        let registry = TypeRegistry::new().with::<String>().with::<Vec<i32>>();
        assert_eq!(registry.len(), 2);

        let info = registry
            .resolve("std", std::any::type_name::<Vec<i32>>())
            .unwrap();
        assert!(info.is::<Vec<i32>>());
    }

    #[test]
    fn test_unknown_module_and_type_are_distinguished() {
        let registry = TypeRegistry::new().with::<u8>();

        assert!(matches!(
            registry.resolve("game", "u8"),
            Err(Error::UnknownModule(m)) if m == "game"
        ));
        assert!(matches!(
            registry.resolve("std", "u16"),
            Err(Error::UnknownType { name, .. }) if name == "u16"
        ));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &str, name: &str| -> Result<TypeInfo> {
            match name {
                "text" => Ok(TypeInfo::of::<String>()),
                _ => Err(Error::UnknownType {
                    module: String::new(),
                    name: name.to_string(),
                }),
            }
        };
        assert!(resolver.resolve("any", "text").unwrap().is::<String>());
        assert!(resolver.resolve("any", "blob").is_err());
    }
}
