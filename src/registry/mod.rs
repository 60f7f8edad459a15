//! The capability registry: which types may be converted, in which direction, and with which
//! schema.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::convert::{construct, ConstructFn, Serdeable};
use crate::error::{Error, Result};

mod descriptor;

pub use self::descriptor::*;

/// The field name reserved for the type tag unless a registry is configured otherwise.
pub const DEFAULT_TYPE_TAG: &str = "@";

// Everything known about one registered type. Records are replaced, never mutated, so readers can
// hold on to one without keeping the lock.
#[derive(Clone)]
pub(crate) struct TypeRecord {
    pub(crate) type_id: TypeId,
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) capability: Capability,
    pub(crate) construct: ConstructFn,
}

/// A table of the types that may take part in conversion.
///
/// Registration is explicit: a type becomes eligible by a call to [`register`](Self::register),
/// which records its [`Capability`] and caches its [`TypeDescriptor`]. Lookups take a read lock
/// and registration takes a write lock, so a registry can be shared between threads.
///
/// # Example
///
/// ```
/// use autoserde::{serdeable, Capability, TypeRegistry};
///
/// serdeable! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Point {
///         pub x: i64,
///         pub y: i64,
///     }
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register::<Point>(Capability::SERIALIZE).unwrap();
///
/// assert!(registry.is_to_mapping_eligible("Point"));
/// assert!(!registry.is_from_mapping_eligible("Point"));
/// assert_eq!(registry.describe("Point").unwrap().fields().len(), 2);
/// ```
pub struct TypeRegistry {
    type_tag: String,
    records: RwLock<IndexMap<&'static str, Arc<TypeRecord>>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry using [`DEFAULT_TYPE_TAG`].
    pub fn new() -> Self {
        Self::with_type_tag(DEFAULT_TYPE_TAG)
    }

    /// Creates an empty registry using the given field name as type tag.
    pub fn with_type_tag(type_tag: impl Into<String>) -> Self {
        TypeRegistry {
            type_tag: type_tag.into(),
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// The field name reserved for the type tag.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Registers `T` with the given capability.
    ///
    /// Registering a type again only ever adds capabilities. Fails if a different type was
    /// already registered under the same name, or if one of the declared fields is named like
    /// the type tag.
    pub fn register<T: Serdeable>(&self, capability: Capability) -> Result<()> {
        let name = T::TYPE_NAME;
        let type_id = TypeId::of::<T>();
        let mut records = self.records.write();

        if let Some(existing) = records.get(name) {
            if existing.type_id != type_id {
                return Err(Error::DuplicateTypeName(name.to_string()));
            }

            let upgraded = existing.capability | capability;
            if upgraded != existing.capability {
                let record = TypeRecord { capability: upgraded, ..(**existing).clone() };
                records.insert(name, Arc::new(record));
                debug!(type_name = name,
                       to_mapping = upgraded.to_mapping,
                       from_mapping = upgraded.from_mapping,
                       "upgraded type capability");
            }
            return Ok(());
        }

        let descriptor = T::descriptor();
        if descriptor.field(&self.type_tag).is_some() {
            return Err(Error::ReservedField {
                type_name: name.to_string(),
                field: self.type_tag.clone(),
            });
        }

        records.insert(name, Arc::new(TypeRecord {
            type_id,
            descriptor: Arc::new(descriptor),
            capability,
            construct: construct::<T>,
        }));
        debug!(type_name = name,
               to_mapping = capability.to_mapping,
               from_mapping = capability.from_mapping,
               "registered type");
        Ok(())
    }

    /// The capability of the named type, or `None` if it was never registered.
    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.records.read().get(name).map(|r| r.capability)
    }

    /// Whether the named type may be converted to the mapping form.
    pub fn is_to_mapping_eligible(&self, name: &str) -> bool {
        self.capability(name).map_or(false, |c| c.to_mapping)
    }

    /// Whether the named type may be rebuilt from the mapping form.
    pub fn is_from_mapping_eligible(&self, name: &str) -> bool {
        self.capability(name).map_or(false, |c| c.from_mapping)
    }

    /// The cached schema of the named type.
    pub fn describe(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        self.records
            .read()
            .get(name)
            .map(|r| r.descriptor.clone())
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// The names of all registered types, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.records.read().keys().cloned().collect()
    }

    /// The number of registered types.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if no type has been registered.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    // The record of an object about to be converted to the mapping form. The type id guards
    // against an unregistered type that merely shares a registered name.
    pub(crate) fn serializable(&self, name: &str, type_id: TypeId) -> Result<Arc<TypeRecord>> {
        match self.records.read().get(name) {
            Some(r) if r.capability.to_mapping && r.type_id == type_id => Ok(r.clone()),
            _ => Err(Error::NotSerializable { type_name: name.to_string() }),
        }
    }

    // The record of a type about to be rebuilt from the mapping form.
    pub(crate) fn deserializable(&self, name: &str) -> Result<Arc<TypeRecord>> {
        match self.records.read().get(name) {
            Some(r) if r.capability.from_mapping => Ok(r.clone()),
            _ => Err(Error::NotDeserializable { type_name: name.to_string() }),
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_tag", &self.type_tag)
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    crate::serdeable! {
        #[derive(Debug, Default, PartialEq)]
        struct Plain {
            label: String,
            weight: f64,
        }
    }

    crate::serdeable! {
        #[derive(Debug, Default)]
        struct Tagged {
            name: String,
            at: i64,
        }
    }

    mod elsewhere {
        crate::serdeable! {
            #[derive(Debug, Default)]
            pub struct Plain {
                pub other: bool,
            }
        }
    }

    #[test]
    fn registration_only_upgrades() {
        let registry = TypeRegistry::new();
        registry.register::<Plain>(Capability::SERIALIZE).unwrap();
        assert_eq!(registry.capability("Plain"), Some(Capability::SERIALIZE));

        registry.register::<Plain>(Capability::DESERIALIZE).unwrap();
        assert_eq!(registry.capability("Plain"), Some(Capability::SERDE));

        registry.register::<Plain>(Capability::NONE).unwrap();
        assert_eq!(registry.capability("Plain"), Some(Capability::SERDE));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn describe_keeps_declaration_order() {
        let registry = TypeRegistry::new();
        registry.register::<Plain>(Capability::SERDE).unwrap();

        let descriptor = registry.describe("Plain").unwrap();
        assert_eq!(descriptor.name(), "Plain");
        let names: Vec<&str> = descriptor.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["label", "weight"]);
        assert_eq!(descriptor.fields()[1].ty, FieldType::Float);
    }

    #[test]
    fn describe_unknown_type() {
        let registry = TypeRegistry::new();
        let err = registry.describe("Nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registry);
        assert_eq!(err.to_string(), "type `Nope` is not registered");
    }

    #[test]
    fn unregistered_types_are_ineligible() {
        let registry = TypeRegistry::new();
        assert!(!registry.is_to_mapping_eligible("Plain"));
        assert!(!registry.is_from_mapping_eligible("Plain"));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_name_collisions() {
        let registry = TypeRegistry::new();
        registry.register::<Plain>(Capability::SERDE).unwrap();

        match registry.register::<elsewhere::Plain>(Capability::SERDE) {
            Err(Error::DuplicateTypeName(name)) => assert_eq!(name, "Plain"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_fields_named_like_the_tag() {
        let registry = TypeRegistry::with_type_tag("at");
        match registry.register::<Tagged>(Capability::SERDE) {
            Err(Error::ReservedField { type_name, field }) => {
                assert_eq!(type_name, "Tagged");
                assert_eq!(field, "at");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(TypeRegistry::new().register::<Tagged>(Capability::SERDE).is_ok());
    }

    #[test]
    fn serializable_checks_the_type_id() {
        let registry = TypeRegistry::new();
        registry.register::<Plain>(Capability::SERDE).unwrap();

        assert!(registry.serializable("Plain", TypeId::of::<Plain>()).is_ok());
        assert!(registry.serializable("Plain", TypeId::of::<elsewhere::Plain>()).is_err());
        assert!(registry.deserializable("Plain").is_ok());
    }
}
