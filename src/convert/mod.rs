//! The object↔mapping converter.
//!
//! [`Converter::to_mapping`] walks a [`Reflect`] graph and produces the [`Value`] tree that codecs
//! encode. The reverse direction comes in two flavors: [`Converter::from_value`] rebuilds a
//! statically known type through its [`FromValue`] implementation, and
//! [`Converter::from_mapping`] rebuilds whatever type the mapping's type tag (or the caller)
//! names, returning it as a `Box<dyn Reflect>`.

use std::any::TypeId;
use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::reflect::{Object, Reflect, Reflected};
use crate::registry::{FieldType, TypeRegistry};
use crate::value::{Map, Value};

mod from_value;
mod object;

pub use self::from_value::FromValue;
pub use self::object::{FieldSource, Serdeable};
pub(crate) use self::object::{build, construct, ConstructFn};

/// Options of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Append the type tag naming the concrete type to every converted object.
    pub embed_type: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions { embed_type: true }
    }
}

/// Converts between registered objects and the mapping form.
///
/// A converter borrows the [`TypeRegistry`] that decides which types are eligible. It holds no
/// other state, so it is cheap to copy and two conversions of equal input always produce equal
/// output.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'r> {
    registry: &'r TypeRegistry,
    options: ConvertOptions,
}

impl<'r> Converter<'r> {
    /// Creates a converter over the given registry.
    pub fn new(registry: &'r TypeRegistry, options: ConvertOptions) -> Self {
        Converter { registry, options }
    }

    /// The registry deciding eligibility.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The options of this converter.
    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    /// Converts a value to the mapping form.
    ///
    /// Scalars are returned as they are, sequences and maps are converted element by element,
    /// and objects become an object of their declared fields in declaration order. Fails with
    /// [`Error::NotSerializable`] naming the innermost object that is not registered as
    /// serializable, however deep it sits in the graph.
    pub fn to_mapping(&self, value: &dyn Reflect) -> Result<Value> {
        match value.reflect() {
            Reflected::Null => Ok(Value::Null),
            Reflected::Bool(b) => Ok(Value::Bool(b)),
            Reflected::Int(n) => Ok(Value::Int(n)),
            Reflected::UInt(n) => match i64::try_from(n) {
                Ok(n) => Ok(Value::Int(n)),
                Err(_) => Err(Error::InvalidValue {
                    expected: FieldType::Int.to_string(),
                    found: n.to_string(),
                }),
            },
            Reflected::Float(f) => Ok(Value::Float(f)),
            Reflected::Str(s) => Ok(Value::String(s.to_string())),
            Reflected::Seq(items) => {
                let mut v = Vec::with_capacity(items.len());
                for item in items {
                    v.push(self.to_mapping(item)?);
                }
                Ok(Value::Array(v))
            }
            Reflected::Map(entries) => {
                let mut m = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    m.insert(key.to_string(), self.to_mapping(item)?);
                }
                Ok(Value::Object(m))
            }
            Reflected::Object(obj) => self.object_to_mapping(obj),
        }
    }

    fn object_to_mapping(&self, obj: &dyn Object) -> Result<Value> {
        let type_name = obj.type_name();
        let record = self.registry.serializable(type_name, obj.as_any().type_id())?;

        let fields = record.descriptor.fields();
        let mut m = Map::with_capacity(fields.len() + 1);
        for field in fields {
            let value = obj.field(field.name).ok_or_else(|| Error::MissingField {
                type_name: type_name.to_string(),
                field: field.name.to_string(),
            })?;
            m.insert(field.name.to_string(), self.to_mapping(value)?);
        }

        if self.options.embed_type {
            m.insert(self.registry.type_tag().to_string(), Value::String(type_name.to_string()));
        }

        Ok(Value::Object(m))
    }

    /// Rebuilds a statically known type from the mapping form.
    ///
    /// A type tag in the mapping still takes precedence over `T`: it must name a deserializable
    /// type, and that type must be `T`.
    pub fn from_value<T: FromValue>(&self, value: Value) -> Result<T> {
        T::from_value(value, self)
    }

    /// Rebuilds a value from the mapping form without knowing its type statically.
    ///
    /// Scalars come back as `bool`, `i64`, `f64`, `String` or `()`, sequences as
    /// `Vec<Box<dyn Reflect>>`. An object is rebuilt as the type named by its type tag, or
    /// failing that as `target`; if neither is available this fails with
    /// [`Error::AmbiguousType`].
    pub fn from_mapping(&self, value: Value, target: Option<&str>) -> Result<Box<dyn Reflect>> {
        self.rebuild(value, target)
    }

    // Dynamic reconstruction. Nested objects carry no declared type on this path, so they resolve
    // from their tag alone; the explicit target only applies at the top level.
    fn rebuild(&self, value: Value, explicit: Option<&str>) -> Result<Box<dyn Reflect>> {
        match value {
            Value::Null => Ok(Box::new(())),
            Value::Bool(b) => Ok(Box::new(b)),
            Value::Int(n) => Ok(Box::new(n)),
            Value::Float(f) => Ok(Box::new(f)),
            Value::String(s) => Ok(Box::new(s)),
            Value::Array(items) => {
                let mut v: Vec<Box<dyn Reflect>> = Vec::with_capacity(items.len());
                for item in items {
                    v.push(self.rebuild(item, None)?);
                }
                Ok(Box::new(v))
            }
            Value::Object(map) => {
                let tag = self.type_tag_of(&map)?;
                match tag.as_deref().or(explicit) {
                    Some(name) => {
                        let record = self.registry.deserializable(name)?;
                        (record.construct)(map, self)
                    }
                    None => Err(Error::AmbiguousType),
                }
            }
        }
    }

    /// Rebuilds a registered object of type `T`, honoring a type tag in the mapping.
    ///
    /// This is what the [`FromValue`] implementation generated by
    /// [`serdeable!`](crate::serdeable) calls.
    pub fn reconstruct<T: Serdeable>(&self, value: Value) -> Result<T> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(Error::invalid_value(T::TYPE_NAME, &other)),
        };

        let tag = self.type_tag_of(&map)?;
        let name = tag.as_deref().unwrap_or(T::TYPE_NAME);
        let record = self.registry.deserializable(name)?;

        if record.type_id == TypeId::of::<T>() {
            build::<T>(map, self)
        } else {
            (record.construct)(map, self)?
                .take::<T>()
                .ok_or_else(|| Error::TypeMismatch {
                    expected: T::TYPE_NAME.to_string(),
                    found: name.to_string(),
                })
        }
    }

    fn type_tag_of(&self, map: &Map) -> Result<Option<String>> {
        match map.get(self.registry.type_tag()) {
            None => Ok(None),
            Some(Value::String(name)) => Ok(Some(name.clone())),
            Some(other) => Err(Error::invalid_value("a type name", other)),
        }
    }
}
