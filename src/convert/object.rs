use tracing::trace;

use super::{Converter, FromValue};
use crate::error::Result;
use crate::reflect::{Object, Reflect};
use crate::registry::{FieldDescriptor, TypeDescriptor};
use crate::value::Map;

/// A struct that can be registered for conversion.
///
/// This is normally implemented by [`serdeable!`](crate::serdeable), which derives the descriptor
/// from the struct declaration.
pub trait Serdeable: Object + FromValue {
    /// The name the type is registered under and embedded in the type tag.
    const TYPE_NAME: &'static str;

    /// The declared fields, in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Builds an instance from the entries of a mapping.
    fn from_fields(fields: &mut FieldSource<'_>) -> Result<Self>;

    /// The schema cached by the registry.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new(Self::TYPE_NAME, Self::fields())
    }
}

/// The entries of a mapping being rebuilt into an object.
///
/// Each field is taken out once. Whatever is left once the object is built (the type tag and any
/// field the type does not declare) is ignored.
pub struct FieldSource<'r> {
    type_name: &'static str,
    entries: Map,
    cx: Converter<'r>,
}

impl<'r> FieldSource<'r> {
    /// Takes out the named field, or the type's default if the mapping has no such entry.
    pub fn take<T: FromValue + Default>(&mut self, name: &str) -> Result<T> {
        Ok(self.take_opt(name)?.unwrap_or_default())
    }

    /// Takes out the named field, or `None` if the mapping has no such entry.
    pub fn take_opt<T: FromValue>(&mut self, name: &str) -> Result<Option<T>> {
        match self.entries.shift_remove(name) {
            Some(value) => T::from_value(value, &self.cx).map(Some),
            None => Ok(None),
        }
    }

    /// The converter rebuilding this object.
    pub fn converter(&self) -> &Converter<'r> {
        &self.cx
    }

    fn finish(self) {
        let tag = self.cx.registry().type_tag();
        for key in self.entries.keys().filter(|key| key.as_str() != tag) {
            trace!(type_name = self.type_name, field = %key, "ignoring undeclared field");
        }
    }
}

/// Rebuilds a registered type from its mapping; stored in the registry for every type.
pub(crate) type ConstructFn = fn(Map, &Converter<'_>) -> Result<Box<dyn Reflect>>;

pub(crate) fn construct<T: Serdeable>(entries: Map, cx: &Converter<'_>) -> Result<Box<dyn Reflect>> {
    let value: Box<dyn Reflect> = Box::new(build::<T>(entries, cx)?);
    Ok(value)
}

pub(crate) fn build<T: Serdeable>(entries: Map, cx: &Converter<'_>) -> Result<T> {
    let mut source = FieldSource { type_name: T::TYPE_NAME, entries, cx: *cx };
    let value = T::from_fields(&mut source)?;
    source.finish();
    Ok(value)
}
