//! The reflection surface walked by the converter.
//!
//! A type takes part in conversion by implementing [`Reflect`]: it reports its concrete type
//! name and exposes itself as one of the shapes of [`Reflected`]. Scalars and std containers are
//! implemented here; structs get their implementation from [`serdeable!`](crate::serdeable).
//!
//! Implementing `Reflect` does not make a type eligible for conversion. Objects additionally need
//! to be registered in a [`TypeRegistry`](crate::TypeRegistry) with the matching
//! [`Capability`](crate::Capability).

use std::any::Any;
use std::fmt;

mod impls;

/// A value the converter can walk.
pub trait Reflect: Any {
    /// The name of the concrete runtime type.
    ///
    /// For objects this is the name the type is registered under, and the name embedded in the
    /// type tag. Wrappers such as `Box<dyn Reflect>` report the name of the wrapped value.
    fn type_name(&self) -> &'static str;

    /// Exposes the shape of this value.
    fn reflect(&self) -> Reflected<'_>;

    /// Upcast to `Any`, reaching through wrappers to the concrete value.
    fn as_any(&self) -> &dyn Any;

    /// Owned upcast to `Any`, reaching through wrappers to the concrete value.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// The shape of a reflected value.
pub enum Reflected<'a> {
    /// Absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer, which must still fit an `i64` to be converted.
    UInt(u64),
    /// A float.
    Float(f64),
    /// A string.
    Str(&'a str),
    /// A sequence or set, in iteration order.
    Seq(Vec<&'a dyn Reflect>),
    /// A string-keyed map, in iteration order.
    Map(Vec<(&'a str, &'a dyn Reflect)>),
    /// A struct with named fields.
    Object(&'a dyn Object),
}

/// A struct whose fields can be looked up by their declared name.
pub trait Object: Reflect {
    /// Returns the named field, or `None` if there is no such field.
    fn field(&self, name: &str) -> Option<&dyn Reflect>;
}

impl dyn Reflect {
    /// Returns `true` if the concrete value is a `T`.
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrows the concrete value as a `T`.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Converts into a box of the concrete `T`, handing the value back as `Any` on mismatch.
    pub fn downcast<T: Reflect>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }

    /// Takes the concrete value out as a `T`.
    pub fn take<T: Reflect>(self: Box<Self>) -> Option<T> {
        self.downcast::<T>().ok().map(|b| *b)
    }
}

// Objects print by type name only: `Object` has no field enumeration.
impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reflect() {
            Reflected::Null => f.write_str("None"),
            Reflected::Bool(b) => fmt::Debug::fmt(&b, f),
            Reflected::Int(n) => fmt::Debug::fmt(&n, f),
            Reflected::UInt(n) => fmt::Debug::fmt(&n, f),
            Reflected::Float(x) => fmt::Debug::fmt(&x, f),
            Reflected::Str(s) => fmt::Debug::fmt(s, f),
            Reflected::Seq(items) => f.debug_list().entries(items).finish(),
            Reflected::Map(entries) => f.debug_map().entries(entries).finish(),
            Reflected::Object(_) => f.debug_struct(self.type_name()).finish_non_exhaustive(),
        }
    }
}
