//! This crate serializes registered Rust types through a format-agnostic mapping form into json,
//! yaml, msgpack, bson or cbor, selected by file extension or by name.
//!
//! Serialization runs in two layers. The [converter](Converter) walks an object graph and turns
//! it into a [`Value`], an order-preserving tree of maps, sequences and scalars, embedding the
//! concrete type name of every object under a type tag (`"@"` by default). A [codec](Codec),
//! looked up by format token in the [`CodecRegistry`], then encodes that tree into a [`Sink`].
//! Deserialization is the mirror image: the type tag lets a value be rebuilt without the caller
//! naming its type.
//!
//! Only registered types take part in conversion, and only in the directions they were registered
//! for. The check applies to every nested object, and errors name the innermost offender.
//!
//! ```
//! use autoserde::{serdeable, Capability, DeserializeOptions, SerializeOptions};
//!
//! serdeable! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Normal {
//!         pub str_value: String,
//!         pub int_value: i64,
//!     }
//! }
//!
//! serdeable! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct NestedSerdeable {
//!         pub a: Normal,
//!         pub count: i64,
//!     }
//! }
//!
//! autoserde::register::<Normal>(Capability::SERDE).unwrap();
//! autoserde::register::<NestedSerdeable>(Capability::SERDE).unwrap();
//!
//! let nested = NestedSerdeable {
//!     a: Normal { str_value: "limo".to_string(), int_value: 10 },
//!     count: 20,
//! };
//! let bytes = autoserde::to_vec(&nested, &SerializeOptions::new().format("yaml")).unwrap();
//!
//! let back = autoserde::deserialize_any(bytes.as_slice().into(),
//!                                       None,
//!                                       &DeserializeOptions::new().format("yml"))
//!     .unwrap();
//! assert_eq!(back.downcast_ref::<NestedSerdeable>(), Some(&nested));
//! ```
#![warn(missing_docs)]

use std::io::{Read, Write};
use std::path::Path;

mod macros;

pub mod value;
pub mod error;
pub mod reflect;
pub mod registry;
pub mod convert;
pub mod codec;
pub mod endpoint;
mod facade;

pub mod json;
#[cfg(feature = "yaml")]
pub mod yaml;
#[cfg(feature = "msgpack")]
pub mod msgpack;
#[cfg(feature = "bson")]
pub mod bson;
#[cfg(feature = "cbor")]
pub mod cbor;

pub use self::codec::{Codec, CodecOptions, CodecRegistry, UnavailableCodec};
pub use self::convert::{ConvertOptions, Converter, FieldSource, FromValue, Serdeable};
pub use self::endpoint::{Sink, Source};
pub use self::error::{Direction, Error, ErrorKind, Result};
pub use self::facade::{AutoSerde, DeserializeOptions, SerdeExt, SerializeOptions};
pub use self::reflect::{Object, Reflect};
pub use self::registry::{Capability, FieldDescriptor, FieldType, TypeDescriptor, TypeRegistry};
pub use self::value::{Map, Value};

/// Registers `T` in the registry of [`AutoSerde::global`].
pub fn register<T: Serdeable>(capability: Capability) -> Result<()> {
    AutoSerde::global().register::<T>(capability)
}

/// Serializes `value` into `sink` through [`AutoSerde::global`].
pub fn serialize(value: &dyn Reflect, sink: Sink<'_>, options: &SerializeOptions)
                 -> Result<Option<Vec<u8>>> {
    AutoSerde::global().serialize(value, sink, options)
}

/// Deserializes a `T` from `source` through [`AutoSerde::global`].
pub fn deserialize<T: FromValue>(source: Source<'_>, options: &DeserializeOptions) -> Result<T> {
    AutoSerde::global().deserialize(source, options)
}

/// Deserializes a value of the type named by its type tag, or `target` for an untagged mapping,
/// through [`AutoSerde::global`].
pub fn deserialize_any(source: Source<'_>, target: Option<&str>, options: &DeserializeOptions)
                       -> Result<Box<dyn Reflect>> {
    AutoSerde::global().deserialize_any(source, target, options)
}

/// Serializes `value` into a byte vector.
pub fn to_vec(value: &dyn Reflect, options: &SerializeOptions) -> Result<Vec<u8>> {
    AutoSerde::global().to_vec(value, options)
}

/// Serializes `value` into a string.
pub fn to_string(value: &dyn Reflect, options: &SerializeOptions) -> Result<String> {
    AutoSerde::global().to_string(value, options)
}

/// Serializes `value` into a borrowed stream.
pub fn to_writer(value: &dyn Reflect, writer: &mut dyn Write, options: &SerializeOptions)
                 -> Result<()> {
    AutoSerde::global().to_writer(value, writer, options)
}

/// Serializes `value` into the file at `path`, inferring the format from its extension unless
/// one is given.
pub fn to_path(value: &dyn Reflect, path: impl AsRef<Path>, options: &SerializeOptions)
               -> Result<()> {
    AutoSerde::global().to_path(value, path, options)
}

/// Deserializes a `T` from encoded bytes.
pub fn from_slice<T: FromValue>(bytes: &[u8], options: &DeserializeOptions) -> Result<T> {
    AutoSerde::global().from_slice(bytes, options)
}

/// Deserializes a `T` from an encoded string.
pub fn from_str<T: FromValue>(s: &str, options: &DeserializeOptions) -> Result<T> {
    AutoSerde::global().from_str(s, options)
}

/// Deserializes a `T` from a borrowed stream.
pub fn from_reader<T: FromValue>(reader: &mut dyn Read, options: &DeserializeOptions)
                                 -> Result<T> {
    AutoSerde::global().from_reader(reader, options)
}

/// Deserializes a `T` from the file at `path`, inferring the format from its extension unless
/// one is given.
pub fn from_path<T: FromValue>(path: impl AsRef<Path>, options: &DeserializeOptions) -> Result<T> {
    AutoSerde::global().from_path(path, options)
}
