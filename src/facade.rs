//! The pipeline: object → mapping → codec → sink, and back.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::codec::{normalize_token, Codec, CodecOptions, CodecRegistry};
use crate::convert::{ConvertOptions, Converter, FromValue, Serdeable};
use crate::endpoint::{Sink, Source};
use crate::error::{Direction, Error, Result};
use crate::reflect::Reflect;
use crate::registry::{Capability, TypeRegistry};
use crate::value::Value;

/// Options of a serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// The format token, such as `"json"` or `".yml"`. Inferred from the sink's file name when
    /// absent.
    pub format: Option<String>,
    /// Embed the type tag in every serialized object. On by default.
    pub embed_type: bool,
    /// Options passed to the codec.
    pub codec: CodecOptions,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions { format: None, embed_type: true, codec: CodecOptions::default() }
    }
}

impl SerializeOptions {
    /// The default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the format token.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets whether the type tag is embedded.
    pub fn embed_type(mut self, embed_type: bool) -> Self {
        self.embed_type = embed_type;
        self
    }

    /// Sets the codec options.
    pub fn codec(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the indentation width of the codec options.
    pub fn indent(mut self, indent: usize) -> Self {
        self.codec = self.codec.indent(indent);
        self
    }
}

/// Options of a deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// The format token. Inferred from the source's file name when absent.
    pub format: Option<String>,
    /// Options passed to the codec.
    pub codec: CodecOptions,
}

impl DeserializeOptions {
    /// The default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the format token.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the codec options.
    pub fn codec(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }
}

/// A type registry and a codec registry, and the pipeline running through them.
///
/// Most programs use the shared instance behind [`AutoSerde::global`] through the free functions
/// of the crate root. Separate instances keep separate registries.
#[derive(Debug, Clone)]
pub struct AutoSerde {
    types: Arc<TypeRegistry>,
    codecs: Arc<CodecRegistry>,
}

impl Default for AutoSerde {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSerde {
    /// Creates an instance with an empty type registry and the built-in codecs.
    pub fn new() -> Self {
        Self::with_registries(Arc::new(TypeRegistry::new()), Arc::new(CodecRegistry::new()))
    }

    /// Creates an instance over the given registries.
    pub fn with_registries(types: Arc<TypeRegistry>, codecs: Arc<CodecRegistry>) -> Self {
        AutoSerde { types, codecs }
    }

    /// The process-wide instance, created on first use.
    pub fn global() -> &'static AutoSerde {
        static GLOBAL: OnceLock<AutoSerde> = OnceLock::new();
        GLOBAL.get_or_init(AutoSerde::new)
    }

    /// Registers `T` in the type registry.
    pub fn register<T: Serdeable>(&self, capability: Capability) -> Result<()> {
        self.types.register::<T>(capability)
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The codec registry.
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// A converter over the type registry.
    pub fn converter(&self, options: ConvertOptions) -> Converter<'_> {
        Converter::new(&self.types, options)
    }

    /// Serializes `value` into `sink`.
    ///
    /// Returns the encoded bytes for [`Sink::Memory`], `None` otherwise. The sink is opened only
    /// after the format is resolved and the value is converted, so a failed call leaves no file
    /// behind.
    pub fn serialize(&self, value: &dyn Reflect, sink: Sink<'_>, options: &SerializeOptions)
                     -> Result<Option<Vec<u8>>> {
        let direction = Direction::Serialize;
        let token = format_token(options.format.as_deref(), sink.name(), direction)?;
        let codec = self.resolve(&token, direction)?;

        let converter = self.converter(ConvertOptions { embed_type: options.embed_type });
        let mapping = converter.to_mapping(value)?;

        let mut open = sink.open()?;
        codec
            .dump(&mapping, open.writer(), &options.codec)
            .map_err(|e| e.required_by(direction, &token.token))?;

        debug!(type_name = value.type_name(),
               codec = codec.name(),
               owned = open.owned(),
               "serialized");
        Ok(open.finish()?)
    }

    /// Deserializes a `T` from `source`.
    pub fn deserialize<T: FromValue>(&self, source: Source<'_>, options: &DeserializeOptions)
                                     -> Result<T> {
        let mapping = self.load(source, options)?;
        self.converter(ConvertOptions::default()).from_value(mapping)
    }

    /// Deserializes a value of whatever registered type the type tag names, or `target` for an
    /// untagged mapping.
    pub fn deserialize_any(&self,
                           source: Source<'_>,
                           target: Option<&str>,
                           options: &DeserializeOptions)
                           -> Result<Box<dyn Reflect>> {
        let mapping = self.load(source, options)?;
        self.converter(ConvertOptions::default()).from_mapping(mapping, target)
    }

    /// Serializes `value` into a byte vector.
    pub fn to_vec(&self, value: &dyn Reflect, options: &SerializeOptions) -> Result<Vec<u8>> {
        Ok(self.serialize(value, Sink::Memory, options)?.unwrap_or_default())
    }

    /// Serializes `value` into a string. Fails if the codec does not produce utf-8.
    pub fn to_string(&self, value: &dyn Reflect, options: &SerializeOptions) -> Result<String> {
        String::from_utf8(self.to_vec(value, options)?).map_err(|e| Error::encode("utf-8", e))
    }

    /// Serializes `value` into a borrowed stream.
    pub fn to_writer(&self, value: &dyn Reflect, writer: &mut dyn Write, options: &SerializeOptions)
                     -> Result<()> {
        self.serialize(value, Sink::writer(writer), options).map(|_| ())
    }

    /// Serializes `value` into the file at `path`.
    pub fn to_path(&self, value: &dyn Reflect, path: impl AsRef<Path>, options: &SerializeOptions)
                   -> Result<()> {
        self.serialize(value, Sink::path(path.as_ref()), options).map(|_| ())
    }

    /// Deserializes a `T` from encoded bytes.
    pub fn from_slice<T: FromValue>(&self, bytes: &[u8], options: &DeserializeOptions)
                                    -> Result<T> {
        self.deserialize(Source::from(bytes), options)
    }

    /// Deserializes a `T` from an encoded string.
    pub fn from_str<T: FromValue>(&self, s: &str, options: &DeserializeOptions) -> Result<T> {
        self.from_slice(s.as_bytes(), options)
    }

    /// Deserializes a `T` from a borrowed stream.
    pub fn from_reader<T: FromValue>(&self, reader: &mut dyn Read, options: &DeserializeOptions)
                                     -> Result<T> {
        self.deserialize(Source::reader(reader), options)
    }

    /// Deserializes a `T` from the file at `path`.
    pub fn from_path<T: FromValue>(&self, path: impl AsRef<Path>, options: &DeserializeOptions)
                                   -> Result<T> {
        self.deserialize(Source::path(path.as_ref()), options)
    }

    fn load(&self, source: Source<'_>, options: &DeserializeOptions) -> Result<Value> {
        let direction = Direction::Deserialize;
        let token = format_token(options.format.as_deref(), source.name(), direction)?;
        let codec = self.resolve(&token, direction)?;

        let mut open = source.open()?;
        let mapping = codec
            .load(open.reader(), &options.codec)
            .map_err(|e| e.required_by(direction, &token.token))?;

        debug!(codec = codec.name(), owned = open.owned(), "deserialized");
        Ok(mapping)
    }

    fn resolve(&self, token: &FormatToken, direction: Direction) -> Result<Box<dyn Codec>> {
        let codec = self
            .codecs
            .resolve(&token.token)
            .map_err(|e| e.inferred_format(token.inferred))?;
        codec.ready().map_err(|e| e.required_by(direction, &token.token))?;
        Ok(codec)
    }
}

/// Convenience methods for serdeable types, running through [`AutoSerde::global`].
pub trait SerdeExt: Serdeable {
    /// Serializes `self` into `sink`.
    fn serialize(&self, sink: Sink<'_>, options: &SerializeOptions) -> Result<Option<Vec<u8>>> {
        AutoSerde::global().serialize(self, sink, options)
    }

    /// Serializes `self` into a byte vector of the given format.
    fn to_format(&self, format: &str) -> Result<Vec<u8>> {
        AutoSerde::global().to_vec(self, &SerializeOptions::new().format(format))
    }

    /// Deserializes an instance from `source`.
    fn deserialize(source: Source<'_>, options: &DeserializeOptions) -> Result<Self> {
        AutoSerde::global().deserialize(source, options)
    }
}

impl<T: Serdeable> SerdeExt for T {}

#[derive(Debug, PartialEq, Eq)]
struct FormatToken {
    token: String,
    inferred: bool,
}

// An explicit, non-blank format wins. Otherwise the extension of the endpoint's file name is used.
fn format_token(explicit: Option<&str>, name: Option<&Path>, direction: Direction)
                -> Result<FormatToken> {
    if let Some(format) = explicit.filter(|f| !f.trim().is_empty()) {
        return Ok(FormatToken { token: normalize_token(format), inferred: false });
    }

    match name.and_then(Path::extension).and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => Ok(FormatToken { token: normalize_token(ext), inferred: true }),
        _ => Err(Error::AmbiguousFormat { direction }),
    }
}
