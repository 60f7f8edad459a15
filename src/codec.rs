//! Codecs and the registry that selects them by format token.
//!
//! A format token is a file extension such as `.json`. Tokens are normalized before every lookup
//! and registration (see [`normalize_token`]), so `"JSON"`, `" .json"` and `"..json"` all select
//! the same codec.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::value::Value;

/// A concrete encoding of the mapping form.
pub trait Codec: Send + Sync {
    /// A short name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// The format tokens this codec owns, with their leading `.`.
    fn extensions(&self) -> &[&'static str];

    /// Encodes `value` into `writer`.
    fn dump(&self, value: &Value, writer: &mut dyn Write, options: &CodecOptions) -> Result<()>;

    /// Decodes a single value from `reader`, which must contain nothing else.
    fn load(&self, reader: &mut dyn Read, options: &CodecOptions) -> Result<Value>;

    /// Checks that the codec can be used at all, before any sink or source is opened.
    fn ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Options passed through to a codec. Codecs ignore what they have no use for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    /// Put every entry on its own line, indenting nested levels by this many spaces.
    pub indent: Option<usize>,
    /// Write non-finite floats as `NaN`, `Infinity` and `-Infinity` instead of failing.
    pub allow_nan: bool,
}

impl CodecOptions {
    /// The default options: compact output, non-finite floats rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation width.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Sets the policy for non-finite floats.
    pub fn allow_nan(mut self, allow_nan: bool) -> Self {
        self.allow_nan = allow_nan;
        self
    }
}

/// Normalizes a format token: surrounding whitespace is trimmed, any leading dots are collapsed to
/// exactly one, and ASCII letters are lowercased.
///
/// ```
/// assert_eq!(autoserde::codec::normalize_token(" ..YML "), ".yml");
/// assert_eq!(autoserde::codec::normalize_token("json"), ".json");
/// ```
pub fn normalize_token(token: &str) -> String {
    let bare = token.trim().trim_start_matches('.');
    let mut normalized = String::with_capacity(bare.len() + 1);
    normalized.push('.');
    normalized.push_str(&bare.to_ascii_lowercase());
    normalized
}

// Fails if `reader` has bytes left after a decoded value.
#[cfg(any(feature = "msgpack", feature = "bson", feature = "cbor"))]
pub(crate) fn expect_end(reader: &mut dyn Read, format: &'static str) -> Result<()> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(()),
            Ok(_) => return Err(Error::decode(format, "trailing bytes after the encoded value")),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

type Constructor = Arc<dyn Fn() -> Box<dyn Codec> + Send + Sync>;

struct CodecRecord {
    name: &'static str,
    extensions: Vec<String>,
    constructor: Constructor,
}

impl CodecRecord {
    fn new(constructor: Constructor) -> Self {
        let probe = constructor();
        let mut extensions: Vec<String> = Vec::with_capacity(probe.extensions().len());
        for ext in probe.extensions() {
            let ext = normalize_token(ext);
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        CodecRecord { name: probe.name(), extensions, constructor }
    }
}

/// Maps format tokens to codecs.
///
/// Every extension is owned by exactly one codec. Lookups scan the codecs in registration order.
pub struct CodecRegistry {
    records: RwLock<Vec<CodecRecord>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Creates a registry holding the built-in codecs.
    ///
    /// A built-in codec whose cargo feature is disabled is still registered, so that its
    /// extensions resolve, but fails with [`Error::MissingDependency`] when used.
    pub fn new() -> Self {
        let records = builtins().into_iter().map(CodecRecord::new).collect();
        CodecRegistry { records: RwLock::new(records) }
    }

    /// Creates a registry without any codec.
    pub fn empty() -> Self {
        CodecRegistry { records: RwLock::new(Vec::new()) }
    }

    /// Registers a codec constructor.
    ///
    /// The constructor is called once right away to learn the codec's name and extensions, and
    /// then once per resolution. Fails if the codec declares no extension, or if another codec
    /// already owns one of them.
    pub fn register<F>(&self, constructor: F) -> Result<()>
        where F: Fn() -> Box<dyn Codec> + Send + Sync + 'static
    {
        let record = CodecRecord::new(Arc::new(constructor));
        if record.extensions.is_empty() {
            return Err(Error::NoExtensions(record.name.to_string()));
        }

        let mut records = self.records.write();
        for ext in &record.extensions {
            if let Some(owner) = records.iter().find(|r| r.extensions.contains(ext)) {
                return Err(Error::DuplicateExtension {
                    extension: ext.clone(),
                    owner: owner.name.to_string(),
                });
            }
        }

        debug!(codec = record.name, extensions = ?record.extensions, "registered codec");
        records.push(record);
        Ok(())
    }

    /// Registers a codec type that can be built with `Default`.
    pub fn register_default<C>(&self) -> Result<()>
        where C: Codec + Default + 'static
    {
        self.register(|| -> Box<dyn Codec> { Box::new(C::default()) })
    }

    /// Returns a codec for the given format token.
    pub fn resolve(&self, token: &str) -> Result<Box<dyn Codec>> {
        let token = normalize_token(token);
        let records = self.records.read();

        match records.iter().find(|r| r.extensions.contains(&token)) {
            Some(record) => {
                debug!(token = %token, codec = record.name, "resolved codec");
                Ok((record.constructor)())
            }
            None => Err(Error::UnknownSerdeFormat { token, inferred: false }),
        }
    }

    /// The registered codecs and their extensions, in registration order.
    pub fn formats(&self) -> Vec<(&'static str, Vec<String>)> {
        self.records.read().iter().map(|r| (r.name, r.extensions.clone())).collect()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.records.read().iter().map(|r| (r.name, r.extensions.clone())))
            .finish()
    }
}

/// Stands in for a codec whose backing library is not compiled in.
///
/// It owns its extensions like the real codec would, and fails every operation with
/// [`Error::MissingDependency`].
#[derive(Debug, Clone, Copy)]
pub struct UnavailableCodec {
    name: &'static str,
    library: &'static str,
    extensions: &'static [&'static str],
}

impl UnavailableCodec {
    /// Creates a placeholder for the codec `name`, backed by the crate `library`.
    pub const fn new(name: &'static str,
                     library: &'static str,
                     extensions: &'static [&'static str])
                     -> Self {
        UnavailableCodec { name, library, extensions }
    }

    fn missing(&self) -> Error {
        Error::MissingDependency { library: self.library, required_by: None }
    }
}

impl Codec for UnavailableCodec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    fn dump(&self, _value: &Value, _writer: &mut dyn Write, _options: &CodecOptions) -> Result<()> {
        Err(self.missing())
    }

    fn load(&self, _reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        Err(self.missing())
    }

    fn ready(&self) -> Result<()> {
        Err(self.missing())
    }
}

fn available<C: Codec + Default + 'static>() -> Constructor {
    Arc::new(|| -> Box<dyn Codec> { Box::new(C::default()) })
}

#[allow(dead_code)]
fn unavailable(codec: UnavailableCodec) -> Constructor {
    Arc::new(move || -> Box<dyn Codec> { Box::new(codec) })
}

fn builtins() -> Vec<Constructor> {
    let mut builtins = vec![available::<crate::json::JsonCodec>()];

    #[cfg(feature = "yaml")]
    builtins.push(available::<crate::yaml::YamlCodec>());
    #[cfg(not(feature = "yaml"))]
    builtins.push(unavailable(UnavailableCodec::new("yaml", "serde_yaml", &[".yaml", ".yml"])));

    #[cfg(feature = "msgpack")]
    builtins.push(available::<crate::msgpack::MsgpackCodec>());
    #[cfg(not(feature = "msgpack"))]
    builtins.push(unavailable(UnavailableCodec::new("msgpack", "rmp-serde", &[".msgpack"])));

    #[cfg(feature = "bson")]
    builtins.push(available::<crate::bson::BsonCodec>());
    #[cfg(not(feature = "bson"))]
    builtins.push(unavailable(UnavailableCodec::new("bson", "bson", &[".bson"])));

    #[cfg(feature = "cbor")]
    builtins.push(available::<crate::cbor::CborCodec>());
    #[cfg(not(feature = "cbor"))]
    builtins.push(unavailable(UnavailableCodec::new("cbor", "ciborium", &[".cbor"])));

    builtins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Default)]
    struct Upper;

    impl Codec for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn extensions(&self) -> &[&'static str] {
            &[".UP", "up", ".upper"]
        }

        fn dump(&self, value: &Value, writer: &mut dyn Write, _options: &CodecOptions)
                -> Result<()> {
            let s = value.as_str().unwrap_or_default().to_uppercase();
            writer.write_all(s.as_bytes()).map_err(Error::from)
        }

        fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
            let mut s = String::new();
            reader.read_to_string(&mut s)?;
            Ok(Value::String(s.to_lowercase()))
        }
    }

    #[derive(Default)]
    struct Silent;

    impl Codec for Silent {
        fn name(&self) -> &'static str {
            "silent"
        }

        fn extensions(&self) -> &[&'static str] {
            &[]
        }

        fn dump(&self, _: &Value, _: &mut dyn Write, _: &CodecOptions) -> Result<()> {
            Ok(())
        }

        fn load(&self, _: &mut dyn Read, _: &CodecOptions) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn tokens_are_normalized() {
        assert_eq!(normalize_token("json"), ".json");
        assert_eq!(normalize_token(".JSON"), ".json");
        assert_eq!(normalize_token("  ...Yaml\t"), ".yaml");
    }

    #[test]
    fn builtins_resolve() {
        let registry = CodecRegistry::new();
        for (token, name) in &[("json", "json"), (".yml", "yaml"), ("YAML", "yaml"),
                               ("msgpack", "msgpack"), (".bson", "bson"), ("cbor", "cbor")] {
            assert_eq!(registry.resolve(token).unwrap().name(), *name);
        }

        let names: Vec<&str> = registry.formats().into_iter().map(|f| f.0).collect();
        assert_eq!(names, vec!["json", "yaml", "msgpack", "bson", "cbor"]);
    }

    #[test]
    fn unknown_tokens() {
        let registry = CodecRegistry::new();
        match registry.resolve(".foobar") {
            Err(Error::UnknownSerdeFormat { token, inferred }) => {
                assert_eq!(token, ".foobar");
                assert!(!inferred);
            }
            other => panic!("unexpected {:?}", other.map(|c| c.name())),
        }
        assert!(CodecRegistry::empty().resolve("json").is_err());
    }

    #[test]
    fn custom_codecs() {
        let registry = CodecRegistry::empty();
        registry.register_default::<Upper>().unwrap();
        assert_eq!(registry.formats(), vec![("upper", vec![".up".to_string(), ".upper".to_string()])]);

        let codec = registry.resolve("UPPER").unwrap();
        let mut out = Vec::new();
        codec.dump(&Value::from("limo"), &mut out, &CodecOptions::new()).unwrap();
        assert_eq!(out, b"LIMO");
        assert_eq!(codec.load(&mut &out[..], &CodecOptions::new()).unwrap(), Value::from("limo"));
    }

    #[test]
    fn extensions_are_exclusive() {
        let registry = CodecRegistry::empty();
        registry.register_default::<Upper>().unwrap();

        match registry.register_default::<Upper>() {
            Err(Error::DuplicateExtension { extension, owner }) => {
                assert_eq!(extension, ".up");
                assert_eq!(owner, "upper");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(registry.formats().len(), 1);
    }

    #[test]
    fn extensions_are_required() {
        let err = CodecRegistry::empty().register_default::<Silent>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registry);
        assert_eq!(err.to_string(), "codec `silent` declares no extensions");
    }

    #[test]
    fn unavailable_codecs_report_their_library() {
        let registry = CodecRegistry::empty();
        registry
            .register(|| -> Box<dyn Codec> {
                Box::new(UnavailableCodec::new("toml", "toml", &[".toml"]))
            })
            .unwrap();

        let codec = registry.resolve("toml").unwrap();
        assert!(codec.ready().is_err());
        let err = codec.dump(&Value::Null, &mut Vec::new(), &CodecOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
        assert_eq!(err.to_string(), "missing codec library `toml`");
    }
}
