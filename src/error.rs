//! The error type shared by every layer of the pipeline.

use std::{fmt, io};

use thiserror::Error;

/// A boxed error raised by an underlying codec library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which half of the pipeline an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Object to mapping to encoded bytes.
    Serialize,
    /// Encoded bytes to mapping to object.
    Deserialize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::Serialize => f.write_str("serialization"),
            Direction::Deserialize => f.write_str("deserialization"),
        }
    }
}

/// Everything that can go wrong while converting or encoding.
#[derive(Error, Debug)]
pub enum Error {
    /// A node of the object graph is not registered as convertible to the mapping form.
    #[error("{type_name}, please register it as serializable")]
    NotSerializable {
        /// The ineligible type, which is the innermost offending node.
        type_name: String,
    },

    /// The type resolved for a mapping is not registered as convertible from the mapping form.
    #[error("{type_name}, please register it as deserializable")]
    NotDeserializable {
        /// The resolved type.
        type_name: String,
    },

    /// No registered codec owns the format token.
    #[error("no codec registered for format {token}{}", origin(.inferred))]
    UnknownSerdeFormat {
        /// The normalized token.
        token: String,
        /// Whether the token came from a file extension rather than the caller.
        inferred: bool,
    },

    /// No format was given and none could be inferred from a file name.
    #[error("cannot infer {direction} format, specify it explicitly")]
    AmbiguousFormat {
        /// The operation that needed a format.
        direction: Direction,
    },

    /// A mapping carries no type tag and neither the caller nor the declaration names a type.
    #[error("cannot resolve the type of a mapping, embed a type tag or supply a target type")]
    AmbiguousType,

    /// The library backing a codec is not compiled in.
    #[error("missing codec library `{library}`{}", required_by_suffix(.required_by))]
    MissingDependency {
        /// The crate that would provide the codec.
        library: &'static str,
        /// The operation and format token that needed it, once known.
        required_by: Option<(Direction, String)>,
    },

    /// A type was described but never registered.
    #[error("type `{0}` is not registered")]
    UnknownType(String),

    /// A second Rust type was registered under an existing type name.
    #[error("type name `{0}` is already registered for a different type")]
    DuplicateTypeName(String),

    /// A declared field is named like the type tag.
    #[error("field `{field}` of `{type_name}` collides with the type tag")]
    ReservedField {
        /// The type being registered.
        type_name: String,
        /// The colliding field.
        field: String,
    },

    /// A codec claimed an extension another codec already owns.
    #[error("extension {extension} is already owned by codec `{owner}`")]
    DuplicateExtension {
        /// The contested extension.
        extension: String,
        /// The codec that registered it first.
        owner: String,
    },

    /// A codec declared no extensions at all.
    #[error("codec `{0}` declares no extensions")]
    NoExtensions(String),

    /// A value of the mapping form does not fit the declared type.
    #[error("expected {expected}, found {found}")]
    InvalidValue {
        /// The declared type.
        expected: String,
        /// The kind of value encountered.
        found: String,
    },

    /// The type tag resolved to a type other than the one requested.
    #[error("expected an instance of `{expected}`, the type tag names `{found}`")]
    TypeMismatch {
        /// The statically requested type.
        expected: String,
        /// The type named by the tag.
        found: String,
    },

    /// A registered object does not expose one of its declared fields.
    #[error("`{type_name}` does not expose its declared field `{field}`")]
    MissingField {
        /// The object's type.
        type_name: String,
        /// The declared field.
        field: String,
    },

    /// The codec failed to encode the mapping.
    #[error("failed to encode {format}")]
    Encode {
        /// The codec's name.
        format: &'static str,
        /// The codec library's error.
        #[source]
        source: BoxError,
    },

    /// The codec failed to decode its input.
    #[error("failed to decode {format}")]
    Decode {
        /// The codec's name.
        format: &'static str,
        /// The codec library's error.
        #[source]
        source: BoxError,
    },

    /// Opening, reading, writing or flushing a sink or source failed.
    #[error("i/o error")]
    Io(#[from] io::Error),
}

/// A flat classification of [`Error`], for callers that handle errors uniformly regardless of
/// which codec raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// [`Error::NotSerializable`]
    NotSerializable,
    /// [`Error::NotDeserializable`]
    NotDeserializable,
    /// [`Error::UnknownSerdeFormat`]
    UnknownSerdeFormat,
    /// [`Error::AmbiguousFormat`] and [`Error::AmbiguousType`]
    Ambiguous,
    /// [`Error::MissingDependency`]
    MissingDependency,
    /// Registration and lookup errors of the registries.
    Registry,
    /// The mapping form does not fit the declared types.
    Shape,
    /// Codec and i/o failures.
    Codec,
}

impl Error {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::NotSerializable { .. } => ErrorKind::NotSerializable,
            Error::NotDeserializable { .. } => ErrorKind::NotDeserializable,
            Error::UnknownSerdeFormat { .. } => ErrorKind::UnknownSerdeFormat,
            Error::AmbiguousFormat { .. } | Error::AmbiguousType => ErrorKind::Ambiguous,
            Error::MissingDependency { .. } => ErrorKind::MissingDependency,
            Error::UnknownType(_)
            | Error::DuplicateTypeName(_)
            | Error::ReservedField { .. }
            | Error::DuplicateExtension { .. }
            | Error::NoExtensions(_) => ErrorKind::Registry,
            Error::InvalidValue { .. }
            | Error::TypeMismatch { .. }
            | Error::MissingField { .. } => ErrorKind::Shape,
            Error::Encode { .. } | Error::Decode { .. } | Error::Io(_) => ErrorKind::Codec,
        }
    }

    pub(crate) fn invalid_value(expected: impl fmt::Display, found: &crate::Value) -> Self {
        Error::InvalidValue {
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    pub(crate) fn encode<E>(format: &'static str, source: E) -> Self
        where E: Into<BoxError>
    {
        Error::Encode { format, source: source.into() }
    }

    pub(crate) fn decode<E>(format: &'static str, source: E) -> Self
        where E: Into<BoxError>
    {
        Error::Decode { format, source: source.into() }
    }

    // Records that the token was inferred from a file name. Other errors pass through untouched.
    pub(crate) fn inferred_format(self, inferred: bool) -> Self {
        match self {
            Error::UnknownSerdeFormat { token, .. } => Error::UnknownSerdeFormat { token, inferred },
            other => other,
        }
    }

    // Names the operation and format that needed a missing codec library.
    pub(crate) fn required_by(self, direction: Direction, token: &str) -> Self {
        match self {
            Error::MissingDependency { library, .. } => Error::MissingDependency {
                library,
                required_by: Some((direction, token.to_string())),
            },
            other => other,
        }
    }
}

fn origin(inferred: &bool) -> &'static str {
    if *inferred {
        " (inferred from the file extension)"
    } else {
        ""
    }
}

fn required_by_suffix(required_by: &Option<(Direction, String)>) -> String {
    match *required_by {
        Some((direction, ref token)) => format!(" - required by {} format {}", direction, token),
        None => String::new(),
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
