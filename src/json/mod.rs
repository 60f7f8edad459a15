//! The json codec.
//!
//! Encoding uses a dedicated writer that controls the exact layout of the output; decoding is
//! done by `serde_json` into a [`Value`].

use std::io::{Read, Write};

use crate::codec::{Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::value::Value;

mod ser;

pub use self::ser::{EncodeJsonError, JsonSerializer, to_string, to_vec, to_writer};

/// Parses a single json value from a byte slice.
pub fn from_slice(bytes: &[u8]) -> std::result::Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Codec for `.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".json"]
    }

    fn dump(&self, value: &Value, writer: &mut dyn Write, options: &CodecOptions) -> Result<()> {
        to_writer(writer, value, options).map_err(|e| match e {
            EncodeJsonError::Io(e) => Error::Io(e),
            other => Error::encode("json", other),
        })
    }

    fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        serde_json::from_reader(reader).map_err(|e| match e.classify() {
            serde_json::error::Category::Io => Error::Io(e.into()),
            _ => Error::decode("json", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_trailing_data() {
        let codec = JsonCodec;
        let opts = CodecOptions::new();
        assert!(codec.load(&mut &b"{} {}"[..], &opts).is_err());
        assert_eq!(codec.load(&mut &b" [1, 2.5] "[..], &opts).unwrap(),
                   Value::Array(vec![Value::Int(1), Value::Float(2.5)]));
    }

    #[test]
    fn non_finite_floats_are_encode_errors() {
        let mut out = Vec::new();
        let err = JsonCodec
            .dump(&Value::Float(std::f64::INFINITY), &mut out, &CodecOptions::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to encode json");
    }

    #[test]
    fn round_trip() {
        let body = br#"{"b": [true, null, "x"], "a": {"c": -1, "d": 0.25}}"#;
        let value = from_slice(body).unwrap();
        assert_eq!(to_vec(&value, &CodecOptions::new()).unwrap(), &body[..]);
    }
}
