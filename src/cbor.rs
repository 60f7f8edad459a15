//! The cbor codec, backed by `ciborium`.

use std::io::{Read, Write};

use crate::codec::{expect_end, Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::value::Value;

/// Codec for `.cbor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn name(&self) -> &'static str {
        "cbor"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".cbor"]
    }

    fn dump(&self, value: &Value, writer: &mut dyn Write, _options: &CodecOptions) -> Result<()> {
        ciborium::ser::into_writer(value, writer).map_err(|e| match e {
            ciborium::ser::Error::Io(e) => Error::Io(e),
            other => Error::encode("cbor", other),
        })
    }

    fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        let value = ciborium::de::from_reader(&mut *reader).map_err(|e| match e {
            ciborium::de::Error::Io(e) => Error::Io(e),
            other => Error::decode("cbor", other),
        })?;
        expect_end(reader, "cbor")?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    #[test]
    fn keeps_integers_and_floats_apart() {
        let mut m = Map::new();
        m.insert("int".to_string(), Value::Int(1));
        m.insert("float".to_string(), Value::Float(1.0));
        m.insert("big".to_string(), Value::Int(i64::min_value()));
        let value = Value::Object(m);

        let mut bytes = Vec::new();
        CborCodec.dump(&value, &mut bytes, &CodecOptions::new()).unwrap();
        assert_eq!(CborCodec.load(&mut &bytes[..], &CodecOptions::new()).unwrap(), value);
    }

    #[test]
    fn rejects_garbage() {
        let err = CborCodec.load(&mut &[0xffu8, 0x00][..], &CodecOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "failed to decode cbor");

        let err = CborCodec.load(&mut &[0x01u8, 0x01][..], &CodecOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "failed to decode cbor");
    }
}
