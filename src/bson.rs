//! The bson codec, backed by the `bson` crate.
//!
//! Bson can only hold a document at the top level, so only objects can be encoded.

use std::io::{Read, Write};

use crate::codec::{expect_end, Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::value::Value;

/// Codec for `.bson`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonCodec;

impl Codec for BsonCodec {
    fn name(&self) -> &'static str {
        "bson"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".bson"]
    }

    fn dump(&self, value: &Value, writer: &mut dyn Write, _options: &CodecOptions) -> Result<()> {
        let bytes = ::bson::to_vec(value).map_err(|e| Error::encode("bson", e))?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        let value = ::bson::from_reader(&mut *reader).map_err(|e| Error::decode("bson", e))?;
        expect_end(reader, "bson")?;
        Ok(value)
    }
}
