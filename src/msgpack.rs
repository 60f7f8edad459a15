//! The msgpack codec, backed by `rmp-serde`.

use std::io::{Read, Write};

use crate::codec::{expect_end, Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::value::Value;

/// Codec for `.msgpack`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackCodec;

impl Codec for MsgpackCodec {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".msgpack"]
    }

    fn dump(&self, value: &Value, mut writer: &mut dyn Write, _options: &CodecOptions)
            -> Result<()> {
        rmp_serde::encode::write(&mut writer, value).map_err(|e| Error::encode("msgpack", e))
    }

    fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        let value = rmp_serde::from_read(&mut *reader).map_err(|e| Error::decode("msgpack", e))?;
        expect_end(reader, "msgpack")?;
        Ok(value)
    }
}
