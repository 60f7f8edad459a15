//! The yaml codec, backed by `serde_yaml`.

use std::io::{Read, Write};

use crate::codec::{Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::value::Value;

/// Codec for `.yaml` and `.yml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &[&'static str] {
        &[".yaml", ".yml"]
    }

    fn dump(&self, value: &Value, writer: &mut dyn Write, _options: &CodecOptions) -> Result<()> {
        serde_yaml::to_writer(writer, value).map_err(|e| Error::encode("yaml", e))
    }

    fn load(&self, reader: &mut dyn Read, _options: &CodecOptions) -> Result<Value> {
        serde_yaml::from_reader(reader).map_err(|e| Error::decode("yaml", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order() {
        let body = b"z: 1\na: [1.5, ~, text]\n'@': Normal\n";
        let value = YamlCodec.load(&mut &body[..], &CodecOptions::new()).unwrap();

        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "@"]);
        assert_eq!(value.get("a").unwrap().as_array().unwrap()[1], Value::Null);

        let mut out = Vec::new();
        YamlCodec.dump(&value, &mut out, &CodecOptions::new()).unwrap();
        assert_eq!(YamlCodec.load(&mut &out[..], &CodecOptions::new()).unwrap(), value);
    }
}
