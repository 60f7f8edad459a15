use std::io;

use thiserror::Error;

use crate::codec::CodecOptions;
use crate::value::{Map, Value};

/// Everything that can go wrong during json serialization.
#[derive(Debug, Error)]
pub enum EncodeJsonError {
    /// An IO error occured on the underlying writer.
    ///
    /// When serializing directly into a `Vec<u8>` or `String`, this error never occurs.
    #[error("i/o error")]
    Io(#[from] io::Error),
    /// Tried to serialize an infinity or NaN without allowing it.
    #[error("non-finite float {0} is not valid json")]
    NonFiniteFloat(f64),
}

/// A structure for serializing the mapping form into the json encoding.
///
/// Compact output separates items with `", "` and keys from values with `": "`. With an
/// indentation width, every item goes on its own line instead.
pub struct JsonSerializer<W> {
    writer: W,
    indent: Option<usize>,
    allow_nan: bool,
    depth: usize,
}

impl<W> JsonSerializer<W>
    where W: io::Write
{
    /// Creates a new serializer producing compact output.
    #[inline]
    pub fn new(writer: W) -> Self {
        JsonSerializer { writer, indent: None, allow_nan: false, depth: 0 }
    }

    /// Creates a new serializer configured by the given codec options.
    pub fn with_options(writer: W, options: &CodecOptions) -> Self {
        JsonSerializer {
            writer,
            indent: options.indent,
            allow_nan: options.allow_nan,
            depth: 0,
        }
    }

    /// Unwrap the `Writer` from the `Serializer`.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes a single value.
    pub fn serialize(&mut self, value: &Value) -> Result<(), EncodeJsonError> {
        match *value {
            Value::Null => self.writer.write_all(b"null")?,
            Value::Bool(true) => self.writer.write_all(b"true")?,
            Value::Bool(false) => self.writer.write_all(b"false")?,
            Value::Int(n) => write!(self.writer, "{}", n)?,
            Value::Float(f) => self.serialize_f64(f)?,
            Value::String(ref s) => self.serialize_str(s)?,
            Value::Array(ref v) => self.serialize_array(v)?,
            Value::Object(ref m) => self.serialize_object(m)?,
        }
        Ok(())
    }

    // Finite floats always carry a fraction or an exponent, so they read back as floats.
    fn serialize_f64(&mut self, v: f64) -> Result<(), EncodeJsonError> {
        if v.is_finite() {
            let mut buffer = ryu::Buffer::new();
            self.writer.write_all(buffer.format_finite(v).as_bytes())?;
            return Ok(());
        }

        if !self.allow_nan {
            return Err(EncodeJsonError::NonFiniteFloat(v));
        }

        let s: &[u8] = if v.is_nan() {
            b"NaN"
        } else if v.is_sign_positive() {
            b"Infinity"
        } else {
            b"-Infinity"
        };
        self.writer.write_all(s)?;
        Ok(())
    }

    fn serialize_str(&mut self, v: &str) -> Result<(), io::Error> {
        self.writer.write_all(b"\"")?;

        let bytes = v.as_bytes();
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let escape: &[u8] = match byte {
                0x08 => br"\b",
                0x09 => br"\t",
                0x0A => br"\n",
                0x0C => br"\f",
                0x0D => br"\r",
                0x22 => b"\\\"",
                0x5C => br"\\",
                0x00..=0x1F => b"",
                _ => continue,
            };

            self.writer.write_all(&bytes[start..i])?;
            if escape.is_empty() {
                write!(self.writer, "\\u{:04x}", byte)?;
            } else {
                self.writer.write_all(escape)?;
            }
            start = i + 1;
        }
        self.writer.write_all(&bytes[start..])?;

        self.writer.write_all(b"\"")
    }

    fn serialize_array(&mut self, v: &[Value]) -> Result<(), EncodeJsonError> {
        self.writer.write_all(b"[")?;
        self.depth += 1;

        for (i, inner) in v.iter().enumerate() {
            self.write_separator(i == 0)?;
            self.serialize(inner)?;
        }

        self.depth -= 1;
        self.write_close(v.is_empty())?;
        self.writer.write_all(b"]")?;
        Ok(())
    }

    fn serialize_object(&mut self, m: &Map) -> Result<(), EncodeJsonError> {
        self.writer.write_all(b"{")?;
        self.depth += 1;

        for (i, (key, inner)) in m.iter().enumerate() {
            self.write_separator(i == 0)?;
            self.serialize_str(key)?;
            self.writer.write_all(b": ")?;
            self.serialize(inner)?;
        }

        self.depth -= 1;
        self.write_close(m.is_empty())?;
        self.writer.write_all(b"}")?;
        Ok(())
    }

    // Writes what goes in front of an item of a collection.
    fn write_separator(&mut self, first: bool) -> Result<(), io::Error> {
        match self.indent {
            None if first => Ok(()),
            None => self.writer.write_all(b", "),
            Some(_) => {
                if !first {
                    self.writer.write_all(b",")?;
                }
                self.writer.write_all(b"\n")?;
                self.write_indent()
            }
        }
    }

    // Writes what goes in front of the closing bracket of a collection.
    fn write_close(&mut self, empty: bool) -> Result<(), io::Error> {
        if self.indent.is_some() && !empty {
            self.writer.write_all(b"\n")?;
            self.write_indent()?;
        }
        Ok(())
    }

    // Writes the correct number of spaces as indentation.
    fn write_indent(&mut self) -> Result<(), io::Error> {
        let width = self.indent.unwrap_or(0) * self.depth;
        for _ in 0..width {
            self.writer.write_all(b" ")?;
        }
        Ok(())
    }
}

/// Serialize the given value as JSON into the IO stream.
pub fn to_writer<W>(writer: W, value: &Value, options: &CodecOptions) -> Result<(), EncodeJsonError>
    where W: io::Write
{
    let mut ser = JsonSerializer::with_options(writer, options);
    ser.serialize(value)
}

/// Serialize the given value as a JSON byte vector.
pub fn to_vec(value: &Value, options: &CodecOptions) -> Result<Vec<u8>, EncodeJsonError> {
    let mut writer = Vec::with_capacity(128);
    to_writer(&mut writer, value, options)?;
    Ok(writer)
}

/// Serialize the given value as a String of JSON.
pub fn to_string(value: &Value, options: &CodecOptions) -> Result<String, EncodeJsonError> {
    let vec = to_vec(value, options)?;
    let string = unsafe {
        // We do not emit invalid UTF-8.
        String::from_utf8_unchecked(vec)
    };
    Ok(string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal() -> Value {
        let mut m = Map::new();
        m.insert("str_value".to_string(), Value::from("limo"));
        m.insert("int_value".to_string(), Value::Int(10));
        m.insert("@".to_string(), Value::from("Normal"));
        Value::Object(m)
    }

    fn nested() -> Value {
        let mut m = Map::new();
        m.insert("a".to_string(), normal());
        m.insert("list".to_string(), Value::Array(vec![Value::Float(1.0), Value::Null]));
        m.insert("empty".to_string(), Value::Array(vec![]));
        Value::Object(m)
    }

    #[test]
    fn compact_layout() {
        assert_eq!(to_string(&normal(), &CodecOptions::new()).unwrap(),
                   r#"{"str_value": "limo", "int_value": 10, "@": "Normal"}"#);
        assert_eq!(to_string(&nested(), &CodecOptions::new()).unwrap(),
                   concat!(r#"{"a": {"str_value": "limo", "int_value": 10, "@": "Normal"}, "#,
                           r#""list": [1.0, null], "empty": []}"#));
    }

    #[test]
    fn indented_layout() {
        let expected = r#"{
  "a": {
    "str_value": "limo",
    "int_value": 10,
    "@": "Normal"
  },
  "list": [
    1.0,
    null
  ],
  "empty": []
}"#;
        assert_eq!(to_string(&nested(), &CodecOptions::new().indent(2)).unwrap(), expected);
    }

    #[test]
    fn escapes() {
        let s = Value::from("a\"b\\c\nd\u{1}é");
        assert_eq!(to_string(&s, &CodecOptions::new()).unwrap(), r#""a\"b\\c\nd\u0001é""#);
    }

    #[test]
    fn floats() {
        let opts = CodecOptions::new();
        assert_eq!(to_string(&Value::Float(0.1), &opts).unwrap(), "0.1");
        assert_eq!(to_string(&Value::Float(-0.0), &opts).unwrap(), "-0.0");
        assert_eq!(to_string(&Value::Float(1e300), &opts).unwrap(), "1e300");

        match to_vec(&Value::Float(std::f64::NAN), &opts) {
            Err(EncodeJsonError::NonFiniteFloat(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        let opts = opts.allow_nan(true);
        assert_eq!(to_string(&Value::Float(std::f64::NAN), &opts).unwrap(), "NaN");
        assert_eq!(to_string(&Value::Float(std::f64::NEG_INFINITY), &opts).unwrap(), "-Infinity");
    }
}
