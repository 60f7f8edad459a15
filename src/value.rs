//! The mapping form: the ordered value tree every codec reads and writes.

use std::convert::TryFrom;
use std::fmt;

use indexmap::IndexMap;
use serde::{
    ser::{Serialize, Serializer, SerializeSeq, SerializeMap},
    de::{Deserialize, Deserializer, Visitor, SeqAccess, MapAccess, Error},
};

// The maximum capacity of entries to preallocate for arrays and objects. Even if malicious input
// claims to contain a much larger collection, only this much memory will be blindly allocated.
static MAX_ALLOC: usize = 2048;

/// An order-preserving map from field names to values.
pub type Map = IndexMap<String, Value>;

/// A node of the mapping form, analogous to
/// [serde_json::Value](https://docs.serde.rs/serde_json/value/enum.Value.html), except that
/// objects always preserve the order in which their entries were inserted.
///
/// Converting an object graph yields a `Value`, and every codec encodes and decodes exactly this
/// shape.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double precision float.
    Float(f64),
    /// A utf8 string.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An order-preserving mapping of names to values.
    Object(Map),
}

impl Value {
    /// A short name for the kind of this value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns `true` if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        match *self {
            Value::Null => true,
            _ => false,
        }
    }

    /// Borrows the entries if this is an object.
    pub fn as_object(&self) -> Option<&Map> {
        match *self {
            Value::Object(ref m) => Some(m),
            _ => None,
        }
    }

    /// Borrows the elements if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match *self {
            Value::Array(ref v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the content if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// Looks up an entry by name if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Object(m)
    }
}

impl Serialize for Value {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        match *self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(b),
            Value::Int(n) => serializer.serialize_i64(n),
            Value::Float(f) => serializer.serialize_f64(f),
            Value::String(ref s) => serializer.serialize_str(s),
            Value::Array(ref v) => {
                let mut s = serializer.serialize_seq(Some(v.len()))?;
                for inner in v {
                    s.serialize_element(inner)?;
                }
                s.end()
            }
            Value::Object(ref m) => {
                let mut s = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m {
                    s.serialize_entry(key, value)?;
                }
                s.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
        where D: Deserializer<'de>
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any value of the mapping form")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Err(E::custom("integer out of range")),
        }
    }

    fn visit_i128<E: Error>(self, v: i128) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Err(E::custom("integer out of range")),
        }
    }

    fn visit_u128<E: Error>(self, v: u128) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Err(E::custom("integer out of range")),
        }
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        self.visit_string(v.to_string())
    }

    fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where A: SeqAccess<'de>
    {
        // use the size hint, but put a maximum to the allocation because we can't trust the input
        let mut v = Vec::with_capacity(std::cmp::min(seq.size_hint().unwrap_or(0), MAX_ALLOC));

        while let Some(inner) = seq.next_element()? {
            v.push(inner);
        }

        Ok(Value::Array(v))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where A: MapAccess<'de>
    {
        // use the size hint, but put a maximum to the allocation because we can't trust the input
        let mut m = Map::with_capacity(std::cmp::min(map.size_hint().unwrap_or(0), MAX_ALLOC));

        while let Some((key, val)) = map.next_entry::<String, Value>()? {
            if m.contains_key(&key) {
                return Err(A::Error::custom(format_args!("map had duplicate key `{}`", key)));
            }
            m.insert(key, val);
        }

        Ok(Value::Object(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keeps_insertion_order() {
        let mut m = Map::new();
        m.insert("z".to_string(), Value::Int(1));
        m.insert("a".to_string(), Value::Int(2));
        m.insert("m".to_string(), Value::Null);

        let keys: Vec<&str> = m.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn decoding_keeps_document_order() {
        let v: Value = serde_json::from_str(r#"{"b": 1, "a": [true, null], "c": 1.5}"#).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(v.get("a"), Some(&Value::Array(vec![Value::Bool(true), Value::Null])));
        assert_eq!(v.get("c"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn decodes_strings() {
        let v: Value = serde_json::from_str(r#"["plain", "esc\u00e9aped"]"#).unwrap();
        assert_eq!(v, Value::Array(vec![Value::from("plain"), Value::from("escéaped")]));

        let owned: Value = serde_json::from_reader(&br#""read""#[..]).unwrap();
        assert_eq!(owned.as_str(), Some("read"));
    }

    #[test]
    fn rejects_duplicate_keys() {
        assert!(serde_json::from_str::<Value>(r#"{"a": 1, "a": 2}"#).is_err());
    }

    #[test]
    fn rejects_unrepresentable_integers() {
        assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
        assert_eq!(serde_json::from_str::<Value>("-3").unwrap(), Value::Int(-3));
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from("x").kind(), "string");
        assert_eq!(Value::Object(Map::new()).kind(), "object");
        assert!(Value::default().is_null());
    }
}
