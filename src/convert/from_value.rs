use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::convert::TryFrom;
use std::hash::{BuildHasher, Hash};

use indexmap::{IndexMap, IndexSet};

use super::Converter;
use crate::error::{Error, Result};
use crate::reflect::Reflect;
use crate::registry::FieldType;
use crate::value::Value;

/// A type that can be rebuilt from the mapping form.
///
/// Implemented for scalars, std and `indexmap` containers, [`Value`] and `Box<dyn Reflect>`.
/// Structs get an implementation from [`serdeable!`](crate::serdeable) that goes through the
/// registry.
pub trait FromValue: Sized {
    /// Rebuilds a value, resolving nested objects through `cx`.
    fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self>;

    /// The declared type recorded in the descriptor of any field of this type.
    fn field_type() -> FieldType;
}

fn mismatch<T: FromValue>(found: &Value) -> Error {
    Error::invalid_value(T::field_type(), found)
}

impl FromValue for () {
    fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Null
    }
}

impl FromValue for bool {
    fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Bool
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| Error::InvalidValue {
                            expected: stringify!($ty).to_string(),
                            found: n.to_string(),
                        }),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn field_type() -> FieldType {
                    FieldType::Int
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Integers are accepted where floats are declared, since several codecs write `1.0` as `1`.
impl FromValue for f64 {
    fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(n) => Ok(n as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Float
    }
}

impl FromValue for f32 {
    fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
        f64::from_value(value, cx).map(|f| f as f32)
    }

    fn field_type() -> FieldType {
        FieldType::Float
    }
}

impl FromValue for String {
    fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn field_type() -> FieldType {
        FieldType::String
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _cx: &Converter<'_>) -> Result<Self> {
        Ok(value)
    }

    fn field_type() -> FieldType {
        FieldType::Any
    }
}

impl FromValue for Box<dyn Reflect> {
    fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
        cx.from_mapping(value, None)
    }

    fn field_type() -> FieldType {
        FieldType::Any
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
        T::from_value(value, cx).map(Box::new)
    }

    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, cx).map(Some),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Optional(Box::new(T::field_type()))
    }
}

macro_rules! impl_from_value_seq {
    ($($ty:ident<T $(: $bound:ident $(+ $more:ident)*)? $(, $s:ident)?>),*) => {
        $(
            impl<T: FromValue $(+ $bound $(+ $more)*)? $(, $s: BuildHasher + Default)?> FromValue
                for $ty<T $(, $s)?>
            {
                fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
                    match value {
                        Value::Array(items) => items
                            .into_iter()
                            .map(|item| T::from_value(item, cx))
                            .collect(),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn field_type() -> FieldType {
                    FieldType::Seq(Box::new(T::field_type()))
                }
            }
        )*
    };
}

impl_from_value_seq! {
    Vec<T>,
    VecDeque<T>,
    BTreeSet<T: Ord>,
    HashSet<T: Eq + Hash, S>,
    IndexSet<T: Eq + Hash, S>
}

macro_rules! impl_from_value_map {
    ($($ty:ident $(<$s:ident>)?),*) => {
        $(
            impl<T: FromValue $(, $s: BuildHasher + Default)?> FromValue for $ty<String, T $(, $s)?> {
                fn from_value(value: Value, cx: &Converter<'_>) -> Result<Self> {
                    match value {
                        Value::Object(entries) => entries
                            .into_iter()
                            .map(|(key, item)| T::from_value(item, cx).map(|v| (key, v)))
                            .collect(),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn field_type() -> FieldType {
                    FieldType::Map(Box::new(T::field_type()))
                }
            }
        )*
    };
}

impl_from_value_map!(BTreeMap, HashMap<S>, IndexMap<S>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConvertOptions;
    use crate::registry::TypeRegistry;
    use crate::value::Map;

    fn with_cx<R>(f: impl FnOnce(&Converter<'_>) -> R) -> R {
        let registry = TypeRegistry::new();
        f(&Converter::new(&registry, ConvertOptions::default()))
    }

    #[test]
    fn integers_are_range_checked() {
        with_cx(|cx| {
            assert_eq!(u8::from_value(Value::Int(255), cx).unwrap(), 255);
            assert!(u8::from_value(Value::Int(256), cx).is_err());
            assert!(u64::from_value(Value::Int(-1), cx).is_err());
            assert_eq!(i32::from_value(Value::Int(-7), cx).unwrap(), -7);
        });
    }

    #[test]
    fn floats_accept_integers() {
        with_cx(|cx| {
            assert_eq!(f64::from_value(Value::Int(2), cx).unwrap(), 2.0);
            assert_eq!(f32::from_value(Value::Float(0.5), cx).unwrap(), 0.5);
            assert!(f64::from_value(Value::from("1.0"), cx).is_err());
        });
    }

    #[test]
    fn options_map_null() {
        with_cx(|cx| {
            assert_eq!(Option::<String>::from_value(Value::Null, cx).unwrap(), None);
            assert_eq!(Option::<String>::from_value(Value::from("x"), cx).unwrap(),
                       Some("x".to_string()));
        });
    }

    #[test]
    fn containers() {
        with_cx(|cx| {
            let array = Value::Array(vec![Value::Int(2), Value::Int(1), Value::Int(2)]);
            assert_eq!(Vec::<i64>::from_value(array.clone(), cx).unwrap(), vec![2, 1, 2]);
            assert_eq!(BTreeSet::<i64>::from_value(array.clone(), cx).unwrap().len(), 2);
            let set: IndexSet<i64> = FromValue::from_value(array, cx).unwrap();
            assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![2, 1]);

            let mut m = Map::new();
            m.insert("b".to_string(), Value::Bool(true));
            m.insert("a".to_string(), Value::Bool(false));
            let map: IndexMap<String, bool> = FromValue::from_value(Value::Object(m), cx).unwrap();
            assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        });
    }

    #[test]
    fn mismatches_name_the_declared_type() {
        with_cx(|cx| {
            let err = Vec::<Option<i64>>::from_value(Value::Bool(true), cx).unwrap_err();
            assert_eq!(err.to_string(), "expected sequence of optional integer, found bool");

            let err = HashMap::<String, String>::from_value(Value::Null, cx).unwrap_err();
            assert_eq!(err.to_string(), "expected map of string, found null");
        });
    }

    #[test]
    fn dynamic_scalars() {
        with_cx(|cx| {
            let v = <Box<dyn Reflect>>::from_value(Value::Float(1.5), cx).unwrap();
            assert_eq!(v.downcast_ref::<f64>(), Some(&1.5));
        });
    }
}
