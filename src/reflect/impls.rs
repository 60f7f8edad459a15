use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

use indexmap::{IndexMap, IndexSet};

use super::{Reflect, Reflected};
use crate::value::Value;

macro_rules! impl_reflect_scalar {
    ($($ty:ty => |$v:ident| $shape:expr;)*) => {
        $(
            impl Reflect for $ty {
                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn reflect(&self) -> Reflected<'_> {
                    let $v = self;
                    $shape
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn into_any(self: Box<Self>) -> Box<dyn Any> {
                    self
                }
            }
        )*
    };
}

impl_reflect_scalar! {
    () => |_v| Reflected::Null;
    bool => |v| Reflected::Bool(*v);
    i8 => |v| Reflected::Int(i64::from(*v));
    i16 => |v| Reflected::Int(i64::from(*v));
    i32 => |v| Reflected::Int(i64::from(*v));
    i64 => |v| Reflected::Int(*v);
    isize => |v| Reflected::Int(*v as i64);
    u8 => |v| Reflected::Int(i64::from(*v));
    u16 => |v| Reflected::Int(i64::from(*v));
    u32 => |v| Reflected::Int(i64::from(*v));
    u64 => |v| Reflected::UInt(*v);
    usize => |v| Reflected::UInt(*v as u64);
    f32 => |v| Reflected::Float(f64::from(*v));
    f64 => |v| Reflected::Float(*v);
    String => |v| Reflected::Str(v);
    &'static str => |v| Reflected::Str(v);
}

// Containers report their std name; only objects ever have their name checked or embedded.
macro_rules! impl_reflect_container {
    ($name:expr) => {
        fn type_name(&self) -> &'static str {
            $name
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

impl Reflect for Box<dyn Reflect> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn reflect(&self) -> Reflected<'_> {
        (**self).reflect()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        (*self).into_any()
    }
}

impl Default for Box<dyn Reflect> {
    fn default() -> Self {
        Box::new(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn reflect(&self) -> Reflected<'_> {
        (**self).reflect()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        let inner: Box<T> = *self;
        inner
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_name(&self) -> &'static str {
        match *self {
            Some(ref v) => v.type_name(),
            None => "Option",
        }
    }

    fn reflect(&self) -> Reflected<'_> {
        match *self {
            Some(ref v) => v.reflect(),
            None => Reflected::Null,
        }
    }

    fn as_any(&self) -> &dyn Any {
        match *self {
            Some(ref v) => v.as_any(),
            None => self,
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        match *self {
            Some(v) => Box::new(v).into_any(),
            None => Box::new(None::<T>),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    impl_reflect_container!("Vec");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    impl_reflect_container!("VecDeque");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    impl_reflect_container!("BTreeSet");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect, S: 'static> Reflect for IndexSet<T, S> {
    impl_reflect_container!("IndexSet");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

// Hash sets are emitted in sorted order so that output does not depend on the hasher.
impl<T: Reflect + Ord, S: BuildHasher + 'static> Reflect for HashSet<T, S> {
    impl_reflect_container!("HashSet");

    fn reflect(&self) -> Reflected<'_> {
        let mut items: Vec<&T> = self.iter().collect();
        items.sort();
        Reflected::Seq(items.into_iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for BTreeMap<String, T> {
    impl_reflect_container!("BTreeMap");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Map(self.iter().map(|(k, v)| (k.as_str(), v as &dyn Reflect)).collect())
    }
}

impl<T: Reflect, S: 'static> Reflect for IndexMap<String, T, S> {
    impl_reflect_container!("IndexMap");

    fn reflect(&self) -> Reflected<'_> {
        Reflected::Map(self.iter().map(|(k, v)| (k.as_str(), v as &dyn Reflect)).collect())
    }
}

// Hash maps are emitted in key order so that output does not depend on the hasher.
impl<T: Reflect, S: BuildHasher + 'static> Reflect for HashMap<String, T, S> {
    impl_reflect_container!("HashMap");

    fn reflect(&self) -> Reflected<'_> {
        let mut entries: Vec<(&str, &dyn Reflect)> =
            self.iter().map(|(k, v)| (k.as_str(), v as &dyn Reflect)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Reflected::Map(entries)
    }
}

impl Reflect for Value {
    impl_reflect_container!("Value");

    fn reflect(&self) -> Reflected<'_> {
        match *self {
            Value::Null => Reflected::Null,
            Value::Bool(b) => Reflected::Bool(b),
            Value::Int(n) => Reflected::Int(n),
            Value::Float(f) => Reflected::Float(f),
            Value::String(ref s) => Reflected::Str(s),
            Value::Array(ref v) => Reflected::Seq(v.iter().map(|v| v as &dyn Reflect).collect()),
            Value::Object(ref m) => {
                Reflected::Map(m.iter().map(|(k, v)| (k.as_str(), v as &dyn Reflect)).collect())
            }
        }
    }
}
