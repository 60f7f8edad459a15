/// Declares a struct and implements everything it needs to be registered for conversion.
///
/// The struct is emitted as written. Its name becomes the registered type name, its fields in
/// declaration order become the descriptor. Every field type must implement
/// [`Reflect`](crate::Reflect), [`FromValue`](crate::FromValue) and `Default`; a field absent
/// from a mapping takes its default.
///
/// Declaring a type does not register it. Call [`register`](crate::register) or
/// [`TypeRegistry::register`](crate::TypeRegistry::register) with the desired capability.
///
/// ```
/// use autoserde::{serdeable, Capability, SerializeOptions};
///
/// serdeable! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Normal {
///         pub str_value: String,
///         pub int_value: i64,
///     }
/// }
///
/// autoserde::register::<Normal>(Capability::SERDE).unwrap();
///
/// let normal = Normal { str_value: "limo".to_string(), int_value: 10 };
/// let json = autoserde::to_string(&normal, &SerializeOptions::new().format("json")).unwrap();
/// assert_eq!(json, r#"{"str_value": "limo", "int_value": 10, "@": "Normal"}"#);
/// ```
#[macro_export]
macro_rules! serdeable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        $crate::impl_serdeable!($name { $($field: $fty),* });
    };
}

/// Implements the conversion traits for an existing struct with named fields.
///
/// This is the second half of [`serdeable!`], for structs declared elsewhere in the same crate.
/// The listed fields, in order, make up the descriptor.
#[macro_export]
macro_rules! impl_serdeable {
    ($name:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Reflect for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn reflect(&self) -> $crate::reflect::Reflected<'_> {
                $crate::reflect::Reflected::Object(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::Object for $name {
            #[allow(unused_variables)]
            fn field(&self, name: &str) -> ::std::option::Option<&dyn $crate::Reflect> {
                $(
                    if name == stringify!($field) {
                        return ::std::option::Option::Some(&self.$field);
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: $crate::Value, cx: &$crate::Converter<'_>) -> $crate::Result<Self> {
                cx.reconstruct(value)
            }

            fn field_type() -> $crate::FieldType {
                $crate::FieldType::Object(stringify!($name))
            }
        }

        impl $crate::Serdeable for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn fields() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::new(
                            stringify!($field),
                            <$fty as $crate::FromValue>::field_type(),
                        ),
                    )*
                ]
            }

            #[allow(unused_variables)]
            fn from_fields(fields: &mut $crate::FieldSource<'_>) -> $crate::Result<Self> {
                ::std::result::Result::Ok($name {
                    $(
                        $field: fields.take(stringify!($field))?,
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Capability, FieldType, Reflect, Serdeable, TypeRegistry};

    crate::serdeable! {
        /// Documented.
        #[derive(Debug, Default)]
        pub(crate) struct Attributed {
            /// Documented too.
            pub(crate) label: Option<String>,
            tags: Vec<String>,
        }
    }

    crate::serdeable! {
        #[derive(Debug, Default)]
        struct Empty {}
    }

    #[derive(Debug, Default)]
    struct Manual {
        x: i32,
        y: i32,
    }

    crate::impl_serdeable!(Manual { x: i32, y: i32 });

    #[test]
    fn descriptors_follow_the_declaration() {
        let descriptor = Attributed::descriptor();
        assert_eq!(descriptor.name(), "Attributed");
        assert_eq!(descriptor.fields()[0].ty, FieldType::Optional(Box::new(FieldType::String)));
        assert_eq!(descriptor.fields()[1].ty, FieldType::Seq(Box::new(FieldType::String)));
        assert!(Empty::descriptor().fields().is_empty());
    }

    #[test]
    fn fields_are_exposed_by_name() {
        use crate::Object;

        let manual = Manual { x: 3, y: 4 };
        assert_eq!(manual.type_name(), "Manual");
        assert_eq!(manual.field("y").and_then(|f| f.downcast_ref::<i32>()), Some(&4));
        assert!(manual.field("z").is_none());
    }

    #[test]
    fn declared_types_register() {
        let registry = TypeRegistry::new();
        registry.register::<Attributed>(Capability::SERDE).unwrap();
        registry.register::<Empty>(Capability::SERIALIZE).unwrap();
        registry.register::<Manual>(Capability::DESERIALIZE).unwrap();
        assert_eq!(registry.names(), vec!["Attributed", "Empty", "Manual"]);
    }
}
