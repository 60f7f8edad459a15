use std::fmt;
use std::ops::BitOr;

/// The declared type of a field.
///
/// Container types carry their declared element type, which is what the converter falls back on
/// when rebuilding elements that carry no type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Any value; objects must carry a type tag.
    Any,
    /// The unit type.
    Null,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// A float.
    Float,
    /// A string.
    String,
    /// A value that may be null.
    Optional(Box<FieldType>),
    /// A sequence or set of elements.
    Seq(Box<FieldType>),
    /// A string-keyed map.
    Map(Box<FieldType>),
    /// A registered object type, by name.
    Object(&'static str),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldType::Any => f.write_str("any"),
            FieldType::Null => f.write_str("null"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::String => f.write_str("string"),
            FieldType::Optional(ref inner) => write!(f, "optional {}", inner),
            FieldType::Seq(ref inner) => write!(f, "sequence of {}", inner),
            FieldType::Map(ref inner) => write!(f, "map of {}", inner),
            FieldType::Object(name) => f.write_str(name),
        }
    }
}

/// A declared field: its name and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The field name, which is also the key in the mapping form.
    pub name: &'static str,
    /// The declared type.
    pub ty: FieldType,
}

impl FieldDescriptor {
    /// Creates a new field descriptor.
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        FieldDescriptor { name, ty }
    }
}

/// The schema of a registered type: its name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Creates a new type descriptor.
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        TypeDescriptor { name, fields }
    }

    /// The type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Which conversions a registered type may take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capability {
    /// May be converted to the mapping form.
    pub to_mapping: bool,
    /// May be rebuilt from the mapping form.
    pub from_mapping: bool,
}

impl Capability {
    /// Neither direction.
    pub const NONE: Capability = Capability { to_mapping: false, from_mapping: false };
    /// Convertible to the mapping form only.
    pub const SERIALIZE: Capability = Capability { to_mapping: true, from_mapping: false };
    /// Convertible from the mapping form only.
    pub const DESERIALIZE: Capability = Capability { to_mapping: false, from_mapping: true };
    /// Both directions.
    pub const SERDE: Capability = Capability { to_mapping: true, from_mapping: true };

    /// Returns `true` if neither direction is enabled.
    pub fn is_none(self) -> bool {
        !self.to_mapping && !self.from_mapping
    }
}

impl BitOr for Capability {
    type Output = Capability;

    fn bitor(self, rhs: Capability) -> Capability {
        Capability {
            to_mapping: self.to_mapping || rhs.to_mapping,
            from_mapping: self.from_mapping || rhs.from_mapping,
        }
    }
}
