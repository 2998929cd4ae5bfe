//! Runtime attribute values.

use std::fmt;

/// Owned attribute value stored by the generic attribute store.
///
/// The variants mirror the closed set of [`super::Domain`] descriptors.
/// `Null` is a member of every domain.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// The null value, valid for every domain.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit floating point number.
    Double(f64),
    /// Owned string.
    Str(String),
    /// Enumeration constant, stored by name.
    Enum(String),
    /// Ordered collection of element values.
    List(Vec<AttrValue>),
    /// Unordered collection of element values (stored in insertion order).
    Set(Vec<AttrValue>),
    /// Key/value pairs (stored in insertion order).
    Map(Vec<(AttrValue, AttrValue)>),
    /// Record fields, positional in declaration order.
    Record(Vec<AttrValue>),
}

impl AttrValue {
    /// Returns true for [`AttrValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Long(v) => write!(f, "{v}"),
            AttrValue::Double(v) => write!(f, "{v}"),
            AttrValue::Str(v) => write!(f, "{v:?}"),
            AttrValue::Enum(v) => write!(f, "{v}"),
            AttrValue::List(items) => {
                write!(f, "list(len={})", items.len())
            }
            AttrValue::Set(items) => write!(f, "set(len={})", items.len()),
            AttrValue::Map(pairs) => write!(f, "map(len={})", pairs.len()),
            AttrValue::Record(fields) => write!(f, "record(len={})", fields.len()),
        }
    }
}
