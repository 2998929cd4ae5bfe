//! Value-domain descriptors.
//!
//! A [`Domain`] describes a value's shape, its default, its canonical text
//! encoding (see [`super::codec`]) and a conformance predicate. Collection
//! and record domains are composite and recurse.

use std::fmt;
use std::sync::Arc;

use super::value::AttrValue;

/// Closed, recursively composable value-domain descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// `t` / `f`.
    Boolean,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float, locale-independent text form.
    Double,
    /// Double-quoted string.
    String,
    /// Named enumeration with a fixed constant set.
    Enumeration(Arc<EnumDomain>),
    /// Ordered homogeneous collection.
    List(Arc<Domain>),
    /// Unordered homogeneous collection.
    Set(Arc<Domain>),
    /// Key/value pairs.
    Map(Arc<Domain>, Arc<Domain>),
    /// Named record with positional fields.
    Record(Arc<RecordDomain>),
}

/// Declaration of an enumeration domain.
#[derive(Debug, PartialEq)]
pub struct EnumDomain {
    /// Schema-unique domain name.
    pub name: String,
    /// Constant names in declaration order.
    pub constants: Vec<String>,
}

/// Declaration of a record domain.
#[derive(Debug, PartialEq)]
pub struct RecordDomain {
    /// Schema-unique domain name.
    pub name: String,
    /// Fields in declaration order; the text form is positional.
    pub fields: Vec<(String, Domain)>,
}

impl Domain {
    /// Default value assigned when an element is created without an
    /// explicit value. Primitive numeric and boolean domains follow the
    /// zero-value convention; everything else defaults to null.
    pub fn default_value(&self) -> AttrValue {
        match self {
            Domain::Boolean => AttrValue::Bool(false),
            Domain::Integer => AttrValue::Int(0),
            Domain::Long => AttrValue::Long(0),
            Domain::Double => AttrValue::Double(0.0),
            _ => AttrValue::Null,
        }
    }

    /// Returns true if `value`'s shape matches this domain.
    ///
    /// Null conforms to every domain. Collections are checked
    /// element-wise; records field-by-field, and a field-count mismatch
    /// (missing or extra fields) fails rather than being ignored.
    pub fn is_conformant(&self, value: &AttrValue) -> bool {
        if value.is_null() {
            return true;
        }
        match (self, value) {
            (Domain::Boolean, AttrValue::Bool(_)) => true,
            (Domain::Integer, AttrValue::Int(_)) => true,
            (Domain::Long, AttrValue::Long(_)) => true,
            (Domain::Double, AttrValue::Double(_)) => true,
            (Domain::String, AttrValue::Str(_)) => true,
            (Domain::Enumeration(decl), AttrValue::Enum(name)) => {
                decl.constants.iter().any(|c| c == name)
            }
            (Domain::List(elem), AttrValue::List(items))
            | (Domain::Set(elem), AttrValue::Set(items)) => {
                items.iter().all(|item| elem.is_conformant(item))
            }
            (Domain::Map(key, value_dom), AttrValue::Map(pairs)) => pairs
                .iter()
                .all(|(k, v)| key.is_conformant(k) && value_dom.is_conformant(v)),
            (Domain::Record(decl), AttrValue::Record(fields)) => {
                fields.len() == decl.fields.len()
                    && decl
                        .fields
                        .iter()
                        .zip(fields)
                        .all(|((_, dom), field)| dom.is_conformant(field))
            }
            _ => false,
        }
    }

    /// Serializes a conformant value into the canonical text form.
    pub fn serialize(&self, value: &AttrValue) -> crate::Result<String> {
        super::codec::serialize(self, value)
    }

    /// Parses the canonical text form into a value.
    pub fn parse(&self, text: &str) -> crate::Result<AttrValue> {
        super::codec::parse(self, text)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Boolean => write!(f, "Boolean"),
            Domain::Integer => write!(f, "Integer"),
            Domain::Long => write!(f, "Long"),
            Domain::Double => write!(f, "Double"),
            Domain::String => write!(f, "String"),
            Domain::Enumeration(decl) => write!(f, "{}", decl.name),
            Domain::List(elem) => write!(f, "List<{elem}>"),
            Domain::Set(elem) => write!(f, "Set<{elem}>"),
            Domain::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Domain::Record(decl) => write!(f, "{}", decl.name),
        }
    }
}
