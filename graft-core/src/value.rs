//! The dynamic value model.
//!
//! [`Value`] is the interchange representation that flattened maps, converters
//! and generated accessors all speak. It covers the scalar types the engine
//! understands, plus two structural cases: ordered lists and typed nodes.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::descriptor::{Node, TypeDescriptor};

/// A dynamically-typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent / null.
    Null,
    /// Boolean.
    Bool(bool),
    /// 16-bit integer.
    I16(i16),
    /// 32-bit integer.
    I32(i32),
    /// 64-bit integer.
    I64(i64),
    /// Arbitrary-precision decimal.
    Decimal(Decimal),
    /// String.
    Str(String),
    /// Multi-valued string, as submitted by form fields.
    StrArray(Vec<String>),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day.
    DateTime(NaiveDateTime),
    /// Ordered, index-addressable collection. Absent elements are `Null`.
    List(Vec<Value>),
    /// A typed nested node instance.
    Node(NodeValue),
}

impl Value {
    /// Wrap a typed node.
    pub fn node<N: Node>(node: N) -> Value {
        Value::Node(NodeValue::new(node))
    }

    /// Is this `Null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short name for the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::StrArray(_) => "string array",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "date-time",
            Value::List(_) => "list",
            Value::Node(node) => node.descriptor().type_name(),
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way conversion errors quote it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::StrArray(values) => write!(f, "[{}]", values.join(", ")),
            Value::Bytes(bytes) => write!(f, "{} bytes", bytes.len()),
            Value::Date(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Value::Node(node) => f.write_str(node.descriptor().type_name()),
        }
    }
}

/// An owned, type-erased node instance carried inside a [`Value`].
pub struct NodeValue(Box<dyn Node>);

impl NodeValue {
    /// Wrap a concrete node.
    pub fn new<N: Node>(node: N) -> Self {
        NodeValue(Box::new(node))
    }

    /// Wrap an already-boxed node.
    pub fn from_boxed(node: Box<dyn Node>) -> Self {
        NodeValue(node)
    }

    /// The descriptor of the wrapped node's type.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.0.descriptor()
    }

    /// Borrow the wrapped node.
    pub fn as_node(&self) -> &dyn Node {
        self.0.as_ref()
    }

    /// Borrow the wrapped node mutably.
    pub fn as_node_mut(&mut self) -> &mut dyn Node {
        self.0.as_mut()
    }

    /// Borrow the wrapped node as a concrete type.
    pub fn downcast_ref<N: Node>(&self) -> Option<&N> {
        self.0.as_any().downcast_ref::<N>()
    }

    /// Take the wrapped node as a concrete type. `None` if the types
    /// do not match.
    pub fn downcast<N: Node>(self) -> Option<N> {
        self.0.into_any().downcast::<N>().ok().map(|boxed| *boxed)
    }

    /// Unwrap into the boxed node.
    pub fn into_boxed(self) -> Box<dyn Node> {
        self.0
    }
}

impl Clone for NodeValue {
    fn clone(&self) -> Self {
        NodeValue(self.0.clone_node())
    }
}

impl fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Node identity is not observable through the erased box, so two node
/// values never compare equal. Compare downcast nodes instead.
impl PartialEq for NodeValue {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_scalars_plainly() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::I32(42).to_string(), "42");
        assert_eq!(Value::Str("abc".into()).to_string(), "abc");
        assert_eq!(
            Value::StrArray(vec!["a".into(), "b".into()]).to_string(),
            "[a, b]"
        );
        assert_eq!(
            Value::List(vec![Value::I32(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }

    #[test]
    fn null_check() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
    }
}
