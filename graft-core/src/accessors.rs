//! Support functions for generated accessor thunks.
//!
//! Not part of the public API; the derives reach these through
//! `graft::__private`.

use std::any::Any;

use crate::descriptor::Node;
use crate::error::BeansError;
use crate::scalar::Scalar;
use crate::value::{NodeValue, Value};

/// Recover the concrete node type behind an accessor thunk's `Any`.
pub fn downcast_ref<'a, T: 'static>(
    node: &'a dyn Any,
    expected: &'static str,
) -> Result<&'a T, BeansError> {
    node.downcast_ref::<T>().ok_or(BeansError::TypeMismatch {
        expected,
        actual: "a different node type",
    })
}

/// Mutable variant of [`downcast_ref`].
pub fn downcast_mut<'a, T: 'static>(
    node: &'a mut dyn Any,
    expected: &'static str,
) -> Result<&'a mut T, BeansError> {
    node.downcast_mut::<T>().ok_or(BeansError::TypeMismatch {
        expected,
        actual: "a different node type",
    })
}

/// Read an optional scalar field.
pub fn option_to_value<S: Scalar + Clone>(field: &Option<S>) -> Value {
    match field {
        Some(v) => v.clone().into_value(),
        None => Value::Null,
    }
}

/// Write an optional scalar field. `Null` clears it.
pub fn option_from_value<S: Scalar>(value: Value) -> Result<Option<S>, BeansError> {
    match value {
        Value::Null => Ok(None),
        other => Ok(Some(S::from_value(other)?)),
    }
}

/// Read a list-of-scalars field. Absent elements surface as `Null`.
pub fn scalar_list_to_value<S: Scalar + Clone>(field: &[Option<S>]) -> Value {
    Value::List(field.iter().map(option_to_value).collect())
}

/// Write a list-of-scalars field. `Null` clears it.
pub fn scalar_list_from_value<S: Scalar>(value: Value) -> Result<Vec<Option<S>>, BeansError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(elements) => elements.into_iter().map(option_from_value).collect(),
        Value::StrArray(values) => values
            .into_iter()
            .map(|v| option_from_value(Value::Str(v)))
            .collect(),
        other => Err(BeansError::from(crate::error::ConversionError::new(
            other.to_string(),
            "list",
        ))),
    }
}

/// Read an optional nested-node field.
pub fn node_to_value<N: Node + Clone>(field: &Option<N>) -> Value {
    match field {
        Some(node) => Value::Node(NodeValue::new(node.clone())),
        None => Value::Null,
    }
}

/// Write an optional nested-node field. `Null` clears it; a node of any
/// other type is rejected.
pub fn node_from_value<N: Node>(value: Value) -> Result<Option<N>, BeansError> {
    match value {
        Value::Null => Ok(None),
        Value::Node(node) => {
            let actual = node.descriptor().type_name();
            match node.downcast::<N>() {
                Some(concrete) => Ok(Some(concrete)),
                None => Err(BeansError::TypeMismatch {
                    expected: std::any::type_name::<N>(),
                    actual,
                }),
            }
        }
        other => Err(BeansError::TypeMismatch {
            expected: std::any::type_name::<N>(),
            actual: other.type_name(),
        }),
    }
}

/// Read a list-of-nodes field.
pub fn node_list_to_value<N: Node + Clone>(field: &[Option<N>]) -> Value {
    Value::List(field.iter().map(node_to_value).collect())
}

/// Write a list-of-nodes field. `Null` clears it.
pub fn node_list_from_value<N: Node>(value: Value) -> Result<Vec<Option<N>>, BeansError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(elements) => elements.into_iter().map(node_from_value).collect(),
        other => Err(BeansError::TypeMismatch {
            expected: "list",
            actual: other.type_name(),
        }),
    }
}
