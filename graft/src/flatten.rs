//! The graph flattener: a node graph becomes a map of dotted keys.
//!
//! Scalar and list properties are stored whole under their key; nested
//! nodes recurse with the key as prefix. Nothing is converted and nothing
//! is created; read failures raise.

use std::any::Any;
use std::collections::HashMap;

use graft_core::{BeansError, PropertyType, TypeDescriptor, Value};

use crate::options::CopyOptions;

pub(crate) fn flatten_into(
    node: &dyn Any,
    desc: &'static TypeDescriptor,
    prefix: &str,
    options: &CopyOptions,
    out: &mut HashMap<String, Value>,
) -> Result<(), BeansError> {
    for prop in desc.properties() {
        // filtered on the per-level name, not the full key
        if !options.is_target_property(prop.name()) {
            continue;
        }
        if !prop.is_readable() {
            continue;
        }
        let key = if prefix.is_empty() {
            prop.name().to_owned()
        } else {
            format!("{prefix}.{}", prop.name())
        };
        let value = prop.read(node)?;
        match prop.ty() {
            PropertyType::Scalar(_) | PropertyType::List(_) => {
                out.insert(key, value);
            }
            PropertyType::Node(nt) => match value {
                Value::Null => {
                    out.insert(key, Value::Null);
                }
                Value::Node(child) => {
                    flatten_into(
                        child.as_node().as_any(),
                        nt.descriptor(),
                        &key,
                        &options.for_nested_node(),
                        out,
                    )?;
                }
                other => {
                    out.insert(key, other);
                }
            },
        }
    }
    Ok(())
}
