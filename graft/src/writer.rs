//! The graph writer: applies one path-addressed assignment to a node graph,
//! creating intermediate structure and growing lists as needed.

use std::any::Any;
use std::collections::HashMap;

use graft_core::{
    BeansError, ConverterRegistry, ElementType, NodeValue, Property, PropertyType, ScalarType,
    TypeDescriptor, Value,
};

use crate::builder;
use crate::diag::CopyDiagnostics;
use crate::options::CopyOptions;
use crate::path::{PropertyPath, Segment};

/// The pieces of mapper state the internal recursion threads around.
pub(crate) struct Engine<'a> {
    pub registry: &'a ConverterRegistry,
    pub diagnostics: &'a dyn CopyDiagnostics,
}

/// The entries of `map` one level below `prefix`, with the prefix stripped.
pub(crate) fn reduced_map(map: &HashMap<String, Value>, prefix: &str) -> HashMap<String, Value> {
    let dotted = format!("{prefix}.");
    map.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&dotted)
                .map(|rest| (rest.to_owned(), value.clone()))
        })
        .collect()
}

/// Convert a value for assignment to the property `name` of declared type
/// `ty`. Converter precedence: by-name option, then by-type option, then
/// the registry.
pub(crate) fn convert_leaf(
    engine: &Engine<'_>,
    options: &CopyOptions,
    name: &str,
    ty: PropertyType,
    value: Value,
) -> Result<Value, BeansError> {
    match ty {
        PropertyType::Scalar(target) => convert_scalar(engine, options, name, target, value),
        PropertyType::List(ElementType::Scalar(element)) => {
            Ok(engine.registry.convert_list(element, &value)?)
        }
        PropertyType::List(ElementType::Node(_)) => match value {
            Value::Null | Value::List(_) => Ok(value),
            other => Err(BeansError::TypeMismatch {
                expected: "list",
                actual: other.type_name(),
            }),
        },
        PropertyType::Node(nt) => match value {
            Value::Null | Value::Node(_) => Ok(value),
            other => Err(BeansError::TypeMismatch {
                expected: nt.type_name(),
                actual: other.type_name(),
            }),
        },
    }
}

fn convert_scalar(
    engine: &Engine<'_>,
    options: &CopyOptions,
    name: &str,
    target: ScalarType,
    value: Value,
) -> Result<Value, BeansError> {
    if options.has_named_converter(name, target) {
        options.convert_by_name(name, target, &value)
    } else if options.has_typed_converter(target) {
        options.convert_by_type(target, &value)
    } else {
        Ok(engine.registry.convert(target, &value)?)
    }
}

/// Apply one assignment. `map` is the flattened source the assignment came
/// from; nested record segments build themselves from its reduced view.
pub(crate) fn set_path(
    engine: &Engine<'_>,
    node: &mut dyn Any,
    desc: &'static TypeDescriptor,
    path: &PropertyPath,
    value: Value,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<(), BeansError> {
    let seg = path.root();
    let prop = desc.property(seg.name())?;
    if let Some(index) = seg.index() {
        set_list_element(engine, node, prop, seg, index, path, value, map, options)
    } else if path.is_nested() {
        set_nested(engine, node, prop, seg, path, value, map, options)
    } else {
        let converted = convert_leaf(engine, options, seg.name(), prop.ty(), value)?;
        prop.write(node, converted)
    }
}

fn set_nested(
    engine: &Engine<'_>,
    node: &mut dyn Any,
    prop: &Property,
    seg: &Segment,
    path: &PropertyPath,
    value: Value,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<(), BeansError> {
    let PropertyType::Node(nt) = prop.ty() else {
        return Err(BeansError::StructureMismatch {
            property: seg.name().to_owned(),
            detail: "cannot descend into a non-node property".to_owned(),
        });
    };
    let child_desc = nt.descriptor();
    let reduced = reduced_map(map, seg.name());
    let child_options = options.reduce(seg.name());
    if child_desc.is_record() {
        // an already-present record is left alone
        if !prop.read(node)?.is_null() {
            return Ok(());
        }
        let record = builder::record_from_map(engine, child_desc, &reduced, &child_options)?;
        prop.write(node, Value::Node(NodeValue::from_boxed(record)))
    } else {
        let mut child = match prop.read(node)? {
            Value::Node(existing) => existing.into_boxed(),
            _ => child_desc.instantiate()?,
        };
        set_path(
            engine,
            child.as_any_mut(),
            child_desc,
            &path.rest(),
            value,
            &reduced,
            &child_options,
        )?;
        prop.write(node, Value::Node(NodeValue::from_boxed(child)))
    }
}

#[allow(clippy::too_many_arguments)]
fn set_list_element(
    engine: &Engine<'_>,
    node: &mut dyn Any,
    prop: &Property,
    seg: &Segment,
    index: usize,
    path: &PropertyPath,
    value: Value,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<(), BeansError> {
    let PropertyType::List(element) = prop.ty() else {
        return Err(BeansError::StructureMismatch {
            property: seg.name().to_owned(),
            detail: "index applied to a non-list property".to_owned(),
        });
    };
    let mut elements = match prop.read(node)? {
        Value::List(elements) => elements,
        Value::Null => Vec::new(),
        other => {
            return Err(BeansError::TypeMismatch {
                expected: "list",
                actual: other.type_name(),
            });
        }
    };
    // grow to cover the index, existing elements untouched
    if elements.len() <= index {
        elements.resize(index + 1, Value::Null);
    }

    if path.is_leaf() {
        let converted = match element {
            ElementType::Scalar(target) => {
                convert_scalar(engine, options, seg.name(), target, value)?
            }
            ElementType::Node(nt) => match value {
                Value::Null | Value::Node(_) => value,
                other => {
                    return Err(BeansError::TypeMismatch {
                        expected: nt.type_name(),
                        actual: other.type_name(),
                    });
                }
            },
        };
        elements[index] = converted;
    } else {
        let ElementType::Node(nt) = element else {
            return Err(BeansError::StructureMismatch {
                property: seg.raw(),
                detail: "cannot descend into a scalar list element".to_owned(),
            });
        };
        let element_desc = nt.descriptor();
        let raw = seg.raw();
        let reduced = reduced_map(map, &raw);
        let element_options = options.reduce(&raw);
        if element_desc.is_record() {
            if elements[index].is_null() {
                let record =
                    builder::record_from_map(engine, element_desc, &reduced, &element_options)?;
                elements[index] = Value::Node(NodeValue::from_boxed(record));
            }
        } else {
            let mut child = match std::mem::replace(&mut elements[index], Value::Null) {
                Value::Node(existing) => existing.into_boxed(),
                _ => element_desc.instantiate()?,
            };
            set_path(
                engine,
                child.as_any_mut(),
                element_desc,
                &path.rest(),
                value,
                &reduced,
                &element_options,
            )?;
            elements[index] = Value::Node(NodeValue::from_boxed(child));
        }
    }
    prop.write(node, Value::List(elements))
}
