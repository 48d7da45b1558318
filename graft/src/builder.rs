//! The graph builder: assembles immutable records bottom-up and populates
//! mutable beans from flattened maps.

use std::any::Any;
use std::collections::HashMap;

use graft_core::{
    BeansError, ElementType, Node, NodeValue, Property, PropertyType, TypeDescriptor, Value,
};

use crate::copy;
use crate::options::CopyOptions;
use crate::path::PropertyPath;
use crate::writer::{self, Engine, convert_leaf, reduced_map};

/// Build a record from a flattened map.
///
/// Argument assembly is best-effort: a bad entry is reported to the
/// diagnostics sink and its component stays null. The all-arguments
/// constructor runs exactly once, and its failure is raised.
pub(crate) fn record_from_map(
    engine: &Engine<'_>,
    desc: &'static TypeDescriptor,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<Box<dyn Node>, BeansError> {
    let mut args = Vec::with_capacity(desc.property_count());
    for prop in desc.properties() {
        if !options.is_target_property(prop.name()) {
            args.push(Value::Null);
            continue;
        }
        let arg = match map_arg(engine, prop, map, options) {
            Ok(value) => value,
            Err(err) => {
                engine.diagnostics.property_skipped(prop.name(), &err);
                Value::Null
            }
        };
        args.push(arg);
    }
    desc.construct(args)
}

/// One constructor argument, assembled from the map entries that address
/// the component.
fn map_arg(
    engine: &Engine<'_>,
    prop: &Property,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<Value, BeansError> {
    let name = prop.name();
    match prop.ty() {
        PropertyType::Scalar(_) => match map.get(name) {
            Some(value) => convert_leaf(engine, options, name, prop.ty(), value.clone()),
            None => Ok(Value::Null),
        },
        PropertyType::Node(nt) => {
            if let Some(Value::Node(node)) = map.get(name) {
                return Ok(Value::Node(node.clone()));
            }
            let reduced = reduced_map(map, name);
            if reduced.is_empty() {
                return Ok(Value::Null);
            }
            let child_desc = nt.descriptor();
            let child_options = options.reduce(name);
            let child = if child_desc.is_record() {
                record_from_map(engine, child_desc, &reduced, &child_options)?
            } else {
                bean_from_map(engine, child_desc, &reduced, &child_options)?
            };
            Ok(Value::Node(NodeValue::from_boxed(child)))
        }
        PropertyType::List(element) => {
            if let Some(value) = map.get(name) {
                return convert_leaf(engine, options, name, prop.ty(), value.clone());
            }
            list_arg(engine, prop, element, map, options)
        }
    }
}

/// Assemble a list component from indexed keys: `name[i]` for leaf
/// elements, `name[i].rest` for nested ones. Unaddressed indices are null.
fn list_arg(
    engine: &Engine<'_>,
    prop: &Property,
    element: ElementType,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<Value, BeansError> {
    let name = prop.name();
    let mut max_index = None;
    for key in map.keys() {
        if let Some((index, _)) = indexed_key(key, name) {
            max_index = Some(max_index.map_or(index, |m: usize| m.max(index)));
        }
    }
    let Some(max_index) = max_index else {
        return Ok(Value::Null);
    };

    let mut elements = Vec::with_capacity(max_index + 1);
    for index in 0..=max_index {
        let element_key = format!("{name}[{index}]");
        let value = match element {
            ElementType::Scalar(target) => match map.get(&element_key) {
                Some(value) => convert_leaf(
                    engine,
                    options,
                    name,
                    PropertyType::Scalar(target),
                    value.clone(),
                )?,
                None => Value::Null,
            },
            ElementType::Node(nt) => {
                if let Some(Value::Node(node)) = map.get(&element_key) {
                    Value::Node(node.clone())
                } else {
                    let reduced = reduced_map(map, &element_key);
                    if reduced.is_empty() {
                        Value::Null
                    } else {
                        let element_desc = nt.descriptor();
                        let element_options = options.reduce(&element_key);
                        let child = if element_desc.is_record() {
                            record_from_map(engine, element_desc, &reduced, &element_options)?
                        } else {
                            bean_from_map(engine, element_desc, &reduced, &element_options)?
                        };
                        Value::Node(NodeValue::from_boxed(child))
                    }
                }
            }
        };
        elements.push(value);
    }
    Ok(Value::List(elements))
}

/// Does `key` address an element of the list property `name`?
fn indexed_key<'a>(key: &'a str, name: &str) -> Option<(usize, Option<&'a str>)> {
    let rest = key.strip_prefix(name)?;
    let rest = rest.strip_prefix('[')?;
    let close = rest.find(']')?;
    let digits = &rest[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse::<usize>().ok()?;
    let tail = &rest[close + 1..];
    if tail.is_empty() {
        Some((index, None))
    } else {
        tail.strip_prefix('.').map(|nested| (index, Some(nested)))
    }
}

/// Build a mutable bean from a flattened map, best-effort per entry.
pub(crate) fn bean_from_map(
    engine: &Engine<'_>,
    desc: &'static TypeDescriptor,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) -> Result<Box<dyn Node>, BeansError> {
    let mut node = desc.instantiate()?;
    populate_from_map(engine, node.as_any_mut(), desc, map, options);
    Ok(node)
}

/// Apply every map entry to an existing bean. Bad entries are reported to
/// the diagnostics sink and skipped.
pub(crate) fn populate_from_map(
    engine: &Engine<'_>,
    node: &mut dyn Any,
    desc: &'static TypeDescriptor,
    map: &HashMap<String, Value>,
    options: &CopyOptions,
) {
    for (key, value) in map {
        if !options.is_target_property(key) {
            continue;
        }
        let path = match PropertyPath::parse(key) {
            Ok(path) => path,
            Err(err) => {
                engine.diagnostics.property_skipped(key, &err);
                continue;
            }
        };
        if let Err(err) = writer::set_path(engine, node, desc, &path, value.clone(), map, options) {
            engine.diagnostics.property_skipped(key, &err);
        }
    }
}

/// Build a record component-wise from another node, best-effort per
/// component. Constructor failure is raised.
pub(crate) fn record_from_node(
    engine: &Engine<'_>,
    desc: &'static TypeDescriptor,
    src: &dyn Any,
    src_desc: &'static TypeDescriptor,
    options: &CopyOptions,
) -> Result<Box<dyn Node>, BeansError> {
    let mut args = Vec::with_capacity(desc.property_count());
    for prop in desc.properties() {
        if !options.is_target_property(prop.name()) {
            args.push(Value::Null);
            continue;
        }
        let arg = match node_arg(engine, prop, src, src_desc, options) {
            Ok(value) => value,
            Err(err) => {
                engine.diagnostics.property_skipped(prop.name(), &err);
                Value::Null
            }
        };
        args.push(arg);
    }
    desc.construct(args)
}

fn node_arg(
    engine: &Engine<'_>,
    prop: &Property,
    src: &dyn Any,
    src_desc: &'static TypeDescriptor,
    options: &CopyOptions,
) -> Result<Value, BeansError> {
    let name = prop.name();
    let src_prop = src_desc.property(name)?;
    let value = src_prop.read(src)?;
    match prop.ty() {
        PropertyType::Node(nt) => match value {
            Value::Null => Ok(Value::Null),
            Value::Node(src_child) => {
                let child_desc = nt.descriptor();
                if src_child.descriptor().type_id() == child_desc.type_id() {
                    return Ok(Value::Node(src_child));
                }
                let child_options = options.reduce(name);
                if child_desc.is_record() {
                    let record = record_from_node(
                        engine,
                        child_desc,
                        src_child.as_node().as_any(),
                        src_child.descriptor(),
                        &child_options,
                    )?;
                    Ok(Value::Node(NodeValue::from_boxed(record)))
                } else {
                    let mut child = child_desc.instantiate()?;
                    copy::copy_inner(
                        engine,
                        src_child.as_node().as_any(),
                        src_child.descriptor(),
                        child.as_any_mut(),
                        child_desc,
                        &child_options,
                    );
                    Ok(Value::Node(NodeValue::from_boxed(child)))
                }
            }
            other => Err(BeansError::TypeMismatch {
                expected: nt.type_name(),
                actual: other.type_name(),
            }),
        },
        PropertyType::List(ElementType::Node(_)) => Ok(value),
        other_ty => convert_leaf(engine, options, name, other_ty, value),
    }
}
