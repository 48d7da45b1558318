//! Bean-to-bean copying.
//!
//! Iterates the destination's properties, reads the same-named source
//! property and writes it across, converting scalars and recursing into
//! nested nodes. Best-effort: each failed property goes to the diagnostics
//! sink and the copy continues.

use std::any::Any;

use graft_core::{BeansError, NodeValue, Property, PropertyType, TypeDescriptor, Value};

use crate::builder;
use crate::options::CopyOptions;
use crate::writer::{Engine, convert_leaf};

pub(crate) fn copy_inner(
    engine: &Engine<'_>,
    src: &dyn Any,
    src_desc: &'static TypeDescriptor,
    dest: &mut dyn Any,
    dest_desc: &'static TypeDescriptor,
    options: &CopyOptions,
) {
    for dest_prop in dest_desc.properties() {
        if !options.is_target_property(dest_prop.name()) {
            continue;
        }
        if let Err(err) = copy_property(engine, src, src_desc, dest, dest_prop, options) {
            engine.diagnostics.property_skipped(dest_prop.name(), &err);
        }
    }
}

fn copy_property(
    engine: &Engine<'_>,
    src: &dyn Any,
    src_desc: &'static TypeDescriptor,
    dest: &mut dyn Any,
    dest_prop: &Property,
    options: &CopyOptions,
) -> Result<(), BeansError> {
    let name = dest_prop.name();
    let src_prop = src_desc.property(name)?;
    let value = src_prop.read(src)?;
    if value.is_null() && options.excludes_null() {
        return Ok(());
    }
    match dest_prop.ty() {
        PropertyType::Node(nt) => {
            // a null nested source never overwrites the destination
            let src_child = match value {
                Value::Null => return Ok(()),
                Value::Node(child) => child,
                other => {
                    return Err(BeansError::TypeMismatch {
                        expected: nt.type_name(),
                        actual: other.type_name(),
                    });
                }
            };
            let child_desc = nt.descriptor();
            let child_options = options.reduce(name);
            if child_desc.is_record() {
                let record = if src_child.descriptor().type_id() == child_desc.type_id() {
                    Value::Node(src_child)
                } else {
                    let built = builder::record_from_node(
                        engine,
                        child_desc,
                        src_child.as_node().as_any(),
                        src_child.descriptor(),
                        &child_options,
                    )?;
                    Value::Node(NodeValue::from_boxed(built))
                };
                dest_prop.write(dest, record)
            } else {
                let mut child = match dest_prop.read(dest)? {
                    Value::Node(existing) => existing.into_boxed(),
                    _ => child_desc.instantiate()?,
                };
                copy_inner(
                    engine,
                    src_child.as_node().as_any(),
                    src_child.descriptor(),
                    child.as_any_mut(),
                    child_desc,
                    &child_options,
                );
                dest_prop.write(dest, Value::Node(NodeValue::from_boxed(child)))
            }
        }
        other_ty => {
            let converted = convert_leaf(engine, options, name, other_ty, value)?;
            dest_prop.write(dest, converted)
        }
    }
}
