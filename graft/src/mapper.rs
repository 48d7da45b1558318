//! The public mapping API.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use graft_core::{
    BeansError, Converter, ConverterRegistry, Graft, Node, ScalarType, TypeDescriptor, Value,
    registry,
};

use crate::builder;
use crate::copy;
use crate::diag::{CopyDiagnostics, LogDiagnostics};
use crate::flatten;
use crate::options::CopyOptions;
use crate::path::{PropertyPath, Segment};
use crate::writer::Engine;

/// The mapping engine.
///
/// Owns the converter registry, the process-wide default [`CopyOptions`]
/// (the lowest layer of the precedence chain) and the diagnostics sink the
/// best-effort operations report skips to. Construct one and pass it where
/// it is needed; there is no ambient instance.
///
/// The strict operations ([`get_property`](Self::get_property),
/// [`set_property`](Self::set_property)) raise [`BeansError`]; the copy
/// operations skip failing properties and keep going.
pub struct Mapper {
    registry: ConverterRegistry,
    global: CopyOptions,
    diagnostics: Arc<dyn CopyDiagnostics>,
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper {
            registry: ConverterRegistry::with_defaults(),
            global: CopyOptions::empty(),
            diagnostics: Arc::new(LogDiagnostics),
        }
    }
}

impl Mapper {
    /// A mapper with the default converters, no global options and the
    /// logging diagnostics sink.
    pub fn new() -> Self {
        Mapper::default()
    }

    /// Replace the process-wide default options, e.g. organization-wide
    /// date and number patterns.
    pub fn with_global_options(mut self, options: CopyOptions) -> Self {
        self.global = options;
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn CopyDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Register (or replace) a registry converter for a target type.
    pub fn register_converter(&mut self, target: ScalarType, converter: Arc<dyn Converter>) {
        self.registry.register(target, converter);
    }

    fn engine(&self) -> Engine<'_> {
        Engine {
            registry: &self.registry,
            diagnostics: self.diagnostics.as_ref(),
        }
    }

    /// The full precedence chain for one operation: process-wide defaults,
    /// then the target type's declarative patterns, then call-site options.
    fn options_for(&self, desc: &TypeDescriptor, call_site: &CopyOptions) -> CopyOptions {
        self.global
            .merge(&CopyOptions::from_descriptor(desc))
            .merge(call_site)
    }

    /// The chain for node-to-node copies: both ends contribute their
    /// declarative patterns, destination over source.
    fn options_for_copy(
        &self,
        src_desc: &TypeDescriptor,
        dest_desc: &TypeDescriptor,
        call_site: &CopyOptions,
    ) -> CopyOptions {
        self.global
            .merge(&CopyOptions::from_descriptor(src_desc))
            .merge(&CopyOptions::from_descriptor(dest_desc))
            .merge(call_site)
    }

    /// Read the value at `path`. Strict: unknown properties, bad indices
    /// and null intermediates raise.
    pub fn get_property<T: Graft>(&self, bean: &T, path: &str) -> Result<Value, BeansError> {
        let desc = registry::describe::<T>();
        let path = PropertyPath::parse(path)?;
        read_path(bean, desc, &path)
    }

    /// Read the value at `path`, converted to `target` through the
    /// registry.
    pub fn get_property_as<T: Graft>(
        &self,
        bean: &T,
        path: &str,
        target: ScalarType,
    ) -> Result<Value, BeansError> {
        let value = self.get_property(bean, path)?;
        Ok(self.registry.convert(target, &value)?)
    }

    /// Assign `value` at `path`, creating intermediate structure and
    /// growing lists as needed. Strict: any failure raises.
    pub fn set_property<T: Graft>(
        &self,
        bean: &mut T,
        path: &str,
        value: Value,
    ) -> Result<(), BeansError> {
        let desc = registry::describe::<T>();
        if desc.is_record() {
            return Err(BeansError::ImmutableTarget {
                type_name: desc.type_name(),
            });
        }
        let path = PropertyPath::parse(path)?;
        let mut map = HashMap::with_capacity(1);
        map.insert(path.raw().to_owned(), value.clone());
        let merged = self.options_for(desc, &CopyOptions::empty());
        crate::writer::set_path(&self.engine(), bean, desc, &path, value, &map, &merged)
    }

    /// Copy a flattened map into an existing bean, best-effort per entry.
    pub fn copy_from_map<T: Graft>(
        &self,
        bean: &mut T,
        map: &HashMap<String, Value>,
        options: &CopyOptions,
    ) -> Result<(), BeansError> {
        let desc = registry::describe::<T>();
        if desc.is_record() {
            return Err(BeansError::ImmutableTarget {
                type_name: desc.type_name(),
            });
        }
        let merged = self.options_for(desc, options);
        builder::populate_from_map(&self.engine(), bean, desc, map, &merged);
        Ok(())
    }

    /// Create a `T` and populate it from a flattened map. Works for both
    /// beans and records; records are built bottom-up and constructed
    /// exactly once. `None` yields an all-defaults instance.
    pub fn create_and_copy_from_map<T: Graft>(
        &self,
        map: Option<&HashMap<String, Value>>,
        options: &CopyOptions,
    ) -> Result<T, BeansError> {
        let desc = registry::describe::<T>();
        let merged = self.options_for(desc, options);
        let node = match map {
            None => default_instance(desc)?,
            Some(map) => {
                if desc.is_record() {
                    builder::record_from_map(&self.engine(), desc, map, &merged)?
                } else {
                    builder::bean_from_map(&self.engine(), desc, map, &merged)?
                }
            }
        };
        downcast_node(node)
    }

    /// [`create_and_copy_from_map`](Self::create_and_copy_from_map)
    /// restricted to the given properties.
    pub fn create_and_copy_from_map_includes<T: Graft>(
        &self,
        map: Option<&HashMap<String, Value>>,
        names: &[&str],
    ) -> Result<T, BeansError> {
        let options = CopyOptions::builder().includes(names.iter().copied()).build();
        self.create_and_copy_from_map(map, &options)
    }

    /// [`create_and_copy_from_map`](Self::create_and_copy_from_map) with
    /// the given properties excluded.
    pub fn create_and_copy_from_map_excludes<T: Graft>(
        &self,
        map: Option<&HashMap<String, Value>>,
        names: &[&str],
    ) -> Result<T, BeansError> {
        let options = CopyOptions::builder().excludes(names.iter().copied()).build();
        self.create_and_copy_from_map(map, &options)
    }

    /// Copy same-named properties from one bean to another, best-effort
    /// per property. The destination must be mutable.
    pub fn copy<S: Graft, D: Graft>(
        &self,
        src: &S,
        dest: &mut D,
        options: &CopyOptions,
    ) -> Result<(), BeansError> {
        let src_desc = registry::describe::<S>();
        let dest_desc = registry::describe::<D>();
        if dest_desc.is_record() {
            return Err(BeansError::ImmutableTarget {
                type_name: dest_desc.type_name(),
            });
        }
        let merged = self.options_for_copy(src_desc, dest_desc, options);
        copy::copy_inner(&self.engine(), src, src_desc, dest, dest_desc, &merged);
        Ok(())
    }

    /// [`copy`](Self::copy) skipping properties whose source value is null.
    pub fn copy_excludes_null<S: Graft, D: Graft>(
        &self,
        src: &S,
        dest: &mut D,
    ) -> Result<(), BeansError> {
        self.copy(src, dest, &CopyOptions::builder().excludes_null().build())
    }

    /// [`copy`](Self::copy) restricted to the given properties.
    pub fn copy_includes<S: Graft, D: Graft>(
        &self,
        src: &S,
        dest: &mut D,
        names: &[&str],
    ) -> Result<(), BeansError> {
        let options = CopyOptions::builder().includes(names.iter().copied()).build();
        self.copy(src, dest, &options)
    }

    /// [`copy`](Self::copy) with the given properties excluded.
    pub fn copy_excludes<S: Graft, D: Graft>(
        &self,
        src: &S,
        dest: &mut D,
        names: &[&str],
    ) -> Result<(), BeansError> {
        let options = CopyOptions::builder().excludes(names.iter().copied()).build();
        self.copy(src, dest, &options)
    }

    /// Create a `T` and copy same-named properties from `src` into it.
    /// `None` yields an all-defaults instance.
    pub fn create_and_copy<T: Graft, S: Graft>(
        &self,
        src: Option<&S>,
        options: &CopyOptions,
    ) -> Result<T, BeansError> {
        let desc = registry::describe::<T>();
        let node = match src {
            None => default_instance(desc)?,
            Some(src) => {
                let src_desc = registry::describe::<S>();
                let merged = self.options_for_copy(src_desc, desc, options);
                if desc.is_record() {
                    builder::record_from_node(&self.engine(), desc, src, src_desc, &merged)?
                } else {
                    let mut node = desc.instantiate()?;
                    copy::copy_inner(
                        &self.engine(),
                        src,
                        src_desc,
                        node.as_any_mut(),
                        desc,
                        &merged,
                    );
                    node
                }
            }
        };
        downcast_node(node)
    }

    /// [`create_and_copy`](Self::create_and_copy) restricted to the given
    /// properties.
    pub fn create_and_copy_includes<T: Graft, S: Graft>(
        &self,
        src: Option<&S>,
        names: &[&str],
    ) -> Result<T, BeansError> {
        let options = CopyOptions::builder().includes(names.iter().copied()).build();
        self.create_and_copy(src, &options)
    }

    /// [`create_and_copy`](Self::create_and_copy) with the given
    /// properties excluded.
    pub fn create_and_copy_excludes<T: Graft, S: Graft>(
        &self,
        src: Option<&S>,
        names: &[&str],
    ) -> Result<T, BeansError> {
        let options = CopyOptions::builder().excludes(names.iter().copied()).build();
        self.create_and_copy(src, &options)
    }

    /// Flatten a node graph into a map of dotted keys. Values are stored
    /// raw; nothing is converted.
    pub fn create_map_and_copy<S: Graft>(
        &self,
        src: &S,
        options: &CopyOptions,
    ) -> Result<HashMap<String, Value>, BeansError> {
        let desc = registry::describe::<S>();
        let merged = self.options_for(desc, options);
        let mut out = HashMap::new();
        flatten::flatten_into(src, desc, "", &merged, &mut out)?;
        Ok(out)
    }

    /// [`create_map_and_copy`](Self::create_map_and_copy) restricted to
    /// the given properties.
    pub fn create_map_and_copy_includes<S: Graft>(
        &self,
        src: &S,
        names: &[&str],
    ) -> Result<HashMap<String, Value>, BeansError> {
        let options = CopyOptions::builder().includes(names.iter().copied()).build();
        self.create_map_and_copy(src, &options)
    }

    /// [`create_map_and_copy`](Self::create_map_and_copy) with the given
    /// properties excluded.
    pub fn create_map_and_copy_excludes<S: Graft>(
        &self,
        src: &S,
        names: &[&str],
    ) -> Result<HashMap<String, Value>, BeansError> {
        let options = CopyOptions::builder().excludes(names.iter().copied()).build();
        self.create_map_and_copy(src, &options)
    }
}

fn default_instance(desc: &'static TypeDescriptor) -> Result<Box<dyn Node>, BeansError> {
    if desc.is_record() {
        desc.construct(vec![Value::Null; desc.property_count()])
    } else {
        desc.instantiate()
    }
}

fn downcast_node<T: Graft>(node: Box<dyn Node>) -> Result<T, BeansError> {
    node.into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| BeansError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            actual: "a different node type",
        })
}

fn read_path(
    node: &dyn Any,
    desc: &'static TypeDescriptor,
    path: &PropertyPath,
) -> Result<Value, BeansError> {
    let mut value = read_segment(node, desc, path.root())?;
    for seg in &path.segments()[1..] {
        let child = match value {
            Value::Node(child) => child,
            Value::Null => {
                return Err(BeansError::StructureMismatch {
                    property: seg.name().to_owned(),
                    detail: "intermediate value is null".to_owned(),
                });
            }
            other => {
                return Err(BeansError::StructureMismatch {
                    property: seg.name().to_owned(),
                    detail: format!("cannot descend into a {}", other.type_name()),
                });
            }
        };
        value = read_segment(child.as_node().as_any(), child.descriptor(), seg)?;
    }
    Ok(value)
}

fn read_segment(
    node: &dyn Any,
    desc: &'static TypeDescriptor,
    seg: &Segment,
) -> Result<Value, BeansError> {
    let prop = desc.property(seg.name())?;
    let value = prop.read(node)?;
    let Some(index) = seg.index() else {
        return Ok(value);
    };
    match value {
        Value::List(mut elements) => {
            if index < elements.len() {
                Ok(elements.swap_remove(index))
            } else {
                Err(BeansError::StructureMismatch {
                    property: seg.raw(),
                    detail: format!("index {index} out of range for a list of {}", elements.len()),
                })
            }
        }
        Value::Null => Err(BeansError::StructureMismatch {
            property: seg.raw(),
            detail: "index applied to a null list".to_owned(),
        }),
        other => Err(BeansError::StructureMismatch {
            property: seg.raw(),
            detail: format!("index applied to a {}", other.type_name()),
        }),
    }
}
