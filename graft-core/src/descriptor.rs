//! Per-type capability tables.
//!
//! Runtime reflection is replaced by a [`TypeDescriptor`] per mapped type,
//! generated at compile time by the `Bean`/`Record` derives: an ordered table
//! of [`Property`] entries (declared type plus reader/writer thunks) together
//! with the type's constructor.

use std::any::{Any, TypeId};
use std::fmt;

use indexmap::IndexMap;

use crate::error::BeansError;
use crate::scalar::ScalarType;
use crate::value::Value;

/// A type with a generated capability table.
///
/// Implemented by the `Bean` and `Record` derives; the descriptor is built
/// once on first access and shared.
pub trait Graft: 'static {
    /// The capability table for this type.
    fn descriptor() -> &'static TypeDescriptor;
}

/// Object-safe companion of [`Graft`], for carrying node instances through
/// the dynamic [`Value`] model. Implemented by the derives alongside `Graft`.
pub trait Node: Any + fmt::Debug + Send + Sync {
    /// The capability table for this node's type.
    fn descriptor(&self) -> &'static TypeDescriptor;
    /// Borrow as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Borrow mutably as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Unwrap into `Any` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Clone behind the trait object.
    fn clone_node(&self) -> Box<dyn Node>;
}

/// Whether a node type is mutated in place or built in one shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Accessor pairs and a no-argument constructor; populated field by field.
    Mutable,
    /// Readers and an all-arguments constructor; built exactly once.
    Record,
}

/// A reference to another described node type.
///
/// Holds the descriptor access as a function pointer so that mutually- and
/// self-referential types can build their tables lazily.
#[derive(Clone, Copy)]
pub struct NodeType {
    descriptor: fn() -> &'static TypeDescriptor,
}

impl NodeType {
    /// The node type of `N`.
    pub fn of<N: Graft>() -> Self {
        NodeType {
            descriptor: N::descriptor,
        }
    }

    /// Resolve the descriptor.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        (self.descriptor)()
    }

    /// The referenced type's name.
    pub fn type_name(&self) -> &'static str {
        self.descriptor().type_name()
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The element type of a list property.
#[derive(Clone, Copy, Debug)]
pub enum ElementType {
    /// Scalar elements.
    Scalar(ScalarType),
    /// Nested node elements.
    Node(NodeType),
}

/// The declared type of a property.
#[derive(Clone, Copy, Debug)]
pub enum PropertyType {
    /// A scalar, converted on assignment.
    Scalar(ScalarType),
    /// A nested node, recursed into.
    Node(NodeType),
    /// An ordered list, grown on demand. Element type is statically known.
    List(ElementType),
}

/// One property of a described type: its declared type and accessor thunks.
pub struct Property {
    name: &'static str,
    ty: PropertyType,
    get: Option<fn(&dyn Any) -> Result<Value, BeansError>>,
    set: Option<fn(&mut dyn Any, Value) -> Result<(), BeansError>>,
}

impl Property {
    /// Assemble a property entry. Used by generated code.
    pub const fn new(
        name: &'static str,
        ty: PropertyType,
        get: Option<fn(&dyn Any) -> Result<Value, BeansError>>,
        set: Option<fn(&mut dyn Any, Value) -> Result<(), BeansError>>,
    ) -> Self {
        Property { name, ty, get, set }
    }

    /// The property name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type.
    pub fn ty(&self) -> PropertyType {
        self.ty
    }

    /// Does the property have a reader?
    pub fn is_readable(&self) -> bool {
        self.get.is_some()
    }

    /// Does the property have a writer?
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    /// Read the current value from a node instance.
    pub fn read(&self, node: &dyn Any) -> Result<Value, BeansError> {
        match self.get {
            Some(get) => get(node),
            None => Err(BeansError::configuration(format!(
                "property {:?} has no reader",
                self.name
            ))),
        }
    }

    /// Write a value into a node instance. A property without a writer
    /// ignores the assignment.
    pub fn write(&self, node: &mut dyn Any, value: Value) -> Result<(), BeansError> {
        match self.set {
            Some(set) => set(node, value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Which converter family a declarative pattern configures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// Date / date-time format pattern.
    Date,
    /// Number format pattern.
    Number,
}

/// A per-property format pattern declared with a `#[graft(...)]` attribute.
#[derive(Clone, Copy, Debug)]
pub struct PropertyPattern {
    /// The property the pattern applies to.
    pub property: &'static str,
    /// Date or number.
    pub kind: PatternKind,
    /// The format pattern text.
    pub pattern: &'static str,
}

/// The capability table of one mapped type.
///
/// Immutable after construction; properties iterate in declaration order,
/// which is also the argument order of a record's constructor.
pub struct TypeDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    node_kind: NodeKind,
    properties: IndexMap<&'static str, Property>,
    instantiate: Option<fn() -> Box<dyn Node>>,
    construct: Option<fn(Vec<Value>) -> Result<Box<dyn Node>, BeansError>>,
    patterns: Vec<PropertyPattern>,
}

impl TypeDescriptor {
    /// Start building the table for `T`. Used by generated code.
    pub fn builder<T: 'static>(type_name: &'static str, node_kind: NodeKind) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            type_name,
            type_id: TypeId::of::<T>(),
            node_kind,
            properties: IndexMap::new(),
            instantiate: None,
            construct: None,
            patterns: Vec::new(),
        }
    }

    /// The described type's name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The described type's `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Mutable bean or record?
    pub fn node_kind(&self) -> NodeKind {
        self.node_kind
    }

    /// Is the described type a record?
    pub fn is_record(&self) -> bool {
        self.node_kind == NodeKind::Record
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Result<&Property, BeansError> {
        self.properties
            .get(name)
            .ok_or_else(|| BeansError::UnknownProperty {
                type_name: self.type_name,
                property: name.to_owned(),
            })
    }

    /// Look up a property by name, `None` when absent.
    pub fn property_opt(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// All properties, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Number of properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Create a default instance of a mutable node.
    pub fn instantiate(&self) -> Result<Box<dyn Node>, BeansError> {
        match self.instantiate {
            Some(instantiate) => Ok(instantiate()),
            None => Err(BeansError::ImmutableTarget {
                type_name: self.type_name,
            }),
        }
    }

    /// Invoke a record's all-arguments constructor. `args` must supply one
    /// value per property, in declaration order.
    pub fn construct(&self, args: Vec<Value>) -> Result<Box<dyn Node>, BeansError> {
        let construct = self.construct.ok_or_else(|| {
            BeansError::configuration(format!("{} has no all-arguments constructor", self.type_name))
        })?;
        if args.len() != self.properties.len() {
            return Err(BeansError::configuration(format!(
                "{} takes {} constructor arguments, got {}",
                self.type_name,
                self.properties.len(),
                args.len()
            )));
        }
        construct(args)
    }

    /// Declarative format patterns, in declaration order.
    pub fn patterns(&self) -> &[PropertyPattern] {
        &self.patterns
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("node_kind", &self.node_kind)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Builder consumed by generated `descriptor()` bodies.
pub struct TypeDescriptorBuilder {
    type_name: &'static str,
    type_id: TypeId,
    node_kind: NodeKind,
    properties: IndexMap<&'static str, Property>,
    instantiate: Option<fn() -> Box<dyn Node>>,
    construct: Option<fn(Vec<Value>) -> Result<Box<dyn Node>, BeansError>>,
    patterns: Vec<PropertyPattern>,
}

impl TypeDescriptorBuilder {
    /// Append a property. Declaration order is preserved.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.insert(property.name(), property);
        self
    }

    /// Set the no-argument constructor.
    pub fn instantiate(mut self, instantiate: fn() -> Box<dyn Node>) -> Self {
        self.instantiate = Some(instantiate);
        self
    }

    /// Set the all-arguments constructor.
    pub fn construct(
        mut self,
        construct: fn(Vec<Value>) -> Result<Box<dyn Node>, BeansError>,
    ) -> Self {
        self.construct = Some(construct);
        self
    }

    /// Record a declarative date pattern for a property.
    pub fn date_pattern(mut self, property: &'static str, pattern: &'static str) -> Self {
        self.patterns.push(PropertyPattern {
            property,
            kind: PatternKind::Date,
            pattern,
        });
        self
    }

    /// Record a declarative number pattern for a property.
    pub fn number_pattern(mut self, property: &'static str, pattern: &'static str) -> Self {
        self.patterns.push(PropertyPattern {
            property,
            kind: PatternKind::Number,
            pattern,
        });
        self
    }

    /// Finish the table.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            type_name: self.type_name,
            type_id: self.type_id,
            node_kind: self.node_kind,
            properties: self.properties,
            instantiate: self.instantiate,
            construct: self.construct,
            patterns: self.patterns,
        }
    }
}
