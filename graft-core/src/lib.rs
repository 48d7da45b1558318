#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod accessors;
pub mod convert;
pub mod converters;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod scalar;
pub mod value;

pub use convert::{Converter, ConverterRegistry};
pub use descriptor::{
    ElementType, Graft, Node, NodeKind, NodeType, PatternKind, Property, PropertyPattern,
    PropertyType, TypeDescriptor, TypeDescriptorBuilder,
};
pub use error::{BeansError, ConversionError};
pub use scalar::{Scalar, ScalarType};
pub use value::{NodeValue, Value};
