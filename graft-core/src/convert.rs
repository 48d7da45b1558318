//! The converter trait and per-target-type converter registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::converters::{
    BoolConverter, BytesConverter, DateConverter, DateTimeConverter, DecimalConverter,
    IntConverter, StrArrayConverter, StringConverter,
};
use crate::error::ConversionError;
use crate::scalar::ScalarType;
use crate::value::Value;

/// Converts arbitrary values to one target scalar type.
pub trait Converter: Send + Sync {
    /// Convert `value` to the target type. Implementations pass `Null`
    /// through and reject representations they do not understand.
    fn convert(&self, value: &Value) -> Result<Value, ConversionError>;
}

/// A pluggable set of converters, keyed by target scalar type.
pub struct ConverterRegistry {
    converters: HashMap<ScalarType, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        ConverterRegistry {
            converters: HashMap::new(),
        }
    }

    /// A registry with the default converter per scalar type.
    pub fn with_defaults() -> Self {
        let mut registry = ConverterRegistry::empty();
        registry.register(ScalarType::Bool, Arc::new(BoolConverter));
        registry.register(ScalarType::I16, Arc::new(IntConverter::new(ScalarType::I16)));
        registry.register(ScalarType::I32, Arc::new(IntConverter::new(ScalarType::I32)));
        registry.register(ScalarType::I64, Arc::new(IntConverter::new(ScalarType::I64)));
        registry.register(ScalarType::Decimal, Arc::new(DecimalConverter::new()));
        registry.register(ScalarType::Str, Arc::new(StringConverter::new()));
        registry.register(ScalarType::StrArray, Arc::new(StrArrayConverter));
        registry.register(ScalarType::Bytes, Arc::new(BytesConverter));
        registry.register(ScalarType::Date, Arc::new(DateConverter::new()));
        registry.register(ScalarType::DateTime, Arc::new(DateTimeConverter::new()));
        registry
    }

    /// Register (or replace) the converter for a target type.
    pub fn register(&mut self, target: ScalarType, converter: Arc<dyn Converter>) {
        self.converters.insert(target, converter);
    }

    /// Is a converter registered for this target type?
    pub fn has_converter(&self, target: ScalarType) -> bool {
        self.converters.contains_key(&target)
    }

    /// Convert a value to the target scalar type.
    ///
    /// `Null` converts to `Null`; a target with no registered converter
    /// passes the value through unchanged.
    pub fn convert(&self, target: ScalarType, value: &Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.converters.get(&target) {
            Some(converter) => converter.convert(value),
            None => Ok(value.clone()),
        }
    }

    /// Convert a value to a list with the given element type.
    ///
    /// Lists convert element-wise; a string array becomes one element per
    /// string; any other single value becomes a one-element list.
    pub fn convert_list(
        &self,
        element: ScalarType,
        value: &Value,
    ) -> Result<Value, ConversionError> {
        let converted = match value {
            Value::Null => return Ok(Value::Null),
            Value::List(elements) => elements
                .iter()
                .map(|element_value| self.convert(element, element_value))
                .collect::<Result<Vec<_>, _>>()?,
            Value::StrArray(values) => values
                .iter()
                .map(|v| self.convert(element, &Value::Str(v.clone())))
                .collect::<Result<Vec<_>, _>>()?,
            single => vec![self.convert(element, single)?],
        };
        Ok(Value::List(converted))
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        ConverterRegistry::with_defaults()
    }
}
