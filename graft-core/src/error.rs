//! Error types for property mapping and value conversion.

use std::error::Error;
use std::fmt;

/// A value could not be converted to the requested target type.
pub struct ConversionError {
    value: String,
    target: &'static str,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ConversionError {
    /// Create a new conversion error. `value` is a rendering of the
    /// offending value, `target` the name of the requested type.
    pub fn new(value: impl Into<String>, target: &'static str) -> Self {
        Self {
            value: value.into(),
            target,
            source: None,
        }
    }

    /// Attach the underlying cause (a parse error, usually).
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The name of the requested target type.
    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Can't convert {} to {}.", self.value, self.target)
    }
}

impl fmt::Debug for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// An error raised by the strict mapping operations.
///
/// The best-effort copy operations never surface this type to callers;
/// they report per-property failures through the diagnostics sink instead.
pub enum BeansError {
    /// A property path failed to parse.
    InvalidPath {
        /// The offending path text.
        expr: String,
    },
    /// A path segment named a property the type does not have.
    UnknownProperty {
        /// Name of the type that was inspected.
        type_name: &'static str,
        /// The property that was requested.
        property: String,
    },
    /// The path shape does not match the type structure, e.g. an indexed
    /// segment applied to a non-list property.
    StructureMismatch {
        /// The property the path was applied to.
        property: String,
        /// What went wrong.
        detail: String,
    },
    /// A scalar conversion failed.
    Conversion(ConversionError),
    /// A node constructor failed.
    Construction {
        /// Name of the type under construction.
        type_name: &'static str,
        /// The underlying failure.
        source: Box<dyn Error + Send + Sync>,
    },
    /// The operation was configured inconsistently, e.g. a named converter
    /// was requested but never registered.
    Configuration {
        /// What went wrong.
        detail: String,
    },
    /// A mutating operation targeted an immutable node.
    ImmutableTarget {
        /// Name of the immutable type.
        type_name: &'static str,
    },
    /// A value of one node type was assigned where another was declared.
    TypeMismatch {
        /// The declared type.
        expected: &'static str,
        /// The type that was supplied.
        actual: &'static str,
    },
}

impl BeansError {
    /// Shorthand for [`BeansError::Configuration`].
    pub fn configuration(detail: impl Into<String>) -> Self {
        BeansError::Configuration {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`BeansError::Construction`].
    pub fn construction(type_name: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        BeansError::Construction {
            type_name,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for BeansError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeansError::InvalidPath { expr } => {
                write!(f, "invalid property path {expr:?}")
            }
            BeansError::UnknownProperty {
                type_name,
                property,
            } => {
                write!(f, "{type_name} has no property named {property:?}")
            }
            BeansError::StructureMismatch { property, detail } => {
                write!(f, "property {property:?}: {detail}")
            }
            BeansError::Conversion(inner) => fmt::Display::fmt(inner, f),
            BeansError::Construction { type_name, source } => {
                write!(f, "failed to construct {type_name}: {source}")
            }
            BeansError::Configuration { detail } => f.write_str(detail),
            BeansError::ImmutableTarget { type_name } => {
                write!(f, "{type_name} is immutable and cannot be mutated in place")
            }
            BeansError::TypeMismatch { expected, actual } => {
                write!(f, "expected a value of type {expected}, got {actual}")
            }
        }
    }
}

impl fmt::Debug for BeansError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for BeansError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BeansError::Conversion(inner) => Some(inner),
            BeansError::Construction { source, .. } => {
                Some(source.as_ref() as &(dyn Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<ConversionError> for BeansError {
    fn from(inner: ConversionError) -> Self {
        BeansError::Conversion(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_message_names_value_and_target() {
        let err = ConversionError::new("abc", "i32");
        assert_eq!(err.to_string(), "Can't convert abc to i32.");
    }

    #[test]
    fn conversion_source_is_preserved() {
        let cause = "x".parse::<i32>().unwrap_err();
        let err = ConversionError::new("x", "i32").with_source(cause);
        assert!(err.source().is_some());
        let wrapped = BeansError::from(err);
        assert!(wrapped.source().is_some());
    }

    #[test]
    fn unknown_property_message() {
        let err = BeansError::UnknownProperty {
            type_name: "User",
            property: "nam".into(),
        };
        assert_eq!(err.to_string(), "User has no property named \"nam\"");
    }
}
