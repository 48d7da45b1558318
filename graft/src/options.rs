//! Per-call copy configuration.
//!
//! [`CopyOptions`] layers converter overrides, include/exclude filters and
//! the null-skipping flag on top of the mapper's converter registry.
//! Instances are immutable; they compose with [`CopyOptions::merge`], where
//! the argument wins on collision, so the standard precedence chain is built
//! lowest-first: process-wide defaults, then declarative per-field patterns,
//! then call-site options.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use graft_core::converters::{
    DateConverter, DateTimeConverter, DecimalConverter, IntConverter, StringConverter,
};
use graft_core::{BeansError, Converter, PatternKind, ScalarType, TypeDescriptor, Value};

/// Options applied to one copy operation.
#[derive(Clone, Default)]
pub struct CopyOptions {
    typed: HashMap<ScalarType, Arc<dyn Converter>>,
    named: HashMap<String, HashMap<ScalarType, Arc<dyn Converter>>>,
    excludes_null: bool,
    includes: HashSet<String>,
    excludes: HashSet<String>,
}

impl CopyOptions {
    /// Options that change nothing.
    pub fn empty() -> Self {
        CopyOptions::default()
    }

    /// Start building options.
    pub fn builder() -> CopyOptionsBuilder {
        CopyOptionsBuilder::default()
    }

    /// The declarative options of a type: the format patterns its fields
    /// carry as `#[graft(...)]` attributes, surfaced as by-name converters.
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Self {
        let mut builder = CopyOptions::builder();
        for pattern in descriptor.patterns() {
            builder = match pattern.kind {
                PatternKind::Date => {
                    builder.date_pattern_by_name(pattern.property, pattern.pattern)
                }
                PatternKind::Number => {
                    builder.number_pattern_by_name(pattern.property, pattern.pattern)
                }
            };
        }
        builder.build()
    }

    /// Combine with `other`; on collision `other` wins. Include and exclude
    /// sets are united and the null-skipping flag is or-ed.
    pub fn merge(&self, other: &CopyOptions) -> CopyOptions {
        let mut typed = self.typed.clone();
        for (ty, converter) in &other.typed {
            typed.insert(*ty, Arc::clone(converter));
        }
        let mut named = self.named.clone();
        for (name, converters) in &other.named {
            let entry = named.entry(name.clone()).or_default();
            for (ty, converter) in converters {
                entry.insert(*ty, Arc::clone(converter));
            }
        }
        let mut includes = self.includes.clone();
        includes.extend(other.includes.iter().cloned());
        let mut excludes = self.excludes.clone();
        excludes.extend(other.excludes.iter().cloned());
        CopyOptions {
            typed,
            named,
            excludes_null: self.excludes_null || other.excludes_null,
            includes,
            excludes,
        }
    }

    /// The options one nesting level down: by-name entries and filters with
    /// a `name.` prefix, prefix stripped; type-scoped converters and the
    /// null flag carry over unchanged.
    pub fn reduce(&self, name: &str) -> CopyOptions {
        let prefix = format!("{name}.");
        let strip = |set: &HashSet<String>| -> HashSet<String> {
            set.iter()
                .filter_map(|entry| entry.strip_prefix(&prefix))
                .map(str::to_owned)
                .collect()
        };
        let named = self
            .named
            .iter()
            .filter_map(|(key, converters)| {
                key.strip_prefix(&prefix)
                    .map(|stripped| (stripped.to_owned(), converters.clone()))
            })
            .collect();
        CopyOptions {
            typed: self.typed.clone(),
            named,
            excludes_null: self.excludes_null,
            includes: strip(&self.includes),
            excludes: strip(&self.excludes),
        }
    }

    /// The options used when flattening recurses into a nested node: the
    /// include filter no longer applies there.
    pub fn for_nested_node(&self) -> CopyOptions {
        let mut nested = self.clone();
        nested.includes.clear();
        nested
    }

    /// Should properties whose source value is null be skipped?
    pub fn excludes_null(&self) -> bool {
        self.excludes_null
    }

    /// Is `name` in scope given the include and exclude filters?
    pub fn is_target_property(&self, name: &str) -> bool {
        if self.excludes.contains(name) {
            return false;
        }
        self.includes.is_empty() || self.includes.contains(name)
    }

    /// Is a converter registered for this property name and target type?
    pub fn has_named_converter(&self, name: &str, target: ScalarType) -> bool {
        self.named
            .get(name)
            .is_some_and(|converters| converters.contains_key(&target))
    }

    /// Is a converter registered for this target type?
    pub fn has_typed_converter(&self, target: ScalarType) -> bool {
        self.typed.contains_key(&target)
    }

    /// Convert through the by-name converter for (`name`, `target`).
    pub fn convert_by_name(
        &self,
        name: &str,
        target: ScalarType,
        value: &Value,
    ) -> Result<Value, BeansError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let converter = self
            .named
            .get(name)
            .and_then(|converters| converters.get(&target))
            .ok_or_else(|| {
                BeansError::configuration(format!(
                    "no converter registered for property {name:?} as {}",
                    target.name()
                ))
            })?;
        Ok(converter.convert(value)?)
    }

    /// Convert through the type-scoped converter for `target`.
    pub fn convert_by_type(
        &self,
        target: ScalarType,
        value: &Value,
    ) -> Result<Value, BeansError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let converter = self.typed.get(&target).ok_or_else(|| {
            BeansError::configuration(format!(
                "no converter registered for type {}",
                target.name()
            ))
        })?;
        Ok(converter.convert(value)?)
    }
}

/// Builder for [`CopyOptions`].
///
/// Repeated pattern calls accumulate; the patterns materialize into
/// converters at [`build`](Self::build) time, and an explicitly registered
/// converter for the same key always wins over pattern-derived ones.
#[derive(Default)]
pub struct CopyOptionsBuilder {
    date_patterns: Vec<String>,
    number_patterns: Vec<String>,
    date_patterns_by_name: HashMap<String, Vec<String>>,
    number_patterns_by_name: HashMap<String, Vec<String>>,
    typed: HashMap<ScalarType, Arc<dyn Converter>>,
    named: HashMap<String, HashMap<ScalarType, Arc<dyn Converter>>>,
    excludes_null: bool,
    includes: HashSet<String>,
    excludes: HashSet<String>,
}

impl CopyOptionsBuilder {
    /// Add a date format pattern for all date-typed properties.
    pub fn date_pattern(self, pattern: impl Into<String>) -> Self {
        self.date_patterns([pattern.into()])
    }

    /// Add date format patterns for all date-typed properties.
    pub fn date_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add a date format pattern for one property.
    pub fn date_pattern_by_name(self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.date_patterns_by_name(name, [pattern.into()])
    }

    /// Add date format patterns for one property.
    pub fn date_patterns_by_name<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_patterns_by_name
            .entry(name.into())
            .or_default()
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add a number format pattern for all number-typed properties.
    pub fn number_pattern(self, pattern: impl Into<String>) -> Self {
        self.number_patterns([pattern.into()])
    }

    /// Add number format patterns for all number-typed properties.
    pub fn number_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.number_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add a number format pattern for one property.
    pub fn number_pattern_by_name(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.number_patterns_by_name(name, [pattern.into()])
    }

    /// Add number format patterns for one property.
    pub fn number_patterns_by_name<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.number_patterns_by_name
            .entry(name.into())
            .or_default()
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Register a converter for a target type.
    pub fn converter(mut self, target: ScalarType, converter: Arc<dyn Converter>) -> Self {
        self.typed.insert(target, converter);
        self
    }

    /// Register a converter for one property and target type.
    pub fn converter_by_name(
        mut self,
        name: impl Into<String>,
        target: ScalarType,
        converter: Arc<dyn Converter>,
    ) -> Self {
        self.named
            .entry(name.into())
            .or_default()
            .insert(target, converter);
        self
    }

    /// Skip properties whose source value is null.
    pub fn excludes_null(mut self) -> Self {
        self.excludes_null = true;
        self
    }

    /// Restrict the copy to the given property names.
    pub fn includes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Exclude the given property names from the copy.
    pub fn excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Materialize the options.
    pub fn build(self) -> CopyOptions {
        let mut typed = self.typed;
        install_pattern_converters(&mut typed, &self.date_patterns, &self.number_patterns);

        let mut named = self.named;
        let property_names: HashSet<&String> = self
            .date_patterns_by_name
            .keys()
            .chain(self.number_patterns_by_name.keys())
            .collect();
        for name in property_names {
            let dates = self
                .date_patterns_by_name
                .get(name)
                .cloned()
                .unwrap_or_default();
            let numbers = self
                .number_patterns_by_name
                .get(name)
                .cloned()
                .unwrap_or_default();
            let entry = named.entry(name.clone()).or_default();
            install_pattern_converters(entry, &dates, &numbers);
        }

        CopyOptions {
            typed,
            named,
            excludes_null: self.excludes_null,
            includes: self.includes,
            excludes: self.excludes,
        }
    }
}

/// The converter set a pattern list stands for: dates install converters
/// for string, date and date-time targets; numbers for string and the
/// number targets. Occupied slots are left alone.
fn install_pattern_converters(
    converters: &mut HashMap<ScalarType, Arc<dyn Converter>>,
    date_patterns: &[String],
    number_patterns: &[String],
) {
    if !date_patterns.is_empty() || !number_patterns.is_empty() {
        converters.entry(ScalarType::Str).or_insert_with(|| {
            Arc::new(StringConverter::with_patterns(
                date_patterns.to_vec(),
                number_patterns.to_vec(),
            ))
        });
    }
    if !date_patterns.is_empty() {
        converters.entry(ScalarType::Date).or_insert_with(|| {
            Arc::new(DateConverter::with_patterns(date_patterns.to_vec()))
        });
        converters.entry(ScalarType::DateTime).or_insert_with(|| {
            Arc::new(DateTimeConverter::with_patterns(date_patterns.to_vec()))
        });
    }
    if !number_patterns.is_empty() {
        converters.entry(ScalarType::I32).or_insert_with(|| {
            Arc::new(IntConverter::with_patterns(
                ScalarType::I32,
                number_patterns.to_vec(),
            ))
        });
        converters.entry(ScalarType::I64).or_insert_with(|| {
            Arc::new(IntConverter::with_patterns(
                ScalarType::I64,
                number_patterns.to_vec(),
            ))
        });
        converters.entry(ScalarType::Decimal).or_insert_with(|| {
            Arc::new(DecimalConverter::with_patterns(number_patterns.to_vec()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::ConversionError;

    struct Upper;

    impl Converter for Upper {
        fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
            match value {
                Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
                other => Err(ConversionError::new(other.to_string(), "string")),
            }
        }
    }

    struct Lower;

    impl Converter for Lower {
        fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
            match value {
                Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
                other => Err(ConversionError::new(other.to_string(), "string")),
            }
        }
    }

    #[test]
    fn later_merge_wins_on_collision() {
        let base = CopyOptions::builder()
            .converter(ScalarType::Str, Arc::new(Upper))
            .build();
        let override_ = CopyOptions::builder()
            .converter(ScalarType::Str, Arc::new(Lower))
            .build();
        let merged = base.merge(&override_);
        assert_eq!(
            merged
                .convert_by_type(ScalarType::Str, &Value::Str("MiXeD".into()))
                .unwrap(),
            Value::Str("mixed".into())
        );
    }

    #[test]
    fn merge_unites_filters_and_ors_null_flag() {
        let a = CopyOptions::builder().includes(["x"]).build();
        let b = CopyOptions::builder().excludes(["y"]).excludes_null().build();
        let merged = a.merge(&b);
        assert!(merged.is_target_property("x"));
        assert!(!merged.is_target_property("y"));
        assert!(!merged.is_target_property("z"));
        assert!(merged.excludes_null());
    }

    #[test]
    fn includes_and_excludes_filter() {
        let options = CopyOptions::builder()
            .includes(["a", "b"])
            .excludes(["b"])
            .build();
        assert!(options.is_target_property("a"));
        assert!(!options.is_target_property("b"));
        assert!(!options.is_target_property("c"));
    }

    #[test]
    fn explicit_converter_beats_pattern() {
        let options = CopyOptions::builder()
            .date_pattern("%Y/%m/%d")
            .converter(ScalarType::Str, Arc::new(Upper))
            .build();
        assert_eq!(
            options
                .convert_by_type(ScalarType::Str, &Value::Str("abc".into()))
                .unwrap(),
            Value::Str("ABC".into())
        );
        assert!(options.has_typed_converter(ScalarType::Date));
    }

    #[test]
    fn date_pattern_installs_date_converters() {
        let options = CopyOptions::builder().date_pattern("%Y/%m/%d").build();
        let converted = options
            .convert_by_type(ScalarType::Date, &Value::Str("2024/03/09".into()))
            .unwrap();
        assert_eq!(
            converted,
            Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
        );
    }

    #[test]
    fn reduce_strips_one_level_of_prefix() {
        let options = CopyOptions::builder()
            .number_pattern_by_name("child.amount", "#,###")
            .includes(["child.amount", "top"])
            .excludes(["child.secret"])
            .excludes_null()
            .build();
        let reduced = options.reduce("child");
        assert!(reduced.has_named_converter("amount", ScalarType::I64));
        assert!(reduced.is_target_property("amount"));
        assert!(!reduced.is_target_property("secret"));
        assert!(reduced.excludes_null());
        assert!(!reduced.has_named_converter("child.amount", ScalarType::I64));
    }

    #[test]
    fn nested_flatten_drops_includes_but_keeps_excludes() {
        let options = CopyOptions::builder()
            .includes(["a"])
            .excludes(["b"])
            .build();
        let nested = options.for_nested_node();
        assert!(nested.is_target_property("anything"));
        assert!(!nested.is_target_property("b"));
    }

    #[test]
    fn missing_named_converter_is_a_configuration_error() {
        let options = CopyOptions::empty();
        let err = options
            .convert_by_name("x", ScalarType::I32, &Value::Str("1".into()))
            .unwrap_err();
        assert!(err.to_string().contains("no converter registered"));
    }
}
