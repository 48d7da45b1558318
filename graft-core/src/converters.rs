//! The default converters.
//!
//! Coercion rules follow the form-input conventions the engine is built
//! around: strings are the universal source representation, a single-element
//! string array stands in for its one string, and empty strings mean "not
//! entered" for booleans. Date and number converters optionally carry format
//! patterns; the pattern-bearing variants are what the copy-option builders
//! install.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::convert::Converter;
use crate::error::ConversionError;
use crate::scalar::ScalarType;
use crate::value::Value;

const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";
const DEFAULT_DATETIME_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn mismatch(value: &Value, target: ScalarType) -> ConversionError {
    ConversionError::new(value.to_string(), target.name())
}

/// Unwrap a single-element string array; more than one element is an error.
fn single(values: &[String], target: ScalarType) -> Result<&str, ConversionError> {
    match values {
        [only] => Ok(only),
        _ => Err(ConversionError::new(
            format!("[{}]", values.join(", ")),
            target.name(),
        )),
    }
}

/// Parse an integer, honoring number patterns.
///
/// A pattern containing a grouping comma permits grouped input; patterns are
/// tried in order and the last failure wins, as the pattern loop of the
/// original number converters behaves.
fn parse_int(s: &str, patterns: &[String], target: ScalarType) -> Result<i64, ConversionError> {
    if patterns.is_empty() {
        return s
            .parse::<i64>()
            .map_err(|e| ConversionError::new(s, target.name()).with_source(e));
    }
    let mut last_err = None;
    for pattern in patterns {
        let candidate = if pattern.contains(',') {
            s.replace(',', "")
        } else {
            s.to_owned()
        };
        match candidate.parse::<i64>() {
            Ok(v) => return Ok(v),
            Err(e) => last_err = Some(e),
        }
    }
    let err = ConversionError::new(s, target.name());
    Err(match last_err {
        Some(cause) => err.with_source(cause),
        None => err,
    })
}

fn parse_decimal(s: &str, patterns: &[String]) -> Result<Decimal, ConversionError> {
    if patterns.is_empty() {
        return s
            .parse::<Decimal>()
            .map_err(|e| ConversionError::new(s, ScalarType::Decimal.name()).with_source(e));
    }
    let mut last_err = None;
    for pattern in patterns {
        let candidate = if pattern.contains(',') {
            s.replace(',', "")
        } else {
            s.to_owned()
        };
        match candidate.parse::<Decimal>() {
            Ok(v) => return Ok(v),
            Err(e) => last_err = Some(e),
        }
    }
    let err = ConversionError::new(s, ScalarType::Decimal.name());
    Err(match last_err {
        Some(cause) => err.with_source(cause),
        None => err,
    })
}

/// Insert grouping separators every three digits of the integer part.
fn group_digits(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3);
    grouped.push_str(sign);
    let digits: Vec<char> = int_part.chars().collect();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// `true`, `on` and `1` (case-insensitive) are true; other strings are
/// false; the empty string is "not entered" and converts to `Null`.
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Bool(v) => Ok(Value::Bool(*v)),
            Value::Str(s) => {
                if s.is_empty() {
                    return Ok(Value::Null);
                }
                let truthy = s.eq_ignore_ascii_case("true")
                    || s.eq_ignore_ascii_case("on")
                    || s == "1";
                Ok(Value::Bool(truthy))
            }
            Value::I16(v) => Ok(Value::Bool(*v != 0)),
            Value::I32(v) => Ok(Value::Bool(*v != 0)),
            Value::I64(v) => Ok(Value::Bool(*v != 0)),
            Value::Decimal(v) => Ok(Value::Bool(!v.is_zero())),
            Value::StrArray(values) => {
                let only = single(values, ScalarType::Bool)?;
                self.convert(&Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, ScalarType::Bool)),
        }
    }
}

/// Fixed-width integer conversion with range checking.
pub struct IntConverter {
    target: ScalarType,
    patterns: Vec<String>,
}

impl IntConverter {
    /// A pattern-less converter for `target` (one of the integer types).
    pub fn new(target: ScalarType) -> Self {
        IntConverter {
            target,
            patterns: Vec::new(),
        }
    }

    /// A converter that additionally accepts the given number patterns.
    pub fn with_patterns(target: ScalarType, patterns: Vec<String>) -> Self {
        IntConverter { target, patterns }
    }

    fn place(&self, wide: i64, source: &Value) -> Result<Value, ConversionError> {
        match self.target {
            ScalarType::I16 => i16::try_from(wide)
                .map(Value::I16)
                .map_err(|_| mismatch(source, self.target)),
            ScalarType::I32 => i32::try_from(wide)
                .map(Value::I32)
                .map_err(|_| mismatch(source, self.target)),
            _ => Ok(Value::I64(wide)),
        }
    }
}

impl Converter for IntConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::I16(v) => self.place(i64::from(*v), value),
            Value::I32(v) => self.place(i64::from(*v), value),
            Value::I64(v) => self.place(*v, value),
            Value::Bool(v) => self.place(i64::from(*v), value),
            Value::Decimal(v) => {
                let wide = v.trunc().to_i64().ok_or_else(|| mismatch(value, self.target))?;
                self.place(wide, value)
            }
            Value::Str(s) => {
                let wide = parse_int(s, &self.patterns, self.target)?;
                self.place(wide, value)
            }
            Value::StrArray(values) => {
                let only = single(values, self.target)?;
                self.convert(&Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, self.target)),
        }
    }
}

/// Arbitrary-precision decimal conversion.
pub struct DecimalConverter {
    patterns: Vec<String>,
}

impl DecimalConverter {
    /// A pattern-less converter.
    pub fn new() -> Self {
        DecimalConverter {
            patterns: Vec::new(),
        }
    }

    /// A converter that additionally accepts the given number patterns.
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        DecimalConverter { patterns }
    }
}

impl Default for DecimalConverter {
    fn default() -> Self {
        DecimalConverter::new()
    }
}

impl Converter for DecimalConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Decimal(v) => Ok(Value::Decimal(*v)),
            Value::I16(v) => Ok(Value::Decimal(Decimal::from(*v))),
            Value::I32(v) => Ok(Value::Decimal(Decimal::from(*v))),
            Value::I64(v) => Ok(Value::Decimal(Decimal::from(*v))),
            Value::Bool(v) => Ok(Value::Decimal(Decimal::from(i64::from(*v)))),
            Value::Str(s) => Ok(Value::Decimal(parse_decimal(s, &self.patterns)?)),
            Value::StrArray(values) => {
                let only = single(values, ScalarType::Decimal)?;
                self.convert(&Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, ScalarType::Decimal)),
        }
    }
}

/// Conversion to `String`. Dates and numbers format through the configured
/// patterns when present.
pub struct StringConverter {
    date_patterns: Vec<String>,
    number_patterns: Vec<String>,
}

impl StringConverter {
    /// A converter with default formatting.
    pub fn new() -> Self {
        StringConverter {
            date_patterns: Vec::new(),
            number_patterns: Vec::new(),
        }
    }

    /// A converter that formats dates with the first of `patterns`.
    pub fn with_date_patterns(patterns: Vec<String>) -> Self {
        StringConverter {
            date_patterns: patterns,
            number_patterns: Vec::new(),
        }
    }

    /// A converter that formats numbers with grouping when the first of
    /// `patterns` asks for it.
    pub fn with_number_patterns(patterns: Vec<String>) -> Self {
        StringConverter {
            date_patterns: Vec::new(),
            number_patterns: patterns,
        }
    }

    /// A converter carrying both date and number patterns.
    pub fn with_patterns(date_patterns: Vec<String>, number_patterns: Vec<String>) -> Self {
        StringConverter {
            date_patterns,
            number_patterns,
        }
    }

    fn format_number(&self, plain: String) -> String {
        match self.number_patterns.first() {
            Some(pattern) if pattern.contains(',') => group_digits(&plain),
            _ => plain,
        }
    }
}

impl Default for StringConverter {
    fn default() -> Self {
        StringConverter::new()
    }
}

impl Converter for StringConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            Value::Bool(v) => Ok(Value::Str(v.to_string())),
            Value::I16(v) => Ok(Value::Str(self.format_number(v.to_string()))),
            Value::I32(v) => Ok(Value::Str(self.format_number(v.to_string()))),
            Value::I64(v) => Ok(Value::Str(self.format_number(v.to_string()))),
            Value::Decimal(v) => Ok(Value::Str(self.format_number(v.to_string()))),
            Value::Date(d) => {
                let pattern = self
                    .date_patterns
                    .first()
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_DATE_PATTERN);
                Ok(Value::Str(d.format(pattern).to_string()))
            }
            Value::DateTime(dt) => {
                let pattern = self
                    .date_patterns
                    .first()
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_DATETIME_PATTERNS[0]);
                Ok(Value::Str(dt.format(pattern).to_string()))
            }
            Value::StrArray(values) => {
                let only = single(values, ScalarType::Str)?;
                Ok(Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, ScalarType::Str)),
        }
    }
}

/// Conversion to a string array. A lone string wraps to one element.
pub struct StrArrayConverter;

impl Converter for StrArrayConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::StrArray(values) => Ok(Value::StrArray(values.clone())),
            Value::Str(s) => Ok(Value::StrArray(vec![s.clone()])),
            Value::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::Str(s) => values.push(s.clone()),
                        other => return Err(mismatch(other, ScalarType::StrArray)),
                    }
                }
                Ok(Value::StrArray(values))
            }
            other => Err(mismatch(other, ScalarType::StrArray)),
        }
    }
}

/// Bytes convert only from bytes.
pub struct BytesConverter;

impl Converter for BytesConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Bytes(bytes) => Ok(Value::Bytes(bytes.clone())),
            other => Err(mismatch(other, ScalarType::Bytes)),
        }
    }
}

/// Conversion to a calendar date.
pub struct DateConverter {
    patterns: Vec<String>,
}

impl DateConverter {
    /// A converter parsing the default ISO date pattern.
    pub fn new() -> Self {
        DateConverter {
            patterns: Vec::new(),
        }
    }

    /// A converter parsing the given patterns, tried in order.
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        DateConverter { patterns }
    }

    fn parse(&self, s: &str) -> Result<NaiveDate, ConversionError> {
        let mut last_err = None;
        let defaults = [DEFAULT_DATE_PATTERN.to_owned()];
        let patterns: &[String] = if self.patterns.is_empty() {
            &defaults
        } else {
            &self.patterns
        };
        for pattern in patterns {
            match NaiveDate::parse_from_str(s, pattern) {
                Ok(d) => return Ok(d),
                Err(e) => last_err = Some(e),
            }
        }
        let err = ConversionError::new(s, ScalarType::Date.name());
        Err(match last_err {
            Some(cause) => err.with_source(cause),
            None => err,
        })
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        DateConverter::new()
    }
}

impl Converter for DateConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Date(d) => Ok(Value::Date(*d)),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            Value::Str(s) => Ok(Value::Date(self.parse(s)?)),
            Value::StrArray(values) => {
                let only = single(values, ScalarType::Date)?;
                self.convert(&Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, ScalarType::Date)),
        }
    }
}

/// Conversion to a date-time. A bare date gets midnight.
pub struct DateTimeConverter {
    patterns: Vec<String>,
}

impl DateTimeConverter {
    /// A converter parsing the default ISO date-time patterns.
    pub fn new() -> Self {
        DateTimeConverter {
            patterns: Vec::new(),
        }
    }

    /// A converter parsing the given patterns, tried in order.
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        DateTimeConverter { patterns }
    }

    fn parse(&self, s: &str) -> Result<NaiveDateTime, ConversionError> {
        let mut last_err = None;
        let defaults: Vec<String> = DEFAULT_DATETIME_PATTERNS
            .iter()
            .map(|p| (*p).to_owned())
            .collect();
        let patterns: &[String] = if self.patterns.is_empty() {
            &defaults
        } else {
            &self.patterns
        };
        for pattern in patterns {
            match NaiveDateTime::parse_from_str(s, pattern) {
                Ok(dt) => return Ok(dt),
                Err(e) => last_err = Some(e),
            }
        }
        let err = ConversionError::new(s, ScalarType::DateTime.name());
        Err(match last_err {
            Some(cause) => err.with_source(cause),
            None => err,
        })
    }
}

impl Default for DateTimeConverter {
    fn default() -> Self {
        DateTimeConverter::new()
    }
}

impl Converter for DateTimeConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
            Value::Str(s) => Ok(Value::DateTime(self.parse(s)?)),
            Value::StrArray(values) => {
                let only = single(values, ScalarType::DateTime)?;
                self.convert(&Value::Str(only.to_owned()))
            }
            other => Err(mismatch(other, ScalarType::DateTime)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bool_string_forms() {
        let c = BoolConverter;
        assert_eq!(c.convert(&Value::Str("true".into())).unwrap(), Value::Bool(true));
        assert_eq!(c.convert(&Value::Str("ON".into())).unwrap(), Value::Bool(true));
        assert_eq!(c.convert(&Value::Str("1".into())).unwrap(), Value::Bool(true));
        assert_eq!(c.convert(&Value::Str("yes".into())).unwrap(), Value::Bool(false));
        assert_eq!(c.convert(&Value::Str("".into())).unwrap(), Value::Null);
        assert_eq!(c.convert(&Value::I32(2)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn single_element_array_unwraps() {
        let c = IntConverter::new(ScalarType::I32);
        assert_eq!(
            c.convert(&Value::StrArray(vec!["41".into()])).unwrap(),
            Value::I32(41)
        );
        let err = c
            .convert(&Value::StrArray(vec!["1".into(), "2".into()]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Can't convert [1, 2] to i32.");
    }

    #[test]
    fn int_range_is_checked() {
        let c = IntConverter::new(ScalarType::I16);
        assert!(c.convert(&Value::I32(100_000)).is_err());
        assert_eq!(c.convert(&Value::I32(7)).unwrap(), Value::I16(7));
    }

    #[test]
    fn grouped_numbers_parse_only_with_a_grouping_pattern() {
        let plain = IntConverter::new(ScalarType::I64);
        assert!(plain.convert(&Value::Str("1,234".into())).is_err());
        let grouped = IntConverter::with_patterns(ScalarType::I64, vec!["#,###".into()]);
        assert_eq!(
            grouped.convert(&Value::Str("1,234".into())).unwrap(),
            Value::I64(1234)
        );
    }

    #[test]
    fn decimal_truncates_into_integers() {
        let c = IntConverter::new(ScalarType::I32);
        let d: Decimal = "12.9".parse().unwrap();
        assert_eq!(c.convert(&Value::Decimal(d)).unwrap(), Value::I32(12));
    }

    #[test]
    fn string_formats_dates_with_patterns() {
        let c = StringConverter::with_date_patterns(vec!["%Y/%m/%d".into()]);
        assert_eq!(
            c.convert(&Value::Date(date(2024, 3, 9))).unwrap(),
            Value::Str("2024/03/09".into())
        );
    }

    #[test]
    fn string_groups_numbers_with_patterns() {
        let c = StringConverter::with_number_patterns(vec!["#,###".into()]);
        assert_eq!(
            c.convert(&Value::I64(1234567)).unwrap(),
            Value::Str("1,234,567".into())
        );
        assert_eq!(
            c.convert(&Value::I32(-1234)).unwrap(),
            Value::Str("-1,234".into())
        );
    }

    #[test]
    fn date_patterns_try_in_order() {
        let c = DateConverter::with_patterns(vec!["%Y/%m/%d".into(), "%d.%m.%Y".into()]);
        assert_eq!(
            c.convert(&Value::Str("09.03.2024".into())).unwrap(),
            Value::Date(date(2024, 3, 9))
        );
        assert!(c.convert(&Value::Str("2024-03-09".into())).is_err());
    }

    #[test]
    fn datetime_accepts_both_default_separators() {
        let c = DateTimeConverter::new();
        let expected = date(2024, 3, 9).and_hms_opt(10, 20, 30).unwrap();
        assert_eq!(
            c.convert(&Value::Str("2024-03-09T10:20:30".into())).unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            c.convert(&Value::Str("2024-03-09 10:20:30".into())).unwrap(),
            Value::DateTime(expected)
        );
    }

    #[test]
    fn date_from_datetime_drops_the_time() {
        let c = DateConverter::new();
        let dt = date(2024, 3, 9).and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(c.convert(&Value::DateTime(dt)).unwrap(), Value::Date(date(2024, 3, 9)));
    }
}
