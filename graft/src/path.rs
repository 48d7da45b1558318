//! Dotted, indexed property paths: `a.b[2].c`.

use std::fmt;
use std::str::FromStr;

use graft_core::BeansError;

/// One step of a [`PropertyPath`]: a property name, optionally indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    name: String,
    index: Option<usize>,
}

impl Segment {
    /// The property name, without any index suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The list index, if the segment was written `name[i]`.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Does this segment address a list element?
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// The segment as written: `name` or `name[i]`.
    pub fn raw(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{}]", self.name, i),
            None => self.name.clone(),
        }
    }

    fn parse(text: &str) -> Segment {
        // Only `name[digits]` is an index; anything else is a literal name.
        if let Some(rest) = text.strip_suffix(']') {
            if let Some((name, digits)) = rest.rsplit_once('[') {
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(index) = digits.parse::<usize>() {
                        return Segment {
                            name: name.to_owned(),
                            index: Some(index),
                        };
                    }
                }
            }
        }
        Segment {
            name: text.to_owned(),
            index: None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        Ok(())
    }
}

/// A parsed property path.
///
/// Immutable; consumed front to back with [`PropertyPath::rest`]. `Display`
/// reproduces the source text, so parsing round-trips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<Segment>,
    raw: String,
}

impl PropertyPath {
    /// Parse a path. Empty or blank input, and empty segments such as the
    /// middle of `a..b`, are invalid.
    pub fn parse(expr: &str) -> Result<Self, BeansError> {
        if expr.trim().is_empty() {
            return Err(BeansError::InvalidPath {
                expr: expr.to_owned(),
            });
        }
        let mut segments = Vec::new();
        for part in expr.split('.') {
            if part.is_empty() {
                return Err(BeansError::InvalidPath {
                    expr: expr.to_owned(),
                });
            }
            segments.push(Segment::parse(part));
        }
        Ok(PropertyPath {
            segments,
            raw: expr.to_owned(),
        })
    }

    /// The first segment.
    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }

    /// Does the path consist of a single segment?
    pub fn is_leaf(&self) -> bool {
        self.segments.len() == 1
    }

    /// Does the path continue past the first segment?
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The path without its first segment.
    ///
    /// # Panics
    ///
    /// Panics when called on a leaf path; check [`is_nested`](Self::is_nested)
    /// first.
    pub fn rest(&self) -> PropertyPath {
        assert!(self.is_nested(), "rest() called on a leaf path");
        let raw = match self.raw.split_once('.') {
            Some((_, rest)) => rest.to_owned(),
            None => String::new(),
        };
        PropertyPath {
            segments: self.segments[1..].to_vec(),
            raw,
        }
    }

    /// The path as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All segments, front to back.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PropertyPath {
    type Err = BeansError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_and_indexed_segments() {
        let path = PropertyPath::parse("a.b[2].c").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.root().name(), "a");
        assert!(!path.root().is_indexed());
        let rest = path.rest();
        assert_eq!(rest.root().name(), "b");
        assert_eq!(rest.root().index(), Some(2));
        assert_eq!(rest.rest().root().name(), "c");
    }

    #[test]
    fn display_round_trips() {
        for expr in ["a", "a.b", "items[0]", "a.b[2].c"] {
            let path = PropertyPath::parse(expr).unwrap();
            assert_eq!(path.to_string(), expr);
            assert_eq!(PropertyPath::parse(&path.to_string()).unwrap(), path);
        }
    }

    #[test]
    fn malformed_index_is_a_literal_name() {
        let path = PropertyPath::parse("a[x]").unwrap();
        assert_eq!(path.root().name(), "a[x]");
        assert!(!path.root().is_indexed());
    }

    #[test]
    fn blank_and_empty_segments_are_invalid() {
        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse("   ").is_err());
        assert!(PropertyPath::parse("a..b").is_err());
        assert!(PropertyPath::parse(".a").is_err());
    }

    #[test]
    #[should_panic]
    fn rest_of_a_leaf_panics() {
        let path = PropertyPath::parse("a").unwrap();
        let _ = path.rest();
    }
}
