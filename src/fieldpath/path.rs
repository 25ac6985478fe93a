//! Dotted path type.

use std::fmt;

/// Path represents a dotted address into a nested tree.
///
/// Each segment addresses one level of nesting. A segment that is a canonical
/// decimal number addresses a list index; every segment addresses a map key.
/// The root path has no segments and renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Creates the root path.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    /// Splits a dotted string into a path.
    ///
    /// Every string has at least one segment: `""` is a path to the
    /// empty-named key, not the root.
    pub fn parse(dotted: &str) -> Self {
        Path {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    /// Creates a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Removes and returns the last segment.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Creates a new path with the given segment appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Returns true if `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl From<&str> for Path {
    fn from(dotted: &str) -> Self {
        Path::parse(dotted)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Returns true if the segment consists only of ASCII digits.
pub fn is_numeric_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a segment as a list index.
///
/// Only canonical decimal forms are indices: `"0"` and `"12"` are, `"012"`,
/// `"+1"` and `""` are not.
pub fn parse_index(segment: &str) -> Option<usize> {
    if !is_numeric_segment(segment) || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    segment.parse().ok()
}
