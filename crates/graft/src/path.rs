//! Navigation paths into an object graph.
//!
//! A path is a sequence of segments starting at the root object. Each segment
//! is either a property name or an index into a list held by the preceding
//! property. Paths can be built with the builder methods, the [`path!`]
//! macro, or parsed from text such as `$.dept.employees[1].last`.
//!
//! [`path!`]: crate::path!

use crate::{GraftError, GraftResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Property access: `.name`
    Key(String),
    /// List element access: `[index]`
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path from a root object to a leaf value.
///
/// # Examples
///
/// ```
/// use graft::Path;
///
/// let path = Path::root().key("dept").key("employees").index(1);
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "$.dept.employees[1]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// The first `len` segments of this path.
    #[inline]
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }

    /// Parse a textual path.
    ///
    /// Accepts an optional `$` root marker followed by `.name` and `[n]`
    /// segments; the leading dot may be omitted when there is no marker.
    /// The error names the text up to and including the node that could not
    /// be parsed.
    ///
    /// ```
    /// use graft::Path;
    ///
    /// let a = Path::parse("dept.employees[1].last").unwrap();
    /// let b = Path::parse("$.dept.employees[1].last").unwrap();
    /// assert_eq!(a, b);
    /// assert!(Path::parse("dept..last").is_err());
    /// ```
    pub fn parse(text: &str) -> GraftResult<Path> {
        let text = text.trim();
        let bytes = text.as_bytes();
        let mut path = Path::root();
        let mut pos = 0;

        if bytes.first() == Some(&b'$') {
            pos = 1;
        } else if !bytes.is_empty() && bytes[0] != b'[' {
            // Bare leading property without a dot.
            pos = parse_key(text, pos, &mut path)?;
        }

        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => pos = parse_key(text, pos + 1, &mut path)?,
                b'[' => {
                    let close = text[pos..].find(']').map(|i| pos + i).ok_or_else(|| {
                        GraftError::unsupported_path(text, "unterminated index")
                    })?;
                    let digits = &text[pos + 1..close];
                    let index = digits.trim().parse::<usize>().map_err(|_| {
                        GraftError::unsupported_path(
                            &text[..=close],
                            "index must be a non-negative integer constant",
                        )
                    })?;
                    path.push(Seg::Index(index));
                    pos = close + 1;
                }
                _ => {
                    let width = text[pos..].chars().next().map_or(1, char::len_utf8);
                    return Err(GraftError::unsupported_path(
                        &text[..pos + width],
                        "expected '.' or '['",
                    ));
                }
            }
        }

        Ok(path)
    }
}

/// Parse one property name starting at `start`, returning the position after it.
fn parse_key(text: &str, start: usize, path: &mut Path) -> GraftResult<usize> {
    let rest = &text[start..];
    let len = rest.find(['.', '[']).unwrap_or(rest.len());
    let key = &rest[..len];
    let end = start + len;

    if key.is_empty() {
        return Err(GraftError::unsupported_path(
            &text[..end],
            "empty property name",
        ));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(GraftError::unsupported_path(
            &text[..end],
            format!("'{}' is not a property name", key),
        ));
    }

    path.push(Seg::Key(key.to_owned()));
    Ok(end)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = GraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Anything the engine accepts as a path argument.
pub trait IntoPath {
    /// Convert into a [`Path`], parsing text if needed.
    fn into_path(self) -> GraftResult<Path>;
}

impl IntoPath for Path {
    fn into_path(self) -> GraftResult<Path> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> GraftResult<Path> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> GraftResult<Path> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> GraftResult<Path> {
        Path::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> GraftResult<Path> {
        Path::parse(self)
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// # Examples
///
/// ```
/// use graft::path;
///
/// // String literals become Key segments
/// let p = path!("dept", "manager", "first");
///
/// // Numbers become Index segments, evaluated eagerly
/// let i = 2;
/// let p = path!("employees", i, "last");
/// assert_eq!(p.to_string(), "$.employees[2].last");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::path!(@seg $seg));
        )+
        p
    }};
    (@seg $seg:expr) => {
        $crate::Seg::from($seg)
    };
}
