//! # Paths
//!
//! A [`Path`] addresses one node in a value tree as an ordered list of
//! segments (hash keys and array indices). Errors carry a path so callers
//! can point at the exact offending input.
//!
//! ## Renderings
//!
//! | Rendering | `Path(foo, bar_baz, 42, qux)` |
//! |-----------|-------------------------------|
//! | [`Path::to_json_pointer`] | `/foo/bar_baz/42/qux` |
//! | [`Path::to_dot_notation`] | `foo.bar_baz.42.qux` |
//! | `Display` | `foo.bar_baz[42].qux` |
//!
//! The casing policy, when present, is applied to named segments only and
//! never to indices. The root path renders as `/` in pointer notation and
//! as the empty string otherwise.

use std::ops::Add;

use crate::casing::Casing;
use crate::value::Key;

/// One segment of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Name(String),
    Index(usize),
}

impl Segment {
    fn render(&self, casing: Option<Casing>) -> String {
        match self {
            Segment::Name(n) => Casing::apply_opt(casing, n),
            Segment::Index(i) => i.to_string(),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Name(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Name(s)
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i)
    }
}

/// An immutable location in a value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
    casing: Option<Casing>,
}

impl Path {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            casing: None,
        }
    }

    /// Replace the casing policy used when rendering.
    pub fn with_casing(mut self, casing: Option<Casing>) -> Self {
        self.casing = casing;
        self
    }

    pub fn casing(&self) -> Option<Casing> {
        self.casing
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path with `key` appended. The root key appends nothing.
    pub fn join(&self, key: &Key) -> Path {
        let mut next = self.clone();
        match key {
            Key::Root => {}
            Key::Name(n) => next.segments.push(Segment::Name(n.clone())),
            Key::Index(i) => next.segments.push(Segment::Index(*i)),
        }
        next
    }

    pub fn to_json_pointer(&self) -> String {
        let mut out = String::from("/");
        out.push_str(
            &self
                .segments
                .iter()
                .map(|s| s.render(self.casing))
                .collect::<Vec<_>>()
                .join("/"),
        );
        out
    }

    pub fn to_dot_notation(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.render(self.casing))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Index(i) => out.push_str(&format!("[{i}]")),
                Segment::Name(_) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&segment.render(self.casing));
                }
            }
        }
        f.write_str(&out)
    }
}

impl Add<&Path> for &Path {
    type Output = Path;

    /// Concatenate, keeping the left-hand casing.
    fn add(self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path {
            segments,
            casing: self.casing,
        }
    }
}

impl Add<Option<&Path>> for &Path {
    type Output = Path;

    fn add(self, other: Option<&Path>) -> Path {
        match other {
            Some(p) => self + p,
            None => self.clone(),
        }
    }
}
