//! Interned names, package names and fully-qualified entity ids.
//!
//! `CirEntityId` is the universal key for classifiers across targets,
//! resolvers and the merge tree. Its textual form follows the metadata
//! class-name format: package segments separated by `/`, nested class names
//! separated by `.` (e.g. `kotlin/collections/Map.Entry`).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::interner::{interner, MAX_LOCAL, NUM_SHARDS};

/// Interned simple name.
///
/// Layout: shard (4 bits) + local index (28 bits), like every interned
/// handle in this workspace. Equality and hashing use the raw index;
/// ordering uses the text so that sorted containers are stable across runs.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct CirName(u32);

impl CirName {
    /// Pre-interned empty name.
    pub const EMPTY: CirName = CirName(0);

    /// Intern `s` and return its name.
    ///
    /// # Panics
    /// Panics if an interner shard overflows (over 268 million names).
    pub fn create(s: &str) -> Self {
        match interner().try_intern(s) {
            Ok((shard, local)) => Self::from_shard_local(shard, local),
            Err(e) => panic!("{e}"),
        }
    }

    #[inline]
    const fn from_shard_local(shard: u32, local: u32) -> Self {
        debug_assert!((shard as usize) < NUM_SHARDS);
        debug_assert!(local <= MAX_LOCAL);
        CirName((shard << 28) | local)
    }

    /// The interned text.
    pub fn as_str(self) -> &'static str {
        interner().lookup((self.0 >> 28) as usize, (self.0 & MAX_LOCAL) as usize)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Hash for CirName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Ord for CirName {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.as_str().cmp(other.as_str())
        }
    }
}

impl PartialOrd for CirName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for CirName {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for CirName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CirName({})", self.as_str())
    }
}

impl fmt::Display for CirName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CirName {
    fn from(s: &str) -> Self {
        Self::create(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CirName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CirName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(Self::create(&s))
    }
}

/// Dot-separated package name. The root package has no segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirPackageName {
    segments: SmallVec<[CirName; 4]>,
}

impl CirPackageName {
    /// The root (unnamed) package.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a package name. Accepts both `.` and `/` as separators.
    pub fn create(fq_name: &str) -> Self {
        let segments = fq_name
            .split(['.', '/'])
            .filter(|segment| !segment.is_empty())
            .map(CirName::create)
            .collect();
        Self { segments }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = CirName>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    pub fn segments(&self) -> &[CirName] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` equals `prefix` or is nested inside it.
    pub fn starts_with(&self, prefix: &CirPackageName) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Render with `separator` between segments.
    pub fn to_string_with(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(segment.as_str());
        }
        out
    }
}

impl fmt::Debug for CirPackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CirPackageName({self})")
    }
}

impl fmt::Display for CirPackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with('.'))
    }
}

/// Fully-qualified classifier identity.
///
/// Invariant: `relative_name_segments` is never empty. The last segment is
/// the simple name; the preceding ones name the enclosing classes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirEntityId {
    package_name: CirPackageName,
    relative_name_segments: SmallVec<[CirName; 2]>,
}

impl CirEntityId {
    /// Id of a top-level classifier.
    pub fn create(package_name: CirPackageName, name: CirName) -> Self {
        let mut relative_name_segments = SmallVec::new();
        relative_name_segments.push(name);
        Self {
            package_name,
            relative_name_segments,
        }
    }

    /// Id with an explicit chain of enclosing class names.
    ///
    /// Returns `None` if `relative_name_segments` is empty.
    pub fn create_relative(
        package_name: CirPackageName,
        relative_name_segments: impl IntoIterator<Item = CirName>,
    ) -> Option<Self> {
        let relative_name_segments: SmallVec<[CirName; 2]> =
            relative_name_segments.into_iter().collect();
        if relative_name_segments.is_empty() {
            return None;
        }
        Some(Self {
            package_name,
            relative_name_segments,
        })
    }

    /// Parse the metadata class-name format, e.g. `kotlin/collections/Map.Entry`.
    ///
    /// Returns `None` for an empty class name.
    pub fn parse(class_name: &str) -> Option<Self> {
        let (package, relative) = match class_name.rfind('/') {
            Some(slash) => (&class_name[..slash], &class_name[slash + 1..]),
            None => ("", class_name),
        };
        Self::create_relative(
            CirPackageName::create(package),
            relative
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(CirName::create),
        )
    }

    /// Id of a class nested directly inside `self`.
    #[must_use]
    pub fn create_nested(&self, name: CirName) -> Self {
        let mut nested = self.clone();
        nested.relative_name_segments.push(name);
        nested
    }

    pub fn package_name(&self) -> &CirPackageName {
        &self.package_name
    }

    pub fn relative_name_segments(&self) -> &[CirName] {
        &self.relative_name_segments
    }

    /// The last relative segment.
    pub fn simple_name(&self) -> CirName {
        self.relative_name_segments
            .last()
            .copied()
            .unwrap_or(CirName::EMPTY)
    }

    pub fn is_nested(&self) -> bool {
        self.relative_name_segments.len() > 1
    }

    /// Id of the directly enclosing class, if this id is nested.
    pub fn outer_class_id(&self) -> Option<Self> {
        if !self.is_nested() {
            return None;
        }
        let mut outer = self.clone();
        outer.relative_name_segments.pop();
        Some(outer)
    }

    /// The same relative name moved into another package.
    #[must_use]
    pub fn with_package(&self, package_name: CirPackageName) -> Self {
        Self {
            package_name,
            relative_name_segments: self.relative_name_segments.clone(),
        }
    }
}

impl fmt::Debug for CirEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CirEntityId({self})")
    }
}

impl fmt::Display for CirEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package_name.is_root() {
            f.write_str(&self.package_name.to_string_with('/'))?;
            f.write_str("/")?;
        }
        for (i, segment) in self.relative_name_segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
