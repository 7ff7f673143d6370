//! Commonization targets.
//!
//! A run commonizes N leaf targets (e.g. `linux_x64`, `macos_arm64`). The
//! common result belongs to the shared target made of all of them.

use std::collections::BTreeSet;
use std::fmt;

/// One platform target, or the shared target of several leaves.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommonizerTarget {
    /// A single platform.
    Leaf(String),
    /// The union of several leaf targets.
    Shared(BTreeSet<String>),
}

impl CommonizerTarget {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf(name.into())
    }

    /// Shared target over the leaves of all `targets`.
    pub fn shared<'a>(targets: impl IntoIterator<Item = &'a CommonizerTarget>) -> Self {
        let mut leaves = BTreeSet::new();
        for target in targets {
            leaves.extend(target.leaves().map(str::to_owned));
        }
        Self::Shared(leaves)
    }

    /// Names of the leaf targets covered by this target.
    pub fn leaves(&self) -> impl Iterator<Item = &str> {
        let (single, many) = match self {
            Self::Leaf(name) => (Some(name.as_str()), None),
            Self::Shared(leaves) => (None, Some(leaves.iter().map(String::as_str))),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

impl fmt::Display for CommonizerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(name) => f.write_str(name),
            Self::Shared(leaves) => {
                f.write_str("(")?;
                for (i, leaf) in leaves.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(leaf)?;
                }
                f.write_str(")")
            }
        }
    }
}
