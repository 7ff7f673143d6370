//! Commonizer errors.
//!
//! Only structural failures of a run are errors. Unreachable type distances,
//! missing classifiers and declarations that do not commonize are ordinary
//! values (`CirTypeDistance::UNREACHABLE`, `None`).

use std::fmt;

use cir_ir::metadata::ModuleLoadError;
use cir_ir::CirEntityId;

/// Kind of a classifier node in the merge tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassifierNodeKind {
    Class,
    TypeAlias,
}

impl fmt::Display for ClassifierNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::TypeAlias => "type alias",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommonizerError {
    /// A classifier id was registered twice and is not an allowed duplicate.
    #[error("duplicate {kind} node for `{id}`")]
    DuplicateClassifierNode {
        kind: ClassifierNodeKind,
        id: CirEntityId,
    },

    #[error("failed to load module `{module}`")]
    ModuleLoad {
        module: String,
        #[source]
        source: ModuleLoadError,
    },

    /// Per-target inputs do not match the configured targets.
    #[error("expected {expected} targets, found {found}")]
    TargetCountMismatch { expected: usize, found: usize },
}
