//! Core of the multiplatform library commonizer.
//!
//! Given the declarations of one library compiled for several leaf targets,
//! the commonizer computes the declarations valid for all of them:
//!
//! - [`CirTreeMerger`] folds per-target inputs into a [`CirTree`], one node
//!   per declaration with one slot per target.
//! - Callables are matched across targets by approximation keys
//!   ([`FunctionApproximationKey`] and friends).
//! - Each node commonizes lazily, at most once, through
//!   [`CirClassNode::common_declaration`] and its siblings, or eagerly via
//!   [`CirTree::commonize_all`].
//! - Types that name different classifiers per target are unified through
//!   [`type_distance`] over the [`CirKnownClassifiers`].
//!
//! Enable logging with `RUST_LOG=cir_commonizer=debug` after calling
//! [`init_tracing`].

mod approximation;
mod classifiers;
mod commonizer;
mod error;
mod input;
mod merger;
pub mod resolvers;
mod settings;
mod tree;
mod type_distance;

use std::sync::Once;

pub use approximation::{
    interop_fingerprint, ConstructorApproximationKey, CirTypeSignature,
    FunctionApproximationKey, PropertyApproximationKey, SignatureBuildingContext,
    OBJC_INTEROP_ANNOTATIONS,
};
pub use classifiers::{AssociatedClassifierIdsResolver, CirKnownClassifiers};
pub use error::{ClassifierNodeKind, CommonizerError};
pub use input::{CirClassInput, CirModuleInput, CirPackageInput, CirTargetInput};
pub use merger::CirTreeMerger;
pub use resolvers::{
    CirClassifier, CirClassifierIndex, CirProvidedClassifiers, CompositeProvidedClassifiers,
    FictitiousFunctionClassifiers, ProvidedClassifiersByModules,
};
pub use settings::CommonizerSettings;
pub use tree::visitor::{walk_class, walk_module, walk_package, walk_root, CirNodeVisitor};
pub use tree::{
    CirClassConstructorNode, CirClassNode, CirClassifierNodeId, CirFunctionNode, CirModuleNode,
    CirNode, CirNodeArena, CirPackageNode, CirPropertyNode, CirRootNode, CirTree,
    CirTypeAliasNode, ClassNodeId, TypeAliasNodeId,
};
pub use type_distance::{
    backward_type_distance, forward_type_distance, type_distance, CirTypeDistance,
    CirTypeDistancePenalty,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=cir_commonizer=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
