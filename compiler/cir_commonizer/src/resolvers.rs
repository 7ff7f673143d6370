//! Provided-classifier resolvers.
//!
//! A resolver answers "does classifier X exist, and what is it" for one
//! dependency universe. Per target, several universes are chained with
//! [`CompositeProvidedClassifiers`]: the in-progress classifier index of the
//! target, its dependencies, the common dependencies, the fictitious function
//! interfaces and the exported forward declarations.

mod by_modules;
mod classifier_index;
mod composite;
mod fictitious;

use std::sync::Arc;

use cir_ir::{CirEntityId, CirProvidedClassifier};

pub use by_modules::{ProvidedClassifiersByModules, SYNTHETIC_FORWARD_DECLARATION_PACKAGES};
pub use classifier_index::{CirClassifier, CirClassifierIndex};
pub use composite::CompositeProvidedClassifiers;
pub use fictitious::{FictitiousFunctionClassifiers, MAX_FUNCTION_ARITY};

/// One classifier universe. Immutable after construction.
pub trait CirProvidedClassifiers: Send + Sync {
    fn has_classifier(&self, id: &CirEntityId) -> bool;

    fn classifier(&self, id: &CirEntityId) -> Option<Arc<CirProvidedClassifier>>;

    /// Ids of the type aliases whose immediate underlying type is `id`.
    fn find_type_aliases_with_underlying_type(&self, id: &CirEntityId) -> Vec<CirEntityId>;
}

#[cfg(test)]
mod tests;
