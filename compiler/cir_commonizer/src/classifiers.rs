//! Known-classifiers aggregate.
//!
//! Everything type commonization needs to resolve a classifier id: each
//! target's own classifier index and dependencies, the common dependencies,
//! the fictitious function interfaces, the forward declarations, and the
//! map from classifier id to its node in the merge tree.

mod associated;

use std::sync::Arc;

use cir_ir::{CirClassOrTypeAliasType, CirEntityId};
use rustc_hash::{FxHashMap, FxHashSet};

pub use associated::AssociatedClassifierIdsResolver;

use crate::error::{ClassifierNodeKind, CommonizerError};
use crate::resolvers::{
    CirClassifierIndex, CirProvidedClassifiers, CompositeProvidedClassifiers,
    FictitiousFunctionClassifiers,
};
use crate::tree::{CirClassifierNodeId, ClassNodeId, TypeAliasNodeId};
use crate::type_distance::{type_distance, CirTypeDistance};

/// Classifier universes of one run.
pub struct CirKnownClassifiers {
    classifier_indices: Vec<Arc<CirClassifierIndex>>,
    target_dependencies: Vec<Arc<dyn CirProvidedClassifiers>>,
    common_dependencies: Arc<dyn CirProvidedClassifiers>,
    fictitious_functions: Arc<FictitiousFunctionClassifiers>,
    forward_declarations: Arc<dyn CirProvidedClassifiers>,
    /// Full per-target chains, see [`Self::target_resolver`].
    target_resolvers: Vec<CompositeProvidedClassifiers>,
    /// Per-target chains for the backward type-distance search.
    backward_resolvers: Vec<CompositeProvidedClassifiers>,
    class_nodes: FxHashMap<CirEntityId, ClassNodeId>,
    type_alias_nodes: FxHashMap<CirEntityId, TypeAliasNodeId>,
    allowed_duplicates: FxHashSet<CirEntityId>,
    associated_ids: AssociatedClassifierIdsResolver,
}

impl CirKnownClassifiers {
    /// `classifier_indices` and `target_dependencies` are in target order
    /// and must have the same length.
    pub fn new(
        classifier_indices: Vec<Arc<CirClassifierIndex>>,
        target_dependencies: Vec<Arc<dyn CirProvidedClassifiers>>,
        common_dependencies: Arc<dyn CirProvidedClassifiers>,
        forward_declarations: Arc<dyn CirProvidedClassifiers>,
        allowed_duplicates: FxHashSet<CirEntityId>,
    ) -> Result<Self, CommonizerError> {
        if classifier_indices.len() != target_dependencies.len() {
            return Err(CommonizerError::TargetCountMismatch {
                expected: classifier_indices.len(),
                found: target_dependencies.len(),
            });
        }

        let fictitious_functions = Arc::new(FictitiousFunctionClassifiers::new());
        let fictitious: Arc<dyn CirProvidedClassifiers> = fictitious_functions.clone();
        let mut target_resolvers = Vec::with_capacity(classifier_indices.len());
        let mut backward_resolvers = Vec::with_capacity(classifier_indices.len());
        for (index, dependencies) in classifier_indices.iter().zip(&target_dependencies) {
            let index: Arc<dyn CirProvidedClassifiers> = index.clone();
            target_resolvers.push(CompositeProvidedClassifiers::new(vec![
                Arc::clone(&index),
                Arc::clone(dependencies),
                Arc::clone(&common_dependencies),
                Arc::clone(&fictitious),
                Arc::clone(&forward_declarations),
            ]));
            backward_resolvers.push(CompositeProvidedClassifiers::new(vec![
                index,
                Arc::clone(&common_dependencies),
                Arc::clone(dependencies),
            ]));
        }

        let mut universes: Vec<Arc<dyn CirProvidedClassifiers>> = Vec::new();
        universes.extend(
            classifier_indices
                .iter()
                .map(|index| Arc::clone(index) as Arc<dyn CirProvidedClassifiers>),
        );
        universes.extend(target_dependencies.iter().cloned());
        universes.push(Arc::clone(&common_dependencies));

        Ok(Self {
            classifier_indices,
            target_dependencies,
            common_dependencies,
            fictitious_functions,
            forward_declarations,
            target_resolvers,
            backward_resolvers,
            class_nodes: FxHashMap::default(),
            type_alias_nodes: FxHashMap::default(),
            allowed_duplicates,
            associated_ids: AssociatedClassifierIdsResolver::new(universes),
        })
    }

    pub fn target_count(&self) -> usize {
        self.classifier_indices.len()
    }

    pub fn classifier_index(&self, target_index: usize) -> &CirClassifierIndex {
        &self.classifier_indices[target_index]
    }

    pub fn target_dependencies(&self, target_index: usize) -> &dyn CirProvidedClassifiers {
        &*self.target_dependencies[target_index]
    }

    pub fn common_dependencies(&self) -> &Arc<dyn CirProvidedClassifiers> {
        &self.common_dependencies
    }

    pub fn fictitious_functions(&self) -> &FictitiousFunctionClassifiers {
        &self.fictitious_functions
    }

    /// Forward declarations exported by any target, shared by all of them.
    pub fn forward_declarations(&self) -> &dyn CirProvidedClassifiers {
        &*self.forward_declarations
    }

    /// Resolver chain of one target: its classifier index, its dependencies,
    /// the common dependencies, the fictitious function interfaces, then the
    /// forward declarations.
    pub fn target_resolver(&self, target_index: usize) -> &CompositeProvidedClassifiers {
        &self.target_resolvers[target_index]
    }

    /// Register the node created for classifier `id`.
    ///
    /// Classes and type aliases are registered separately, so one target's
    /// class may share its id with another target's alias. A second node of
    /// the same kind is an error unless the id is an allowed duplicate, in
    /// which case the first node is kept.
    pub fn register_node(
        &mut self,
        id: CirEntityId,
        node: CirClassifierNodeId,
    ) -> Result<(), CommonizerError> {
        let (kind, registered) = match node {
            CirClassifierNodeId::Class(_) => {
                (ClassifierNodeKind::Class, self.class_nodes.contains_key(&id))
            }
            CirClassifierNodeId::TypeAlias(_) => (
                ClassifierNodeKind::TypeAlias,
                self.type_alias_nodes.contains_key(&id),
            ),
        };
        if registered {
            if self.allowed_duplicates.contains(&id) {
                tracing::warn!(%id, %kind, "duplicate classifier node, keeping the first");
                return Ok(());
            }
            return Err(CommonizerError::DuplicateClassifierNode { kind, id });
        }
        tracing::trace!(%id, %kind, "registered classifier node");
        match node {
            CirClassifierNodeId::Class(node_id) => {
                self.class_nodes.insert(id, node_id);
            }
            CirClassifierNodeId::TypeAlias(node_id) => {
                self.type_alias_nodes.insert(id, node_id);
            }
        }
        Ok(())
    }

    /// The class node registered under `id`.
    pub fn class_node_id(&self, id: &CirEntityId) -> Option<ClassNodeId> {
        self.class_nodes.get(id).copied()
    }

    /// The type-alias node registered under `id`.
    pub fn type_alias_node_id(&self, id: &CirEntityId) -> Option<TypeAliasNodeId> {
        self.type_alias_nodes.get(id).copied()
    }

    /// Ids linked to `id` by type-alias relations in any target or dependency.
    pub fn associated_ids(&self, id: &CirEntityId) -> Arc<[CirEntityId]> {
        self.associated_ids.resolve(id)
    }

    /// Type distance from `from` to `to` as seen by one target.
    pub fn type_distance(
        &self,
        target_index: usize,
        from: &CirClassOrTypeAliasType,
        to: &CirEntityId,
    ) -> CirTypeDistance {
        type_distance(&self.backward_resolvers[target_index], from, to)
    }
}

#[cfg(test)]
mod tests;
