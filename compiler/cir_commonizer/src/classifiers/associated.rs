//! Classifier ids linked by type-alias relations.

use std::sync::Arc;

use cir_ir::CirEntityId;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::resolvers::CirProvidedClassifiers;

/// Transitive closure of "is the underlying type of" in both directions,
/// over every classifier universe of the run.
///
/// Results are cached. Reads take the read lock; a miss computes outside
/// any lock and inserts under the write lock.
pub struct AssociatedClassifierIdsResolver {
    universes: Vec<Arc<dyn CirProvidedClassifiers>>,
    cache: RwLock<FxHashMap<CirEntityId, Arc<[CirEntityId]>>>,
}

impl AssociatedClassifierIdsResolver {
    pub fn new(universes: Vec<Arc<dyn CirProvidedClassifiers>>) -> Self {
        Self {
            universes,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// All ids reachable from `id`, including `id` itself, sorted.
    pub fn resolve(&self, id: &CirEntityId) -> Arc<[CirEntityId]> {
        if let Some(ids) = self.cache.read().get(id) {
            return Arc::clone(ids);
        }
        let ids = self.compute(id);
        let mut cache = self.cache.write();
        Arc::clone(cache.entry(id.clone()).or_insert(ids))
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn compute(&self, id: &CirEntityId) -> Arc<[CirEntityId]> {
        let mut visited = FxHashSet::default();
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for universe in &self.universes {
                if let Some(classifier) = universe.classifier(&current) {
                    if let Some(alias) = classifier.as_type_alias() {
                        pending.push(alias.underlying_type.classifier_id().clone());
                    }
                }
                pending.extend(universe.find_type_aliases_with_underlying_type(&current));
            }
        }
        let mut ids: Vec<CirEntityId> = visited.into_iter().collect();
        ids.sort();
        ids.into()
    }
}
