//! Ordered chain of resolvers.

use std::sync::Arc;

use cir_ir::{CirEntityId, CirProvidedClassifier};
use rustc_hash::FxHashSet;

use super::CirProvidedClassifiers;

/// Tries each layer in order; the first layer that knows an id answers.
#[derive(Clone, Default)]
pub struct CompositeProvidedClassifiers {
    layers: Vec<Arc<dyn CirProvidedClassifiers>>,
}

impl CompositeProvidedClassifiers {
    pub fn new(layers: Vec<Arc<dyn CirProvidedClassifiers>>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Arc<dyn CirProvidedClassifiers>] {
        &self.layers
    }
}

impl CirProvidedClassifiers for CompositeProvidedClassifiers {
    fn has_classifier(&self, id: &CirEntityId) -> bool {
        self.layers.iter().any(|layer| layer.has_classifier(id))
    }

    fn classifier(&self, id: &CirEntityId) -> Option<Arc<CirProvidedClassifier>> {
        self.layers.iter().find_map(|layer| layer.classifier(id))
    }

    /// Union over all layers, in layer order, without duplicates.
    fn find_type_aliases_with_underlying_type(&self, id: &CirEntityId) -> Vec<CirEntityId> {
        let mut seen = FxHashSet::default();
        let mut aliases = Vec::new();
        for layer in &self.layers {
            for alias in layer.find_type_aliases_with_underlying_type(id) {
                if seen.insert(alias.clone()) {
                    aliases.push(alias);
                }
            }
        }
        aliases
    }
}
