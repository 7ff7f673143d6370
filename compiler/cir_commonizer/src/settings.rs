//! Settings of one commonization run.

use cir_ir::{CirEntityId, CommonizerTarget};
use rustc_hash::FxHashSet;

/// Commonizer configuration.
///
/// Built with `CommonizerSettings::new(targets)` and the `with_*` methods:
///
/// ```text
/// let settings = CommonizerSettings::new(targets)
///     .with_allowed_duplicate(id)
///     .with_parallel(true);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CommonizerSettings {
    /// Leaf targets, in slot order.
    pub targets: Vec<CommonizerTarget>,
    /// Classifier ids that may be registered more than once. The first
    /// registration wins.
    pub allowed_duplicates: FxHashSet<CirEntityId>,
    /// Build classifier indices and force commonization on the rayon pool.
    pub parallel: bool,
}

impl CommonizerSettings {
    pub fn new(targets: Vec<CommonizerTarget>) -> Self {
        Self {
            targets,
            allowed_duplicates: FxHashSet::default(),
            parallel: false,
        }
    }

    #[must_use]
    pub fn with_allowed_duplicate(mut self, id: CirEntityId) -> Self {
        self.allowed_duplicates.insert(id);
        self
    }

    #[must_use]
    pub fn with_allowed_duplicates(mut self, ids: impl IntoIterator<Item = CirEntityId>) -> Self {
        self.allowed_duplicates.extend(ids);
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The shared target the common tree belongs to.
    pub fn output_target(&self) -> CommonizerTarget {
        CommonizerTarget::shared(&self.targets)
    }
}
