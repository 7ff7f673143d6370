//! Tree merger: folds per-target inputs into one [`CirTree`].
//!
//! Containers are keyed by name, callables by approximation key. The first
//! target to mention a container creates its node; later targets fill their
//! slot of the same node. Class and type-alias nodes are allocated in the
//! arena and registered with the known classifiers as they are created.

use std::sync::Arc;

use cir_ir::{CirEntityId, CirPackageName, CirRoot};
use rayon::prelude::*;

use crate::approximation::{
    ConstructorApproximationKey, FunctionApproximationKey, PropertyApproximationKey,
    SignatureBuildingContext,
};
use crate::classifiers::CirKnownClassifiers;
use crate::error::CommonizerError;
use crate::input::{CirClassInput, CirPackageInput, CirTargetInput};
use crate::resolvers::{CirClassifierIndex, CirProvidedClassifiers, CompositeProvidedClassifiers};
use crate::settings::CommonizerSettings;
use crate::tree::{
    CirClassNode, CirClassifierNodeId, CirNode, CirNodeArena, CirPackageNode, CirRootNode,
    CirTree, CirTypeAliasNode, ClassNodeId,
};

/// Builds a [`CirTree`] from one [`CirTargetInput`] per configured target.
///
/// ```text
/// let tree = CirTreeMerger::new(settings, common_dependencies)
///     .with_target_dependencies(target_dependencies)
///     .merge(inputs)?;
/// ```
pub struct CirTreeMerger {
    settings: CommonizerSettings,
    common_dependencies: Arc<dyn CirProvidedClassifiers>,
    target_dependencies: Option<Vec<Arc<dyn CirProvidedClassifiers>>>,
    forward_declarations: Arc<dyn CirProvidedClassifiers>,
}

impl CirTreeMerger {
    pub fn new(
        settings: CommonizerSettings,
        common_dependencies: Arc<dyn CirProvidedClassifiers>,
    ) -> Self {
        Self {
            settings,
            common_dependencies,
            target_dependencies: None,
            forward_declarations: Arc::new(CompositeProvidedClassifiers::default()),
        }
    }

    /// Dependencies of each target, in target order. Targets without
    /// dependencies default to an empty resolver.
    #[must_use]
    pub fn with_target_dependencies(
        mut self,
        target_dependencies: Vec<Arc<dyn CirProvidedClassifiers>>,
    ) -> Self {
        self.target_dependencies = Some(target_dependencies);
        self
    }

    /// The exported forward declarations of all targets, usually
    /// [`ProvidedClassifiersByModules::load_exported_forward_declarations`].
    ///
    /// [`ProvidedClassifiersByModules::load_exported_forward_declarations`]:
    /// crate::resolvers::ProvidedClassifiersByModules::load_exported_forward_declarations
    #[must_use]
    pub fn with_forward_declarations(
        mut self,
        forward_declarations: Arc<dyn CirProvidedClassifiers>,
    ) -> Self {
        self.forward_declarations = forward_declarations;
        self
    }

    #[tracing::instrument(level = "debug", skip_all, fields(
        targets = inputs.len(),
        parallel = self.settings.parallel,
    ))]
    pub fn merge(self, inputs: Vec<CirTargetInput>) -> Result<CirTree, CommonizerError> {
        let target_count = self.settings.target_count();
        if inputs.len() != target_count {
            return Err(CommonizerError::TargetCountMismatch {
                expected: target_count,
                found: inputs.len(),
            });
        }

        let target_dependencies = self.target_dependencies.unwrap_or_else(|| {
            (0..target_count)
                .map(|_| {
                    Arc::new(CompositeProvidedClassifiers::default())
                        as Arc<dyn CirProvidedClassifiers>
                })
                .collect()
        });
        let classifier_indices: Vec<Arc<CirClassifierIndex>> = if self.settings.parallel {
            inputs
                .par_iter()
                .map(|input| Arc::new(CirClassifierIndex::build(input)))
                .collect()
        } else {
            inputs
                .iter()
                .map(|input| Arc::new(CirClassifierIndex::build(input)))
                .collect()
        };
        let classifiers = CirKnownClassifiers::new(
            classifier_indices,
            target_dependencies,
            Arc::clone(&self.common_dependencies),
            self.forward_declarations,
            self.settings.allowed_duplicates.clone(),
        )?;

        let mut builder = TreeBuilder {
            target_count,
            root: CirRootNode::new(target_count, self.common_dependencies),
            arena: CirNodeArena::new(),
            classifiers,
        };
        for (target_index, input) in inputs.iter().enumerate() {
            builder.merge_target(target_index, input)?;
        }
        tracing::debug!(
            classes = builder.arena.classes().len(),
            type_aliases = builder.arena.type_aliases().len(),
            "merged targets"
        );

        let TreeBuilder {
            root,
            arena,
            classifiers,
            ..
        } = builder;
        Ok(CirTree::new(self.settings.targets, root, arena, classifiers))
    }
}

struct TreeBuilder {
    target_count: usize,
    root: CirRootNode,
    arena: CirNodeArena,
    classifiers: CirKnownClassifiers,
}

/// Everything class merging mutates, split from the container nodes.
struct ClassifierSink<'a> {
    target_count: usize,
    target_index: usize,
    arena: &'a mut CirNodeArena,
    classifiers: &'a mut CirKnownClassifiers,
}

impl TreeBuilder {
    fn merge_target(
        &mut self,
        target_index: usize,
        input: &CirTargetInput,
    ) -> Result<(), CommonizerError> {
        let Self {
            target_count,
            root,
            arena,
            classifiers,
        } = self;
        let target_count = *target_count;
        fill(
            root.node_mut(),
            target_index,
            CirRoot {
                target: input.target.clone(),
            },
        );

        let mut sink = ClassifierSink {
            target_count,
            target_index,
            arena,
            classifiers,
        };
        for module in &input.modules {
            let module_node = root.module_mut(module.module.name, target_count);
            fill(module_node.node_mut(), target_index, module.module.clone());
            for package in &module.packages {
                let package_name = &package.package.package_name;
                let package_node = module_node.package_mut(package_name, target_count);
                fill(package_node.node_mut(), target_index, package.package.clone());
                sink.merge_package(package_node, package_name, package)?;
            }
        }
        Ok(())
    }
}

impl ClassifierSink<'_> {
    fn merge_package(
        &mut self,
        package_node: &mut CirPackageNode,
        package_name: &CirPackageName,
        input: &CirPackageInput,
    ) -> Result<(), CommonizerError> {
        let context = SignatureBuildingContext::new();
        for property in &input.properties {
            let key = PropertyApproximationKey::new(property, &context);
            fill(
                package_node.property_mut(key, self.target_count),
                self.target_index,
                property.clone(),
            );
        }
        for function in &input.functions {
            let key = FunctionApproximationKey::new(function, &context);
            fill(
                package_node.function_mut(key, self.target_count),
                self.target_index,
                function.clone(),
            );
        }

        for class in &input.classes {
            let name = class.class.name;
            let node_id = match package_node.classes().get(&name) {
                Some(&node_id) => node_id,
                None => {
                    let node_id =
                        self.new_class_node(CirEntityId::create(package_name.clone(), name))?;
                    package_node.classes_mut().insert(name, node_id);
                    node_id
                }
            };
            self.merge_class(node_id, class, &context)?;
        }

        for type_alias in &input.type_aliases {
            let name = type_alias.name;
            let node_id = match package_node.type_aliases().get(&name) {
                Some(&node_id) => node_id,
                None => {
                    let id = CirEntityId::create(package_name.clone(), name);
                    let node_id = self
                        .arena
                        .alloc_type_alias(CirTypeAliasNode::new(id.clone(), self.target_count));
                    self.classifiers
                        .register_node(id, CirClassifierNodeId::TypeAlias(node_id))?;
                    package_node.type_aliases_mut().insert(name, node_id);
                    node_id
                }
            };
            fill(
                self.arena.type_alias_mut(node_id).node_mut(),
                self.target_index,
                type_alias.clone(),
            );
        }
        Ok(())
    }

    /// Members are keyed in the scope of the enclosing classes' type
    /// parameters followed by this class's own.
    fn merge_class(
        &mut self,
        node_id: ClassNodeId,
        input: &CirClassInput,
        outer_context: &SignatureBuildingContext,
    ) -> Result<(), CommonizerError> {
        let (target_count, target_index) = (self.target_count, self.target_index);
        let context = outer_context.with_type_parameters(&input.class.type_parameters);

        let node = self.arena.class_mut(node_id);
        fill(node.node_mut(), target_index, input.class.clone());
        for constructor in &input.constructors {
            let key = ConstructorApproximationKey::new(constructor, &context);
            fill(
                node.constructor_mut(key, target_count),
                target_index,
                constructor.clone(),
            );
        }
        for property in &input.properties {
            let key = PropertyApproximationKey::new(property, &context);
            fill(node.property_mut(key, target_count), target_index, property.clone());
        }
        for function in &input.functions {
            let key = FunctionApproximationKey::new(function, &context);
            fill(node.function_mut(key, target_count), target_index, function.clone());
        }

        let class_id = node.id().clone();
        for nested in &input.nested {
            let name = nested.class.name;
            let existing = self.arena.class(node_id).classes().get(&name).copied();
            let nested_id = match existing {
                Some(nested_id) => nested_id,
                None => {
                    let nested_id = self.new_class_node(class_id.create_nested(name))?;
                    self.arena
                        .class_mut(node_id)
                        .classes_mut()
                        .insert(name, nested_id);
                    nested_id
                }
            };
            self.merge_class(nested_id, nested, &context)?;
        }
        Ok(())
    }

    fn new_class_node(&mut self, id: CirEntityId) -> Result<ClassNodeId, CommonizerError> {
        let node_id = self
            .arena
            .alloc_class(CirClassNode::new(id.clone(), self.target_count));
        self.classifiers
            .register_node(id, CirClassifierNodeId::Class(node_id))?;
        Ok(node_id)
    }
}

/// Put `declaration` into the target's slot. A repeated declaration within
/// one target keeps the first.
fn fill<T, R>(node: &mut CirNode<T, R>, target_index: usize, declaration: T) {
    if !node.set_target_declaration(target_index, declaration) {
        tracing::trace!(target_index, "declaration repeated within a target, keeping the first");
    }
}
