//! The merge tree.
//!
//! Every node holds one slot per target (`None` where the target does not
//! declare it) and a lazily computed common declaration. Containers are
//! keyed by name; callables by their approximation keys. Children are kept
//! in `BTreeMap`s so traversal order is the same on every run.
//!
//! Class and type-alias nodes live in [`CirNodeArena`]; containers refer to
//! them by id.

mod arena;
pub mod visitor;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use cir_ir::{
    CirClass, CirClassConstructor, CirEntityId, CirFunction, CirModule, CirName, CirPackage,
    CirPackageName, CirProperty, CirRoot, CirTypeAlias, CommonizerTarget,
};
use rayon::prelude::*;

pub use arena::{CirClassifierNodeId, CirNodeArena, ClassNodeId, TypeAliasNodeId};
use visitor::CirNodeVisitor;

use crate::approximation::{
    ConstructorApproximationKey, FunctionApproximationKey, PropertyApproximationKey,
};
use crate::classifiers::CirKnownClassifiers;
use crate::commonizer;
use crate::resolvers::CirProvidedClassifiers;

/// Per-target slots plus the memoized common declaration.
///
/// The slot count is the run's target count and never changes.
pub struct CirNode<T, R> {
    targets: Box<[Option<T>]>,
    common: OnceLock<Option<R>>,
}

impl<T, R> CirNode<T, R> {
    pub fn new(target_count: usize) -> Self {
        Self {
            targets: (0..target_count).map(|_| None).collect(),
            common: OnceLock::new(),
        }
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn target_declarations(&self) -> &[Option<T>] {
        &self.targets
    }

    pub fn target_declaration(&self, index: usize) -> Option<&T> {
        self.targets.get(index).and_then(Option::as_ref)
    }

    /// `(target index, declaration)` for every target that declares the node.
    pub fn present(&self) -> impl Iterator<Item = (usize, &T)> {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(index, declaration)| declaration.as_ref().map(|d| (index, d)))
    }

    /// Fill slot `index`. Returns `false` if the slot is already taken or out
    /// of range; the existing declaration is kept.
    pub(crate) fn set_target_declaration(&mut self, index: usize, declaration: T) -> bool {
        match self.targets.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(declaration);
                true
            }
            _ => false,
        }
    }

    /// Whether the common declaration has been computed.
    pub fn is_commonized(&self) -> bool {
        self.common.get().is_some()
    }

    fn common_or_init(&self, commonize: impl FnOnce() -> Option<R>) -> Option<&R> {
        self.common.get_or_init(commonize).as_ref()
    }
}

pub type CirFunctionNode = CirNode<CirFunction, CirFunction>;
pub type CirPropertyNode = CirNode<CirProperty, CirProperty>;
pub type CirClassConstructorNode = CirNode<CirClassConstructor, CirClassConstructor>;

pub struct CirRootNode {
    node: CirNode<CirRoot, CirRoot>,
    common_dependencies: Arc<dyn CirProvidedClassifiers>,
    modules: BTreeMap<CirName, CirModuleNode>,
}

pub struct CirModuleNode {
    node: CirNode<CirModule, CirModule>,
    packages: BTreeMap<CirPackageName, CirPackageNode>,
}

pub struct CirPackageNode {
    node: CirNode<CirPackage, CirPackage>,
    properties: BTreeMap<PropertyApproximationKey, CirPropertyNode>,
    functions: BTreeMap<FunctionApproximationKey, CirFunctionNode>,
    classes: BTreeMap<CirName, ClassNodeId>,
    type_aliases: BTreeMap<CirName, TypeAliasNodeId>,
}

pub struct CirClassNode {
    id: CirEntityId,
    node: CirNode<CirClass, CirClass>,
    constructors: BTreeMap<ConstructorApproximationKey, CirClassConstructorNode>,
    properties: BTreeMap<PropertyApproximationKey, CirPropertyNode>,
    functions: BTreeMap<FunctionApproximationKey, CirFunctionNode>,
    classes: BTreeMap<CirName, ClassNodeId>,
}

pub struct CirTypeAliasNode {
    id: CirEntityId,
    node: CirNode<CirTypeAlias, CirTypeAlias>,
}

impl CirRootNode {
    pub(crate) fn new(
        target_count: usize,
        common_dependencies: Arc<dyn CirProvidedClassifiers>,
    ) -> Self {
        Self {
            node: CirNode::new(target_count),
            common_dependencies,
            modules: BTreeMap::new(),
        }
    }

    pub fn node(&self) -> &CirNode<CirRoot, CirRoot> {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut CirNode<CirRoot, CirRoot> {
        &mut self.node
    }

    pub fn common_dependencies(&self) -> &dyn CirProvidedClassifiers {
        &*self.common_dependencies
    }

    pub fn modules(&self) -> &BTreeMap<CirName, CirModuleNode> {
        &self.modules
    }

    pub(crate) fn module_mut(&mut self, name: CirName, target_count: usize) -> &mut CirModuleNode {
        self.modules
            .entry(name)
            .or_insert_with(|| CirModuleNode::new(target_count))
    }

    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirRoot> {
        self.node
            .common_or_init(|| commonizer::commonize_root(tree, &self.node))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_root(self, tree);
    }
}

impl CirModuleNode {
    fn new(target_count: usize) -> Self {
        Self {
            node: CirNode::new(target_count),
            packages: BTreeMap::new(),
        }
    }

    pub fn node(&self) -> &CirNode<CirModule, CirModule> {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut CirNode<CirModule, CirModule> {
        &mut self.node
    }

    pub fn packages(&self) -> &BTreeMap<CirPackageName, CirPackageNode> {
        &self.packages
    }

    pub(crate) fn package_mut(
        &mut self,
        package_name: &CirPackageName,
        target_count: usize,
    ) -> &mut CirPackageNode {
        self.packages
            .entry(package_name.clone())
            .or_insert_with(|| CirPackageNode::new(target_count))
    }

    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirModule> {
        self.node
            .common_or_init(|| commonizer::commonize_module(tree, &self.node))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_module(self, tree);
    }
}

impl CirPackageNode {
    fn new(target_count: usize) -> Self {
        Self {
            node: CirNode::new(target_count),
            properties: BTreeMap::new(),
            functions: BTreeMap::new(),
            classes: BTreeMap::new(),
            type_aliases: BTreeMap::new(),
        }
    }

    pub fn node(&self) -> &CirNode<CirPackage, CirPackage> {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut CirNode<CirPackage, CirPackage> {
        &mut self.node
    }

    pub fn properties(&self) -> &BTreeMap<PropertyApproximationKey, CirPropertyNode> {
        &self.properties
    }

    pub fn functions(&self) -> &BTreeMap<FunctionApproximationKey, CirFunctionNode> {
        &self.functions
    }

    pub fn classes(&self) -> &BTreeMap<CirName, ClassNodeId> {
        &self.classes
    }

    pub fn type_aliases(&self) -> &BTreeMap<CirName, TypeAliasNodeId> {
        &self.type_aliases
    }

    pub(crate) fn property_mut(
        &mut self,
        key: PropertyApproximationKey,
        target_count: usize,
    ) -> &mut CirPropertyNode {
        self.properties
            .entry(key)
            .or_insert_with(|| CirNode::new(target_count))
    }

    pub(crate) fn function_mut(
        &mut self,
        key: FunctionApproximationKey,
        target_count: usize,
    ) -> &mut CirFunctionNode {
        self.functions
            .entry(key)
            .or_insert_with(|| CirNode::new(target_count))
    }

    pub(crate) fn classes_mut(&mut self) -> &mut BTreeMap<CirName, ClassNodeId> {
        &mut self.classes
    }

    pub(crate) fn type_aliases_mut(&mut self) -> &mut BTreeMap<CirName, TypeAliasNodeId> {
        &mut self.type_aliases
    }

    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirPackage> {
        self.node
            .common_or_init(|| commonizer::commonize_package(tree, &self.node))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_package(self, tree);
    }
}

impl CirClassNode {
    pub(crate) fn new(id: CirEntityId, target_count: usize) -> Self {
        Self {
            id,
            node: CirNode::new(target_count),
            constructors: BTreeMap::new(),
            properties: BTreeMap::new(),
            functions: BTreeMap::new(),
            classes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &CirEntityId {
        &self.id
    }

    pub fn node(&self) -> &CirNode<CirClass, CirClass> {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut CirNode<CirClass, CirClass> {
        &mut self.node
    }

    pub fn constructors(&self) -> &BTreeMap<ConstructorApproximationKey, CirClassConstructorNode> {
        &self.constructors
    }

    pub fn properties(&self) -> &BTreeMap<PropertyApproximationKey, CirPropertyNode> {
        &self.properties
    }

    pub fn functions(&self) -> &BTreeMap<FunctionApproximationKey, CirFunctionNode> {
        &self.functions
    }

    pub fn classes(&self) -> &BTreeMap<CirName, ClassNodeId> {
        &self.classes
    }

    pub(crate) fn constructor_mut(
        &mut self,
        key: ConstructorApproximationKey,
        target_count: usize,
    ) -> &mut CirClassConstructorNode {
        self.constructors
            .entry(key)
            .or_insert_with(|| CirNode::new(target_count))
    }

    pub(crate) fn property_mut(
        &mut self,
        key: PropertyApproximationKey,
        target_count: usize,
    ) -> &mut CirPropertyNode {
        self.properties
            .entry(key)
            .or_insert_with(|| CirNode::new(target_count))
    }

    pub(crate) fn function_mut(
        &mut self,
        key: FunctionApproximationKey,
        target_count: usize,
    ) -> &mut CirFunctionNode {
        self.functions
            .entry(key)
            .or_insert_with(|| CirNode::new(target_count))
    }

    pub(crate) fn classes_mut(&mut self) -> &mut BTreeMap<CirName, ClassNodeId> {
        &mut self.classes
    }

    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirClass> {
        self.node
            .common_or_init(|| commonizer::commonize_class(tree, &self.node))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_class(self, tree);
    }

    /// Force the class and its own members; nested classes are arena nodes
    /// and are forced separately.
    fn commonize_members(&self, tree: &CirTree) {
        self.common_declaration(tree);
        for constructor in self.constructors.values() {
            constructor.common_declaration(tree);
        }
        for property in self.properties.values() {
            property.common_declaration(tree);
        }
        for function in self.functions.values() {
            function.common_declaration(tree);
        }
    }
}

impl CirTypeAliasNode {
    pub(crate) fn new(id: CirEntityId, target_count: usize) -> Self {
        Self {
            id,
            node: CirNode::new(target_count),
        }
    }

    pub fn id(&self) -> &CirEntityId {
        &self.id
    }

    pub fn node(&self) -> &CirNode<CirTypeAlias, CirTypeAlias> {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut CirNode<CirTypeAlias, CirTypeAlias> {
        &mut self.node
    }

    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirTypeAlias> {
        self.node
            .common_or_init(|| commonizer::commonize_type_alias(tree, &self.node))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_type_alias(self, tree);
    }
}

impl CirFunctionNode {
    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirFunction> {
        self.common_or_init(|| commonizer::commonize_function(tree, self))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_function(self, tree);
    }
}

impl CirPropertyNode {
    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirProperty> {
        self.common_or_init(|| commonizer::commonize_property(tree, self))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_property(self, tree);
    }
}

impl CirClassConstructorNode {
    pub fn common_declaration(&self, tree: &CirTree) -> Option<&CirClassConstructor> {
        self.common_or_init(|| commonizer::commonize_constructor(tree, self))
    }

    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V, tree: &CirTree) {
        visitor.visit_class_constructor(self, tree);
    }
}

/// The merged tree of one run, together with the classifiers it resolves
/// types against.
pub struct CirTree {
    targets: Vec<CommonizerTarget>,
    root: CirRootNode,
    arena: CirNodeArena,
    classifiers: CirKnownClassifiers,
}

impl CirTree {
    pub(crate) fn new(
        targets: Vec<CommonizerTarget>,
        root: CirRootNode,
        arena: CirNodeArena,
        classifiers: CirKnownClassifiers,
    ) -> Self {
        Self {
            targets,
            root,
            arena,
            classifiers,
        }
    }

    pub fn targets(&self) -> &[CommonizerTarget] {
        &self.targets
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The shared target of the common declarations.
    pub fn output_target(&self) -> CommonizerTarget {
        CommonizerTarget::shared(&self.targets)
    }

    pub fn root(&self) -> &CirRootNode {
        &self.root
    }

    pub fn arena(&self) -> &CirNodeArena {
        &self.arena
    }

    pub fn classifiers(&self) -> &CirKnownClassifiers {
        &self.classifiers
    }

    /// The class node registered under `id`.
    pub fn class_node(&self, id: &CirEntityId) -> Option<&CirClassNode> {
        let node_id = self.classifiers.class_node_id(id)?;
        Some(self.arena.class(node_id))
    }

    /// The type-alias node registered under `id`.
    pub fn type_alias_node(&self, id: &CirEntityId) -> Option<&CirTypeAliasNode> {
        let node_id = self.classifiers.type_alias_node_id(id)?;
        Some(self.arena.type_alias(node_id))
    }

    /// Compute the common declaration of every node.
    ///
    /// Containers are walked on the calling thread. With `parallel`, the
    /// arena's class and type-alias nodes are forced on the rayon pool.
    #[tracing::instrument(level = "debug", skip_all, fields(
        classes = self.arena.classes().len(),
        type_aliases = self.arena.type_aliases().len(),
        parallel = parallel,
    ))]
    pub fn commonize_all(&self, parallel: bool) {
        self.root.common_declaration(self);
        for module in self.root.modules.values() {
            module.common_declaration(self);
            for package in module.packages.values() {
                package.common_declaration(self);
                for property in package.properties.values() {
                    property.common_declaration(self);
                }
                for function in package.functions.values() {
                    function.common_declaration(self);
                }
            }
        }

        if parallel {
            self.arena
                .type_aliases()
                .par_iter()
                .for_each(|node| {
                    node.common_declaration(self);
                });
            self.arena
                .classes()
                .par_iter()
                .for_each(|node| node.commonize_members(self));
        } else {
            for node in self.arena.type_aliases() {
                node.common_declaration(self);
            }
            for node in self.arena.classes() {
                node.commonize_members(self);
            }
        }

        let common_classes = self
            .arena
            .classes()
            .iter()
            .filter(|node| node.common_declaration(self).is_some())
            .count();
        tracing::debug!(common_classes, "commonized all nodes");
    }

    /// Walk the tree with `visitor`, starting at the root.
    pub fn accept<V: CirNodeVisitor + ?Sized>(&self, visitor: &mut V) {
        self.root.accept(visitor, self);
    }
}

#[cfg(test)]
mod tests;
