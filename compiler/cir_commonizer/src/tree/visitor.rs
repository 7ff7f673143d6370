//! Merge-tree visitor.
//!
//! Default methods call the `walk_*` functions, which visit children in
//! sorted key order. Override `visit_*` to act on a node kind; call the
//! matching `walk_*` to keep descending.
//!
//! ```text
//! struct CountCommonClasses(usize);
//!
//! impl CirNodeVisitor for CountCommonClasses {
//!     fn visit_class(&mut self, node: &CirClassNode, tree: &CirTree) {
//!         if node.common_declaration(tree).is_some() {
//!             self.0 += 1;
//!         }
//!         walk_class(self, node, tree);
//!     }
//! }
//! ```

use super::{
    CirClassConstructorNode, CirClassNode, CirFunctionNode, CirModuleNode, CirPackageNode,
    CirPropertyNode, CirRootNode, CirTree, CirTypeAliasNode,
};

pub trait CirNodeVisitor {
    fn visit_root(&mut self, node: &CirRootNode, tree: &CirTree) {
        walk_root(self, node, tree);
    }

    fn visit_module(&mut self, node: &CirModuleNode, tree: &CirTree) {
        walk_module(self, node, tree);
    }

    fn visit_package(&mut self, node: &CirPackageNode, tree: &CirTree) {
        walk_package(self, node, tree);
    }

    fn visit_class(&mut self, node: &CirClassNode, tree: &CirTree) {
        walk_class(self, node, tree);
    }

    fn visit_class_constructor(&mut self, _node: &CirClassConstructorNode, _tree: &CirTree) {}

    fn visit_function(&mut self, _node: &CirFunctionNode, _tree: &CirTree) {}

    fn visit_property(&mut self, _node: &CirPropertyNode, _tree: &CirTree) {}

    fn visit_type_alias(&mut self, _node: &CirTypeAliasNode, _tree: &CirTree) {}
}

pub fn walk_root<V: CirNodeVisitor + ?Sized>(visitor: &mut V, node: &CirRootNode, tree: &CirTree) {
    for module in node.modules().values() {
        module.accept(visitor, tree);
    }
}

pub fn walk_module<V: CirNodeVisitor + ?Sized>(
    visitor: &mut V,
    node: &CirModuleNode,
    tree: &CirTree,
) {
    for package in node.packages().values() {
        package.accept(visitor, tree);
    }
}

pub fn walk_package<V: CirNodeVisitor + ?Sized>(
    visitor: &mut V,
    node: &CirPackageNode,
    tree: &CirTree,
) {
    for property in node.properties().values() {
        property.accept(visitor, tree);
    }
    for function in node.functions().values() {
        function.accept(visitor, tree);
    }
    for &class_id in node.classes().values() {
        tree.arena().class(class_id).accept(visitor, tree);
    }
    for &type_alias_id in node.type_aliases().values() {
        tree.arena().type_alias(type_alias_id).accept(visitor, tree);
    }
}

pub fn walk_class<V: CirNodeVisitor + ?Sized>(
    visitor: &mut V,
    node: &CirClassNode,
    tree: &CirTree,
) {
    for constructor in node.constructors().values() {
        constructor.accept(visitor, tree);
    }
    for property in node.properties().values() {
        property.accept(visitor, tree);
    }
    for function in node.functions().values() {
        function.accept(visitor, tree);
    }
    for &class_id in node.classes().values() {
        tree.arena().class(class_id).accept(visitor, tree);
    }
}
