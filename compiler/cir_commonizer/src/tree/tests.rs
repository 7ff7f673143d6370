#![expect(clippy::unwrap_used, reason = "tests unwrap fixture results")]

use super::*;
use super::visitor::{walk_class, walk_package};
use cir_ir::{CirClass, CirFunction, CirModule, CirPackage, CirType, ClassKind};
use pretty_assertions::assert_eq;

use crate::input::{CirClassInput, CirModuleInput, CirPackageInput, CirTargetInput};
use crate::merger::CirTreeMerger;
use crate::resolvers::CompositeProvidedClassifiers;
use crate::settings::CommonizerSettings;

fn id(s: &str) -> CirEntityId {
    CirEntityId::parse(s).unwrap()
}

fn name(s: &str) -> CirName {
    CirName::create(s)
}

/// Two targets, each with `p/Foo { fun size() }`, a top-level `fun f()`
/// and `typealias Alias = Foo`; the second also has `p/Only`.
fn tree() -> CirTree {
    let targets = vec![
        CommonizerTarget::leaf("linux_x64"),
        CommonizerTarget::leaf("macos_arm64"),
    ];
    let inputs = targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            let unit = || CirType::class(id("kotlin/Unit"));
            let mut package = CirPackageInput::new(CirPackage {
                package_name: CirPackageName::create("p"),
            })
            .with_class(
                CirClassInput::new(CirClass::new(name("Foo"), ClassKind::Class))
                    .with_function(CirFunction::new(name("size"), Vec::new(), unit())),
            )
            .with_function(CirFunction::new(name("f"), Vec::new(), unit()))
            .with_type_alias(cir_ir::CirTypeAlias::new(
                name("Alias"),
                cir_ir::CirClassOrTypeAliasType::Class(cir_ir::CirClassType::new(
                    id("p/Foo"),
                    Vec::new(),
                    false,
                )),
            ));
            if index == 1 {
                package = package.with_class(CirClassInput::new(CirClass::new(
                    name("Only"),
                    ClassKind::Object,
                )));
            }
            CirTargetInput::new(target.clone()).with_module(
                CirModuleInput::new(CirModule { name: name("lib") }).with_package(package),
            )
        })
        .collect();
    CirTreeMerger::new(
        CommonizerSettings::new(targets),
        Arc::new(CompositeProvidedClassifiers::default()),
    )
    .merge(inputs)
    .unwrap()
}

#[derive(Default)]
struct Counter {
    packages: usize,
    classes: Vec<CirEntityId>,
    functions: usize,
    type_aliases: usize,
}

impl CirNodeVisitor for Counter {
    fn visit_package(&mut self, node: &CirPackageNode, tree: &CirTree) {
        self.packages += 1;
        walk_package(self, node, tree);
    }

    fn visit_class(&mut self, node: &CirClassNode, tree: &CirTree) {
        self.classes.push(node.id().clone());
        walk_class(self, node, tree);
    }

    fn visit_function(&mut self, _node: &CirFunctionNode, _tree: &CirTree) {
        self.functions += 1;
    }

    fn visit_type_alias(&mut self, _node: &CirTypeAliasNode, _tree: &CirTree) {
        self.type_aliases += 1;
    }
}

#[test]
fn slots_are_positional_and_filled_once() {
    let mut node: CirNode<u32, u32> = CirNode::new(3);

    assert!(node.set_target_declaration(2, 7));
    assert!(!node.set_target_declaration(2, 8));
    assert!(!node.set_target_declaration(3, 9));

    assert_eq!(node.target_count(), 3);
    assert_eq!(node.target_declarations(), &[None, None, Some(7)]);
    assert_eq!(node.present().collect::<Vec<_>>(), vec![(2, &7)]);
    assert!(!node.is_commonized());
}

#[test]
fn common_declaration_is_computed_once() {
    let node: CirNode<u32, u32> = CirNode::new(1);
    let mut calls = 0;

    assert_eq!(
        node.common_or_init(|| {
            calls += 1;
            Some(1)
        }),
        Some(&1)
    );
    assert_eq!(node.common_or_init(|| Some(2)), Some(&1));
    assert_eq!(calls, 1);
    assert!(node.is_commonized());
}

#[test]
fn visitor_walks_in_key_order() {
    let tree = tree();
    let mut counter = Counter::default();
    tree.accept(&mut counter);

    assert_eq!(counter.packages, 1);
    assert_eq!(counter.classes, vec![id("p/Foo"), id("p/Only")]);
    // `f` and the member `size`.
    assert_eq!(counter.functions, 2);
    assert_eq!(counter.type_aliases, 1);
}

#[test]
fn commonization_is_lazy_until_forced() {
    let tree = tree();
    let foo = tree.class_node(&id("p/Foo")).unwrap();
    assert!(!foo.node().is_commonized());

    tree.commonize_all(false);

    assert!(foo.node().is_commonized());
    assert!(foo.common_declaration(&tree).is_some());
    let only = tree.class_node(&id("p/Only")).unwrap();
    assert!(only.node().is_commonized());
    assert_eq!(only.node().present().map(|(index, _)| index).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn parallel_forcing_reaches_every_node() {
    let tree = tree();
    tree.commonize_all(true);

    for node in tree.arena().classes() {
        assert!(node.node().is_commonized(), "{}", node.id());
        for function in node.functions().values() {
            assert!(function.is_commonized());
        }
    }
    for node in tree.arena().type_aliases() {
        assert!(node.node().is_commonized(), "{}", node.id());
    }
    let alias = tree.type_alias_node(&id("p/Alias")).unwrap();
    assert_eq!(
        alias.common_declaration(&tree).unwrap().expanded_type.class_id,
        id("p/Foo")
    );
}

#[test]
fn lookups_distinguish_classes_from_aliases() {
    let tree = tree();

    assert!(tree.class_node(&id("p/Foo")).is_some());
    assert!(tree.type_alias_node(&id("p/Foo")).is_none());
    assert!(tree.type_alias_node(&id("p/Alias")).is_some());
    assert!(tree.class_node(&id("p/Missing")).is_none());
    assert_eq!(tree.target_count(), 2);
    assert_eq!(tree.output_target(), CommonizerTarget::shared(tree.targets()));
}
