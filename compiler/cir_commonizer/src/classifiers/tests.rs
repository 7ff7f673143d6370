#![expect(clippy::unwrap_used, reason = "tests unwrap fixture results")]

use super::*;
use cir_ir::{
    CirClass, CirClassType, CirModule, CirName, CirPackage, CirPackageName, CirTypeAlias,
    ClassKind, CommonizerTarget,
};
use pretty_assertions::assert_eq;

use crate::input::{CirClassInput, CirModuleInput, CirPackageInput, CirTargetInput};
use crate::tree::{CirClassNode, CirNodeArena, CirTypeAliasNode, ClassNodeId};

fn id(s: &str) -> CirEntityId {
    CirEntityId::parse(s).unwrap()
}

fn class_type(s: &str) -> CirClassOrTypeAliasType {
    CirClassOrTypeAliasType::Class(CirClassType::new(id(s), Vec::new(), false))
}

fn target(package: CirPackageInput) -> CirTargetInput {
    CirTargetInput::new(CommonizerTarget::leaf("linux_x64")).with_module(
        CirModuleInput::new(CirModule {
            name: CirName::create("lib"),
        })
        .with_package(package),
    )
}

fn package() -> CirPackageInput {
    CirPackageInput::new(CirPackage {
        package_name: CirPackageName::create("p"),
    })
}

fn empty() -> Arc<dyn CirProvidedClassifiers> {
    Arc::new(CompositeProvidedClassifiers::default())
}

fn known(inputs: &[CirTargetInput], allowed: &[&str]) -> CirKnownClassifiers {
    CirKnownClassifiers::new(
        inputs
            .iter()
            .map(|input| Arc::new(CirClassifierIndex::build(input)))
            .collect(),
        inputs.iter().map(|_| empty()).collect(),
        empty(),
        empty(),
        allowed.iter().map(|s| id(s)).collect(),
    )
    .unwrap()
}

fn class_node(arena: &mut CirNodeArena, s: &str) -> ClassNodeId {
    arena.alloc_class(CirClassNode::new(id(s), 1))
}

fn type_alias_node(arena: &mut CirNodeArena, s: &str) -> CirClassifierNodeId {
    CirClassifierNodeId::TypeAlias(arena.alloc_type_alias(CirTypeAliasNode::new(id(s), 1)))
}

#[test]
fn second_registration_is_rejected() {
    let mut arena = CirNodeArena::new();
    let first = class_node(&mut arena, "p/Foo");
    let second = class_node(&mut arena, "p/Foo");
    let mut classifiers = known(&[target(package())], &[]);

    classifiers
        .register_node(id("p/Foo"), CirClassifierNodeId::Class(first))
        .unwrap();
    match classifiers.register_node(id("p/Foo"), CirClassifierNodeId::Class(second)) {
        Err(CommonizerError::DuplicateClassifierNode { kind, id: duplicate }) => {
            assert_eq!(kind, ClassifierNodeKind::Class);
            assert_eq!(duplicate, id("p/Foo"));
        }
        other => panic!("expected a duplicate error, got {other:?}"),
    }
    assert_eq!(classifiers.class_node_id(&id("p/Foo")), Some(first));
}

#[test]
fn allowed_duplicate_keeps_the_first_node() {
    let mut arena = CirNodeArena::new();
    let first = class_node(&mut arena, "p/Foo");
    let second = class_node(&mut arena, "p/Foo");
    let mut classifiers = known(&[target(package())], &["p/Foo"]);

    classifiers
        .register_node(id("p/Foo"), CirClassifierNodeId::Class(first))
        .unwrap();
    classifiers
        .register_node(id("p/Foo"), CirClassifierNodeId::Class(second))
        .unwrap();

    assert_eq!(classifiers.class_node_id(&id("p/Foo")), Some(first));
}

#[test]
fn class_and_type_alias_register_separately() {
    let mut arena = CirNodeArena::new();
    let class = class_node(&mut arena, "p/Foo");
    let alias = type_alias_node(&mut arena, "p/Foo");
    let second_alias = type_alias_node(&mut arena, "p/Foo");
    let mut classifiers = known(&[target(package())], &[]);

    classifiers
        .register_node(id("p/Foo"), CirClassifierNodeId::Class(class))
        .unwrap();
    classifiers.register_node(id("p/Foo"), alias).unwrap();
    assert_eq!(classifiers.class_node_id(&id("p/Foo")), Some(class));
    assert_eq!(
        classifiers.type_alias_node_id(&id("p/Foo")).map(CirClassifierNodeId::TypeAlias),
        Some(alias)
    );

    let error = classifiers
        .register_node(id("p/Foo"), second_alias)
        .unwrap_err();
    assert_eq!(error.to_string(), "duplicate type alias node for `p/Foo`");
}

#[test]
fn mismatched_dependency_count_is_rejected() {
    let input = target(package());
    let result = CirKnownClassifiers::new(
        vec![Arc::new(CirClassifierIndex::build(&input))],
        vec![empty(), empty()],
        empty(),
        empty(),
        FxHashSet::default(),
    );

    assert!(matches!(
        result,
        Err(CommonizerError::TargetCountMismatch {
            expected: 1,
            found: 2
        })
    ));
}

#[test]
fn associated_ids_span_targets_and_directions() {
    let bar = CirClassOrTypeAliasType::TypeAlias(cir_ir::CirTypeAliasType::new(
        id("p/Bar"),
        class_type("p/Foo"),
        Vec::new(),
        false,
    ));
    let linux = target(
        package()
            .with_class(CirClassInput::new(CirClass::new(CirName::create("Foo"), ClassKind::Class)))
            .with_type_alias(CirTypeAlias::new(CirName::create("Bar"), class_type("p/Foo")))
            .with_type_alias(CirTypeAlias::new(CirName::create("Baz"), bar)),
    );
    let macos = target(
        package()
            .with_class(CirClassInput::new(CirClass::new(CirName::create("Foo"), ClassKind::Class)))
            .with_class(CirClassInput::new(CirClass::new(
                CirName::create("Other"),
                ClassKind::Class,
            )))
            .with_type_alias(CirTypeAlias::new(CirName::create("Qux"), class_type("p/Foo"))),
    );
    let classifiers = known(&[linux, macos], &[]);

    let expected = vec![id("p/Bar"), id("p/Baz"), id("p/Foo"), id("p/Qux")];
    assert_eq!(classifiers.associated_ids(&id("p/Foo")).to_vec(), expected);
    assert_eq!(classifiers.associated_ids(&id("p/Baz")).to_vec(), expected);
    assert_eq!(
        classifiers.associated_ids(&id("p/Other")).to_vec(),
        vec![id("p/Other")]
    );
    // Served from the cache the second time.
    assert!(Arc::ptr_eq(
        &classifiers.associated_ids(&id("p/Qux")),
        &classifiers.associated_ids(&id("p/Qux"))
    ));
}

#[test]
fn target_resolver_chains_fictitious_functions() {
    let classifiers = known(&[target(package())], &[]);

    assert_eq!(classifiers.target_count(), 1);
    assert!(classifiers
        .target_resolver(0)
        .has_classifier(&id("kotlin/Function3")));
    assert!(classifiers.classifier_index(0).is_empty());
    assert!(!classifiers
        .common_dependencies()
        .has_classifier(&id("kotlin/Function3")));
}

#[test]
fn type_distance_uses_the_target_index() {
    let linux = target(
        package()
            .with_class(CirClassInput::new(CirClass::new(CirName::create("Foo"), ClassKind::Class)))
            .with_type_alias(CirTypeAlias::new(CirName::create("Bar"), class_type("p/Foo"))),
    );
    let classifiers = known(&[linux], &[]);

    assert_eq!(
        classifiers
            .type_distance(0, &class_type("p/Foo"), &id("p/Bar"))
            .get(),
        Some(-1)
    );
}
