#![expect(clippy::unwrap_used, reason = "tests unwrap fixture ids")]

use super::*;
use cir_ir::{
    CirClass, CirClassType, CirModule, CirName, CirPackage, CirPackageName, CirTypeAlias,
    CirTypeAliasType, ClassKind, CommonizerTarget,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::input::{CirClassInput, CirModuleInput, CirPackageInput, CirTargetInput};
use crate::resolvers::CirClassifierIndex;

fn id(s: &str) -> CirEntityId {
    CirEntityId::parse(s).unwrap()
}

fn class_type(s: &str) -> CirClassOrTypeAliasType {
    CirClassOrTypeAliasType::Class(CirClassType::new(id(s), Vec::new(), false))
}

fn alias_type(s: &str, underlying: CirClassOrTypeAliasType) -> CirClassOrTypeAliasType {
    CirClassOrTypeAliasType::TypeAlias(CirTypeAliasType::new(id(s), underlying, Vec::new(), false))
}

/// `Foo`, `Other`, `Bar = Foo`, `Baz = Bar`, `Qux = Foo`.
fn index() -> CirClassifierIndex {
    let bar = alias_type("p/Bar", class_type("p/Foo"));
    let package = CirPackageInput::new(CirPackage {
        package_name: CirPackageName::create("p"),
    })
    .with_class(CirClassInput::new(CirClass::new(CirName::create("Foo"), ClassKind::Class)))
    .with_class(CirClassInput::new(CirClass::new(CirName::create("Other"), ClassKind::Class)))
    .with_type_alias(CirTypeAlias::new(CirName::create("Bar"), class_type("p/Foo")))
    .with_type_alias(CirTypeAlias::new(CirName::create("Baz"), bar))
    .with_type_alias(CirTypeAlias::new(CirName::create("Qux"), class_type("p/Foo")));
    let input = CirTargetInput::new(CommonizerTarget::leaf("linux_x64")).with_module(
        CirModuleInput::new(CirModule {
            name: CirName::create("lib"),
        })
        .with_package(package),
    );
    CirClassifierIndex::build(&input)
}

#[test]
fn same_classifier_is_zero() {
    let index = index();
    assert_eq!(
        type_distance(&index, &class_type("p/Foo"), &id("p/Foo")),
        CirTypeDistance::ZERO
    );
}

#[test]
fn forward_distance_counts_expansions() {
    let index = index();
    let baz = alias_type("p/Baz", alias_type("p/Bar", class_type("p/Foo")));

    assert_eq!(type_distance(&index, &baz, &id("p/Bar")).get(), Some(1));
    assert_eq!(type_distance(&index, &baz, &id("p/Foo")).get(), Some(2));
}

#[test]
fn backward_distance_is_negative() {
    let index = index();
    let foo = class_type("p/Foo");

    assert_eq!(type_distance(&index, &foo, &id("p/Bar")).get(), Some(-1));
    assert_eq!(type_distance(&index, &foo, &id("p/Baz")).get(), Some(-2));
}

#[test]
fn sibling_aliases_meet_through_the_expansion() {
    let index = index();
    let qux = alias_type("p/Qux", class_type("p/Foo"));

    // Qux -> Foo is one hop forward, Foo -> Bar one hop backward.
    assert_eq!(type_distance(&index, &qux, &id("p/Bar")).get(), Some(-2));
}

#[test]
fn unrelated_classifiers_are_unreachable() {
    let index = index();

    assert!(type_distance(&index, &class_type("p/Foo"), &id("p/Other")).is_unreachable());
    assert!(type_distance(&index, &class_type("p/Foo"), &id("p/Missing")).is_unreachable());
    assert!(backward_type_distance(&index, &id("p/Other"), &id("p/Bar")).is_unreachable());
}

#[test]
fn forward_distance_ignores_resolvers() {
    let baz = alias_type("p/Baz", alias_type("p/Bar", class_type("p/Foo")));

    assert_eq!(forward_type_distance(&baz, &id("p/Baz")), CirTypeDistance::ZERO);
    assert!(forward_type_distance(&class_type("p/Foo"), &id("p/Bar")).is_unreachable());
}

#[test]
fn penalties_rank_zero_then_forward_then_backward() {
    let ranked = [
        CirTypeDistance::ZERO,
        CirTypeDistance::new(1),
        CirTypeDistance::new(7),
        CirTypeDistance::new(-1),
        CirTypeDistance::new(-7),
        CirTypeDistance::UNREACHABLE,
    ];
    for pair in ranked.windows(2) {
        assert!(pair[0].penalty() < pair[1].penalty(), "{pair:?}");
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(CirTypeDistance::ZERO.penalty(), CirTypeDistancePenalty::BEST);
    assert!(CirTypeDistance::UNREACHABLE.penalty().is_worst());
}

#[test]
fn construction_never_produces_the_sentinel() {
    assert!(CirTypeDistance::new(i32::MAX).is_reachable());
    assert!((CirTypeDistance::new(i32::MAX - 1) + 5).is_reachable());
    assert_eq!(CirTypeDistance::ZERO.dec().inc(), CirTypeDistance::ZERO);
    assert_eq!(format!("{:?}", CirTypeDistance::UNREACHABLE), "CirTypeDistance(unreachable)");
    assert_eq!(format!("{:?}", CirTypeDistance::new(-3)), "CirTypeDistance(-3)");
}

proptest! {
    #[test]
    fn unreachable_absorbs_arithmetic(hops in any::<i32>()) {
        let reachable = CirTypeDistance::new(hops);
        prop_assert!((CirTypeDistance::UNREACHABLE + hops).is_unreachable());
        prop_assert!((CirTypeDistance::UNREACHABLE - hops).is_unreachable());
        prop_assert!((reachable + CirTypeDistance::UNREACHABLE).is_unreachable());
        prop_assert!((reachable - CirTypeDistance::UNREACHABLE).is_unreachable());
    }

    #[test]
    fn forward_always_beats_backward(forward in 1..i32::MAX - 1, backward in i32::MIN..0) {
        let forward = CirTypeDistance::new(forward);
        let backward = CirTypeDistance::new(backward);
        prop_assert!(CirTypeDistance::ZERO.penalty() < forward.penalty());
        prop_assert!(forward.penalty() < backward.penalty());
        prop_assert!(backward.penalty() < CirTypeDistance::UNREACHABLE.penalty());
    }

    #[test]
    fn penalty_grows_with_magnitude(a in 1..100_000i32, b in 1..100_000i32) {
        prop_assert_eq!(
            CirTypeDistance::new(a).penalty().cmp(&CirTypeDistance::new(b).penalty()),
            a.cmp(&b)
        );
        prop_assert_eq!(
            CirTypeDistance::new(-a).penalty().cmp(&CirTypeDistance::new(-b).penalty()),
            a.cmp(&b)
        );
    }
}
