use super::*;
use pretty_assertions::assert_eq;

#[test]
fn names_compare_by_text() {
    let b = CirName::create("b_name");
    let a = CirName::create("a_name");
    assert!(a < b);
    assert_eq!(a, CirName::create("a_name"));
    assert_eq!(a.as_str(), "a_name");
}

#[test]
fn package_name_accepts_both_separators() {
    let dotted = CirPackageName::create("kotlin.collections");
    let slashed = CirPackageName::create("kotlin/collections");
    assert_eq!(dotted, slashed);
    assert_eq!(dotted.to_string(), "kotlin.collections");
    assert!(CirPackageName::create("").is_root());
}

#[test]
fn package_prefix() {
    let package = CirPackageName::create("objcnames.classes.inner");
    assert!(package.starts_with(&CirPackageName::create("objcnames.classes")));
    assert!(!package.starts_with(&CirPackageName::create("objcnames.protocols")));
    assert!(package.starts_with(&CirPackageName::root()));
}

#[test]
fn parse_nested_class_id() {
    let id = CirEntityId::parse("kotlin/collections/Map.Entry");
    let Some(id) = id else {
        panic!("id should parse");
    };
    assert_eq!(id.package_name(), &CirPackageName::create("kotlin.collections"));
    assert_eq!(id.simple_name(), CirName::create("Entry"));
    assert!(id.is_nested());
    assert_eq!(id.to_string(), "kotlin/collections/Map.Entry");

    let outer = id.outer_class_id();
    assert_eq!(outer, CirEntityId::parse("kotlin/collections/Map"));
}

#[test]
fn root_package_ids_render_without_slash() {
    let id = CirEntityId::create(CirPackageName::root(), CirName::create("Top"));
    assert_eq!(id.to_string(), "Top");
    assert_eq!(CirEntityId::parse("Top"), Some(id));
}

#[test]
fn empty_relative_name_is_rejected() {
    assert_eq!(CirEntityId::parse("pkg/"), None);
    assert_eq!(
        CirEntityId::create_relative(CirPackageName::create("pkg"), []),
        None
    );
}

#[test]
fn ids_differ_by_any_component() {
    let a = CirEntityId::parse("p/Foo");
    let b = CirEntityId::parse("q/Foo");
    let c = CirEntityId::parse("p/Outer.Foo");
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn nested_and_moved_ids() {
    let Some(outer) = CirEntityId::parse("p/Outer") else {
        panic!("id should parse");
    };
    let inner = outer.create_nested(CirName::create("Inner"));
    assert_eq!(inner.to_string(), "p/Outer.Inner");
    let moved = inner.with_package(CirPackageName::create("q.r"));
    assert_eq!(moved.to_string(), "q/r/Outer.Inner");
}
