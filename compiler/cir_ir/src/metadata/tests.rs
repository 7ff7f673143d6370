use super::*;
use crate::{CirEntityId, ClassFlags, ClassKind, Modality, Visibility};
use pretty_assertions::assert_eq;

fn id(s: &str) -> CirEntityId {
    match CirEntityId::parse(s) {
        Some(id) => id,
        None => panic!("bad id {s}"),
    }
}

#[test]
fn class_flags_survive_encoding() {
    let flags = Flags::for_class(
        Visibility::Protected,
        Modality::Sealed,
        ClassKind::EnumClass,
        ClassFlags::INNER | ClassFlags::HAS_ENUM_ENTRIES,
    );
    assert_eq!(flags.visibility(), Visibility::Protected);
    assert_eq!(flags.modality(), Modality::Sealed);
    assert_eq!(flags.class_kind(), ClassKind::EnumClass);
    assert_eq!(
        flags.class_flags(),
        ClassFlags::INNER | ClassFlags::HAS_ENUM_ENTRIES
    );
    assert!(!flags.has_annotations());
}

#[test]
fn companion_kind_sets_companion_flag() {
    let flags = Flags::for_class(
        Visibility::Public,
        Modality::Final,
        ClassKind::CompanionObject,
        ClassFlags::empty(),
    );
    assert_eq!(flags.class_kind(), ClassKind::CompanionObject);
    assert!(flags.class_flags().contains(ClassFlags::COMPANION));
}

#[test]
fn raw_visibility_values() {
    // internal = 0, private = 1, protected = 2, public = 3, private-to-this = 4, local = 5
    assert_eq!(Flags(0).visibility(), Visibility::Internal);
    assert_eq!(Flags(1 << 1).visibility(), Visibility::Private);
    assert_eq!(Flags(2 << 1).visibility(), Visibility::Protected);
    assert_eq!(Flags(3 << 1).visibility(), Visibility::Public);
    assert_eq!(Flags(4 << 1).visibility(), Visibility::Private);
    assert_eq!(Flags::local_class().visibility(), Visibility::Private);
    assert!(Flags(1).has_annotations());
}

#[test]
fn name_resolver_builds_nested_class_ids() {
    let mut builder = PackageFragmentBuilder::new();
    let entry = builder.class_name(&id("kotlin/collections/Map.Entry"));
    let map = builder.class_name(&id("kotlin/collections/Map"));
    let local = builder.local_class_name(&id("kotlin/collections/Map"), "Hidden");
    let fragment = builder.build();
    let resolver = NameResolver::new(&fragment);

    assert_eq!(
        resolver.qualified_class_name(entry).as_deref(),
        Some("kotlin/collections/Map.Entry")
    );
    assert_eq!(resolver.class_id(map), Some(id("kotlin/collections/Map")));
    assert!(!resolver.is_local_class_name(entry));
    assert!(resolver.is_local_class_name(local));
}

#[test]
fn builder_shares_name_entries() {
    let mut builder = PackageFragmentBuilder::new();
    let first = builder.class_name(&id("p/A"));
    let again = builder.class_name(&id("p/A"));
    let other = builder.class_name(&id("p/B"));
    assert_eq!(first, again);
    assert_ne!(first, other);
    let fragment = builder.build();
    // "p", "A", "B"
    assert_eq!(fragment.strings.strings.len(), 3);
    assert_eq!(fragment.qualified_names.qualified_names.len(), 3);
    assert!(fragment.package.is_none());
}

#[test]
fn dangling_indices_resolve_to_none() {
    let fragment = PackageFragmentProto::default();
    let resolver = NameResolver::new(&fragment);
    assert_eq!(resolver.class_id(7), None);
    assert_eq!(resolver.string(0), None);
    assert!(!resolver.is_local_class_name(7));
}

#[test]
fn cyclic_names_resolve_to_none() {
    let fragment = PackageFragmentProto {
        strings: StringTable {
            strings: vec!["A".to_owned()],
        },
        qualified_names: QualifiedNameTable {
            qualified_names: vec![QualifiedName {
                parent_qualified_name: Some(0),
                short_name: 0,
                kind: QualifiedNameKind::Class,
            }],
        },
        ..PackageFragmentProto::default()
    };
    assert_eq!(NameResolver::new(&fragment).class_id(0), None);
}

#[test]
fn in_memory_provider_reports_missing_modules() {
    let mut provider = InMemoryModulesProvider::new().with_module(
        ModuleInfo::new("a"),
        SerializedMetadata::default().with_package("p", Vec::new()),
    );
    provider.add_module_info(ModuleInfo::new("b"));

    assert_eq!(provider.module_infos().len(), 2);
    let Ok(metadata) = provider.load_module_metadata("a") else {
        panic!("module a should load");
    };
    assert_eq!(metadata.packages().count(), 1);
    assert_eq!(
        provider.load_module_metadata("b"),
        Err(ModuleLoadError::NotFound {
            name: "b".to_owned()
        })
    );
}
