#![expect(clippy::unwrap_used, reason = "tests unwrap fixture results")]

use super::*;
use cir_ir::metadata::{
    CInteropModuleAttributes, ClassProto, Flags, InMemoryModulesProvider, ModuleInfo,
    ModuleLoadError, PackageFragmentBuilder, PackageFragmentProto, SerializedMetadata,
    TypeAliasProto, TypeArgumentProto, TypeClassifierProto, TypeParameterProto, TypeProto,
    TypeTable, VarianceProto,
};
use cir_ir::{
    CirPackageName, CirProvidedClassOrTypeAliasType, CirProvidedType, ClassFlags, ClassKind,
    Modality, ProvidedClass, ProvidedTypeParameter, ProvidedTypeProjection, Variance, Visibility,
};
use pretty_assertions::assert_eq;

use crate::error::CommonizerError;

fn id(s: &str) -> CirEntityId {
    CirEntityId::parse(s).unwrap()
}

fn type_parameter(builder: &mut PackageFragmentBuilder, id: u32, name: &str) -> TypeParameterProto {
    TypeParameterProto {
        id,
        name: builder.string(name),
        reified: false,
        variance: VarianceProto::Inv,
        upper_bounds: Vec::new(),
    }
}

fn class_proto(fq_name: u32, type_parameters: Vec<TypeParameterProto>) -> ClassProto {
    ClassProto {
        flags: Flags::for_class(
            Visibility::Public,
            Modality::Final,
            ClassKind::Class,
            ClassFlags::empty(),
        ),
        fq_name,
        type_parameters,
        supertypes: Vec::new(),
        supertype_ids: Vec::new(),
        type_table: TypeTable::default(),
    }
}

fn alias_proto(
    builder: &mut PackageFragmentBuilder,
    name: &str,
    underlying: &str,
) -> TypeAliasProto {
    let underlying =
        TypeProto::new(TypeClassifierProto::Class(builder.class_name(&id(underlying))));
    TypeAliasProto {
        flags: Flags::for_type_alias(Visibility::Public),
        name: builder.string(name),
        type_parameters: Vec::new(),
        underlying_type: Some(underlying),
        underlying_type_id: None,
    }
}

fn single_module(package: &str, fragment: PackageFragmentProto) -> InMemoryModulesProvider {
    InMemoryModulesProvider::new().with_module(
        ModuleInfo::new("lib"),
        SerializedMetadata::default().with_package(package, vec![fragment]),
    )
}

fn provided_class(resolver: &dyn CirProvidedClassifiers, s: &str) -> ProvidedClass {
    match resolver.classifier(&id(s)).as_deref() {
        Some(CirProvidedClassifier::Class(class)) => class.clone(),
        other => panic!("expected class {s}, got {other:?}"),
    }
}

#[test]
fn nested_class_type_parameters_follow_outer_ones() {
    let mut builder = PackageFragmentBuilder::new();
    // Inner is listed first; it must still be numbered after Outer.
    let inner_name = builder.class_name(&id("p/Outer.Inner"));
    let outer_name = builder.class_name(&id("p/Outer"));
    let u = type_parameter(&mut builder, 1, "U");
    let t = type_parameter(&mut builder, 0, "T");
    let mut inner = class_proto(inner_name, vec![u]);
    let base = builder.class_name(&id("p/Base"));
    inner.supertypes.push(
        TypeProto::new(TypeClassifierProto::Class(base)).with_arguments(vec![
            TypeArgumentProto::invariant(TypeProto::new(TypeClassifierProto::TypeParameter(0))),
        ]),
    );
    builder.add_class(inner);
    builder.add_class(class_proto(outer_name, vec![t]));

    let resolver =
        ProvidedClassifiersByModules::load(&single_module("p", builder.build())).unwrap();

    assert_eq!(
        provided_class(&resolver, "p/Outer").type_parameters,
        vec![ProvidedTypeParameter {
            index: 0,
            variance: Variance::Invariant,
        }]
    );
    let inner = provided_class(&resolver, "p/Outer.Inner");
    assert_eq!(
        inner.type_parameters,
        vec![ProvidedTypeParameter {
            index: 1,
            variance: Variance::Invariant,
        }]
    );
    assert_eq!(
        inner.supertypes,
        vec![CirProvidedType::ClassOrTypeAlias(
            CirProvidedClassOrTypeAliasType::Class {
                class_id: id("p/Base"),
                outer_type: None,
                arguments: vec![ProvidedTypeProjection::Regular {
                    variance: Variance::Invariant,
                    ty: CirProvidedType::TypeParameter {
                        index: 0,
                        is_marked_nullable: false,
                    },
                }],
                is_marked_nullable: false,
            }
        )]
    );
}

#[test]
fn local_classes_are_not_provided() {
    let mut builder = PackageFragmentBuilder::new();
    let holder = builder.class_name(&id("p/Holder"));
    let local = builder.local_class_name(&id("p/Holder"), "Hidden");
    builder.add_class(class_proto(holder, Vec::new()));
    builder.add_class(class_proto(local, Vec::new()));

    let resolver =
        ProvidedClassifiersByModules::load(&single_module("p", builder.build())).unwrap();

    assert_eq!(resolver.len(), 1);
    assert!(resolver.has_classifier(&id("p/Holder")));
    assert!(!resolver.has_classifier(&id("p/Holder.Hidden")));
}

#[test]
fn type_aliases_are_indexed_by_underlying_type() {
    let mut builder = PackageFragmentBuilder::new();
    let target = builder.class_name(&id("p/Target"));
    builder.add_class(class_proto(target, Vec::new()));
    let first = alias_proto(&mut builder, "First", "p/Target");
    let second = alias_proto(&mut builder, "Second", "p/Target");
    builder.add_type_alias(first).add_type_alias(second);

    let resolver =
        ProvidedClassifiersByModules::load(&single_module("p", builder.build())).unwrap();

    assert!(resolver
        .classifier(&id("p/First"))
        .is_some_and(|classifier| classifier.is_type_alias()));
    assert_eq!(
        resolver.find_type_aliases_with_underlying_type(&id("p/Target")),
        vec![id("p/First"), id("p/Second")]
    );
    assert!(resolver
        .find_type_aliases_with_underlying_type(&id("p/First"))
        .is_empty());
}

#[test]
fn first_module_wins_on_collision() {
    let fragment = |kind: ClassKind| {
        let mut builder = PackageFragmentBuilder::new();
        let name = builder.class_name(&id("p/Shared"));
        let mut class = class_proto(name, Vec::new());
        class.flags =
            Flags::for_class(Visibility::Public, Modality::Final, kind, ClassFlags::empty());
        builder.add_class(class);
        builder.build()
    };
    let modules = InMemoryModulesProvider::new()
        .with_module(
            ModuleInfo::new("first"),
            SerializedMetadata::default().with_package("p", vec![fragment(ClassKind::Interface)]),
        )
        .with_module(
            ModuleInfo::new("second"),
            SerializedMetadata::default().with_package("p", vec![fragment(ClassKind::Object)]),
        );

    let resolver = ProvidedClassifiersByModules::load(&modules).unwrap();

    assert_eq!(provided_class(&resolver, "p/Shared").kind, ClassKind::Interface);
}

#[test]
fn missing_module_is_a_load_error() {
    let mut modules = InMemoryModulesProvider::new();
    modules.add_module_info(ModuleInfo::new("ghost"));

    match ProvidedClassifiersByModules::load(&modules) {
        Err(CommonizerError::ModuleLoad {
            module,
            source: ModuleLoadError::NotFound { .. },
        }) => assert_eq!(module, "ghost"),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("loading a missing module succeeded"),
    }
}

#[test]
fn dangling_class_name_is_malformed() {
    let mut builder = PackageFragmentBuilder::new();
    builder.add_class(class_proto(99, Vec::new()));

    let result = ProvidedClassifiersByModules::load(&single_module("p", builder.build()));

    assert!(matches!(
        result,
        Err(CommonizerError::ModuleLoad {
            source: ModuleLoadError::Malformed { .. },
            ..
        })
    ));
}

fn interop_target(main_package: &str, exported: &[&str]) -> InMemoryModulesProvider {
    let attributes = CInteropModuleAttributes {
        main_package: CirPackageName::create(main_package),
        exported_forward_declarations: exported.iter().map(|s| id(s)).collect(),
    };
    InMemoryModulesProvider::new().with_module(
        ModuleInfo::new("interop").with_cinterop_attributes(attributes),
        SerializedMetadata::default(),
    )
}

#[test]
fn forward_declarations_resolve_equally_under_the_main_package() {
    let linux = interop_target("platform.posix", &["cnames.structs/stat"]);
    let macos = interop_target("platform.posix", &["cnames.structs/stat", "cnames.structs/dirent"]);

    let union = ProvidedClassifiersByModules::load_exported_forward_declarations(&[&linux, &macos]);

    let synthetic = union.classifier(&id("cnames.structs/stat")).unwrap();
    let shared = union.classifier(&id("platform.posix/stat")).unwrap();
    assert_eq!(synthetic, shared);
    assert_eq!(
        *shared,
        CirProvidedClassifier::ExportedForwardDeclaration {
            synthetic_class_id: id("cnames.structs/stat"),
        }
    );
    assert!(union.has_classifier(&id("platform.posix/dirent")));
    assert_eq!(union.len(), 4);
}

#[test]
fn synthetic_packages_fall_back_to_a_generic_declaration() {
    let union = ProvidedClassifiersByModules::load_exported_forward_declarations(&[]);

    assert!(union.is_empty());
    assert!(union.has_classifier(&id("cnames.structs/anything")));
    assert!(union.has_classifier(&id("objcnames.protocols/NSCopyingProtocol")));
    assert!(!union.has_classifier(&id("platform.posix/anything")));
    assert!(matches!(
        union.classifier(&id("objcnames.classes/NSObject")).as_deref(),
        Some(CirProvidedClassifier::Class(class))
            if class.visibility == Visibility::Public && class.type_parameters.is_empty()
    ));

    let plain = ProvidedClassifiersByModules::load(&InMemoryModulesProvider::new()).unwrap();
    assert!(!plain.has_classifier(&id("cnames.structs/anything")));
}

#[test]
fn function_interfaces_cover_all_arities() {
    let functions = FictitiousFunctionClassifiers::new();

    assert_eq!(functions.len(), 2 * (MAX_FUNCTION_ARITY as usize + 1));
    assert!(functions.has_classifier(&id("kotlin/Function0")));
    assert!(functions.has_classifier(&id("kotlin/SuspendFunction255")));
    assert!(!functions.has_classifier(&id("kotlin/Function256")));

    let function2 = provided_class(&functions, "kotlin/Function2");
    assert_eq!(function2.kind, ClassKind::Interface);
    assert_eq!(
        function2
            .type_parameters
            .iter()
            .map(|parameter| (parameter.index, parameter.variance))
            .collect::<Vec<_>>(),
        vec![(0, Variance::In), (1, Variance::In), (2, Variance::Out)]
    );
    assert_eq!(
        function2.supertypes,
        vec![CirProvidedType::ClassOrTypeAlias(
            CirProvidedClassOrTypeAliasType::Class {
                class_id: id("kotlin/Function"),
                outer_type: None,
                arguments: vec![ProvidedTypeProjection::Regular {
                    variance: Variance::Invariant,
                    ty: CirProvidedType::TypeParameter {
                        index: 2,
                        is_marked_nullable: false,
                    },
                }],
                is_marked_nullable: false,
            }
        )]
    );
    assert!(functions
        .find_type_aliases_with_underlying_type(&id("kotlin/Function1"))
        .is_empty());
}

#[test]
fn composite_prefers_earlier_layers() {
    let layer = |kind: ClassKind, alias: &str| -> Arc<dyn CirProvidedClassifiers> {
        let mut builder = PackageFragmentBuilder::new();
        let name = builder.class_name(&id("p/Shared"));
        let mut class = class_proto(name, Vec::new());
        class.flags =
            Flags::for_class(Visibility::Public, Modality::Final, kind, ClassFlags::empty());
        builder.add_class(class);
        let alias = alias_proto(&mut builder, alias, "p/Shared");
        builder.add_type_alias(alias);
        Arc::new(ProvidedClassifiersByModules::load(&single_module("p", builder.build())).unwrap())
    };
    let composite = CompositeProvidedClassifiers::new(vec![
        layer(ClassKind::Interface, "A"),
        layer(ClassKind::Object, "B"),
        layer(ClassKind::Object, "A"),
    ]);

    assert_eq!(composite.layers().len(), 3);
    assert_eq!(provided_class(&composite, "p/Shared").kind, ClassKind::Interface);
    assert_eq!(
        composite.find_type_aliases_with_underlying_type(&id("p/Shared")),
        vec![id("p/A"), id("p/B")]
    );
    assert!(!composite.has_classifier(&id("p/Missing")));
    assert!(CompositeProvidedClassifiers::default()
        .classifier(&id("p/Shared"))
        .is_none());
}
