//! Property-based tests for approximation keys and merging.
//!
//! Keys must be alias-transparent and blind to parameter names, and a
//! library that is identical on every target must commonize completely.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::Arc;

use cir_commonizer::{
    CirClassInput, CirModuleInput, CirPackageInput, CirProvidedClassifiers, CirTargetInput,
    CirTreeMerger, CommonizerSettings, FunctionApproximationKey, SignatureBuildingContext,
};
use cir_ir::{
    CirClass, CirClassOrTypeAliasType, CirClassType, CirEntityId, CirFunction, CirModule,
    CirName, CirPackage, CirPackageName, CirType, CirTypeAliasType, CirValueParameter, ClassKind,
    CommonizerTarget,
};
use proptest::prelude::*;

const CLASSES: [&str; 4] = ["A", "B", "C", "D"];

fn id(s: &str) -> CirEntityId {
    CirEntityId::parse(s).expect("valid id")
}

fn class_type(simple_name: &str, nullable: bool) -> CirType {
    CirClassType::new(id(&format!("p/{simple_name}")), Vec::new(), nullable).into()
}

/// The same class seen through an alias named after it.
fn aliased_type(simple_name: &str, nullable: bool) -> CirType {
    CirTypeAliasType::new(
        id(&format!("p/{simple_name}Alias")),
        CirClassOrTypeAliasType::Class(CirClassType::new(
            id(&format!("p/{simple_name}")),
            Vec::new(),
            false,
        )),
        Vec::new(),
        nullable,
    )
    .into()
}

/// `(class index, nullable, through alias)` per parameter.
fn parameters_strategy() -> impl Strategy<Value = Vec<(usize, bool, bool)>> {
    prop::collection::vec((0..CLASSES.len(), any::<bool>(), any::<bool>()), 0..5)
}

fn function(parameters: &[(usize, bool, bool)], parameter_prefix: &str) -> CirFunction {
    CirFunction::new(
        CirName::create("f"),
        parameters
            .iter()
            .enumerate()
            .map(|(i, &(class, nullable, aliased))| {
                let simple_name = CLASSES[class];
                let ty = if aliased {
                    aliased_type(simple_name, nullable)
                } else {
                    class_type(simple_name, nullable)
                };
                CirValueParameter::new(CirName::create(&format!("{parameter_prefix}{i}")), ty)
            })
            .collect(),
        class_type("A", false),
    )
}

fn plain(parameters: &[(usize, bool, bool)]) -> Vec<(usize, bool, bool)> {
    parameters
        .iter()
        .map(|&(class, nullable, _)| (class, nullable, false))
        .collect()
}

fn library(functions: &[Vec<(usize, bool, bool)>]) -> CirPackageInput {
    let package = CLASSES.iter().fold(
        CirPackageInput::new(CirPackage {
            package_name: CirPackageName::create("p"),
        }),
        |package, simple_name| {
            package.with_class(CirClassInput::new(CirClass::new(
                CirName::create(simple_name),
                ClassKind::Class,
            )))
        },
    );
    functions.iter().fold(package, |package, parameters| {
        package.with_function(function(&plain(parameters), "x"))
    })
}

proptest! {
    #[test]
    fn keys_ignore_aliases_and_names(parameters in parameters_strategy()) {
        let context = SignatureBuildingContext::new();
        let spelled = FunctionApproximationKey::new(&function(&parameters, "x"), &context);
        let expanded = FunctionApproximationKey::new(&function(&plain(&parameters), "y"), &context);
        prop_assert_eq!(spelled, expanded);
    }

    #[test]
    fn keys_differ_when_expansions_differ(
        a in parameters_strategy(),
        b in parameters_strategy(),
    ) {
        let context = SignatureBuildingContext::new();
        let key_a = FunctionApproximationKey::new(&function(&a, "x"), &context);
        let key_b = FunctionApproximationKey::new(&function(&b, "x"), &context);
        let shape = |parameters: &[(usize, bool, bool)]| {
            parameters.iter().map(|&(class, nullable, _)| (class, nullable)).collect::<Vec<_>>()
        };
        prop_assert_eq!(key_a == key_b, shape(&a) == shape(&b));
    }

    #[test]
    fn identical_targets_commonize_everything(
        functions in prop::collection::vec(parameters_strategy(), 1..6),
        target_count in 1..4usize,
        parallel in any::<bool>(),
    ) {
        let targets: Vec<CommonizerTarget> = (0..target_count)
            .map(|i| CommonizerTarget::leaf(format!("target_{i}")))
            .collect();
        let inputs = targets
            .iter()
            .map(|target| {
                CirTargetInput::new(target.clone()).with_module(
                    CirModuleInput::new(CirModule { name: CirName::create("lib") })
                        .with_package(library(&functions)),
                )
            })
            .collect();
        let common: Arc<dyn CirProvidedClassifiers> =
            Arc::new(cir_commonizer::CompositeProvidedClassifiers::default());

        let settings = CommonizerSettings::new(targets).with_parallel(parallel);
        let tree = CirTreeMerger::new(settings, common).merge(inputs).unwrap();
        tree.commonize_all(parallel);

        let package = &tree.root().modules()[&CirName::create("lib")].packages()
            [&CirPackageName::create("p")];
        for node in package.functions().values() {
            prop_assert_eq!(node.present().count(), target_count);
            prop_assert!(node.common_declaration(&tree).is_some());
        }
        for simple_name in CLASSES {
            let class = tree.class_node(&id(&format!("p/{simple_name}"))).unwrap();
            prop_assert!(class.common_declaration(&tree).is_some());
        }
    }
}
