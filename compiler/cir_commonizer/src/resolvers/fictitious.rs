//! Function-type interfaces that no library declares.
//!
//! `kotlin/Function{N}` and `kotlin/SuspendFunction{N}` are synthesized by
//! the compiler, so they never appear in dependency metadata. Types that
//! mention them still need to resolve.

use std::sync::Arc;

use cir_ir::{
    CirEntityId, CirName, CirPackageName, CirProvidedClassOrTypeAliasType, CirProvidedClassifier,
    CirProvidedType, ClassKind, ProvidedClass, ProvidedTypeParameter, ProvidedTypeProjection,
    Variance, Visibility,
};
use rustc_hash::FxHashMap;

use super::CirProvidedClassifiers;

/// Highest synthesized arity.
pub const MAX_FUNCTION_ARITY: u32 = 255;

/// All function interfaces of arity `0..=MAX_FUNCTION_ARITY`.
pub struct FictitiousFunctionClassifiers {
    classifiers: FxHashMap<CirEntityId, Arc<CirProvidedClassifier>>,
}

impl FictitiousFunctionClassifiers {
    pub fn new() -> Self {
        let package = CirPackageName::create("kotlin");
        let function_id = CirEntityId::create(package.clone(), CirName::create("Function"));

        let mut classifiers = FxHashMap::default();
        for arity in 0..=MAX_FUNCTION_ARITY {
            let classifier = Arc::new(function_interface(&function_id, arity));
            for prefix in ["Function", "SuspendFunction"] {
                let id = CirEntityId::create(
                    package.clone(),
                    CirName::create(&format!("{prefix}{arity}")),
                );
                classifiers.insert(id, Arc::clone(&classifier));
            }
        }
        Self { classifiers }
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl Default for FictitiousFunctionClassifiers {
    fn default() -> Self {
        Self::new()
    }
}

/// `interface FunctionN<in P0, .., in PN-1, out R> : Function<R>`
fn function_interface(function_id: &CirEntityId, arity: u32) -> CirProvidedClassifier {
    let type_parameters = (0..=arity)
        .map(|index| ProvidedTypeParameter {
            index,
            variance: if index == arity {
                Variance::Out
            } else {
                Variance::In
            },
        })
        .collect();
    let supertype = CirProvidedType::ClassOrTypeAlias(CirProvidedClassOrTypeAliasType::Class {
        class_id: function_id.clone(),
        outer_type: None,
        arguments: vec![ProvidedTypeProjection::Regular {
            variance: Variance::Invariant,
            ty: CirProvidedType::TypeParameter {
                index: arity,
                is_marked_nullable: false,
            },
        }],
        is_marked_nullable: false,
    });
    CirProvidedClassifier::Class(ProvidedClass {
        type_parameters,
        supertypes: vec![supertype],
        visibility: Visibility::Public,
        kind: ClassKind::Interface,
    })
}

impl CirProvidedClassifiers for FictitiousFunctionClassifiers {
    fn has_classifier(&self, id: &CirEntityId) -> bool {
        self.classifiers.contains_key(id)
    }

    fn classifier(&self, id: &CirEntityId) -> Option<Arc<CirProvidedClassifier>> {
        self.classifiers.get(id).cloned()
    }

    fn find_type_aliases_with_underlying_type(&self, _id: &CirEntityId) -> Vec<CirEntityId> {
        Vec::new()
    }
}
