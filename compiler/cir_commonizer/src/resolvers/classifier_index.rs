//! Classifiers declared by one target's own input.
//!
//! During commonization a target's declarations shadow anything its
//! dependencies provide under the same id, so the index is the first layer
//! of every per-target resolver chain.

use std::sync::Arc;

use cir_ir::{
    CirClass, CirClassOrTypeAliasType, CirClassType, CirEntityId, CirPackageName,
    CirProvidedClassOrTypeAliasType, CirProvidedClassifier, CirProvidedType, CirType,
    CirTypeAlias, CirTypeParameter, CirTypeProjection, ProvidedClass, ProvidedTypeAlias,
    ProvidedTypeParameter, ProvidedTypeProjection,
};
use rustc_hash::FxHashMap;

use super::CirProvidedClassifiers;
use crate::input::{CirClassInput, CirTargetInput};

/// A classifier declaration of the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CirClassifier {
    Class(CirClass),
    TypeAlias(CirTypeAlias),
}

struct IndexEntry {
    declaration: CirClassifier,
    provided: Arc<CirProvidedClassifier>,
}

/// Index of the classes and type aliases of one target.
#[derive(Default)]
pub struct CirClassifierIndex {
    entries: FxHashMap<CirEntityId, IndexEntry>,
    type_aliases_by_underlying: FxHashMap<CirEntityId, Vec<CirEntityId>>,
}

impl CirClassifierIndex {
    #[tracing::instrument(level = "debug", skip_all, fields(target = %input.target))]
    pub fn build(input: &CirTargetInput) -> Self {
        let mut index = Self::default();
        for module in &input.modules {
            for package in &module.packages {
                let package_name = &package.package.package_name;
                for class in &package.classes {
                    let class_id = CirEntityId::create(package_name.clone(), class.class.name);
                    index.add_class(class_id, class, 0);
                }
                for type_alias in &package.type_aliases {
                    index.add_type_alias(package_name, type_alias);
                }
            }
        }
        tracing::debug!(classifiers = index.entries.len(), "indexed target classifiers");
        index
    }

    fn add_class(&mut self, class_id: CirEntityId, input: &CirClassInput, offset: u32) {
        let class = &input.class;
        let provided = CirProvidedClassifier::Class(ProvidedClass {
            type_parameters: provided_type_parameters(&class.type_parameters, offset),
            supertypes: class.supertypes.iter().map(provided_type).collect(),
            visibility: class.visibility,
            kind: class.kind,
        });
        if !self.insert(class_id.clone(), CirClassifier::Class(class.clone()), provided) {
            return;
        }

        let nested_offset = offset.saturating_add(len_u32(&class.type_parameters));
        for nested in &input.nested {
            let nested_id = class_id.create_nested(nested.class.name);
            self.add_class(nested_id, nested, nested_offset);
        }
    }

    fn add_type_alias(&mut self, package_name: &CirPackageName, type_alias: &CirTypeAlias) {
        let alias_id = CirEntityId::create(package_name.clone(), type_alias.name);
        let underlying_id = type_alias.underlying_type.classifier_id().clone();
        let provided = CirProvidedClassifier::TypeAlias(ProvidedTypeAlias {
            type_parameters: provided_type_parameters(&type_alias.type_parameters, 0),
            underlying_type: provided_classifier_type(&type_alias.underlying_type),
            visibility: type_alias.visibility,
        });
        if self.insert(
            alias_id.clone(),
            CirClassifier::TypeAlias(type_alias.clone()),
            provided,
        ) {
            self.type_aliases_by_underlying
                .entry(underlying_id)
                .or_default()
                .push(alias_id);
        }
    }

    /// First declaration of an id wins.
    fn insert(
        &mut self,
        id: CirEntityId,
        declaration: CirClassifier,
        provided: CirProvidedClassifier,
    ) -> bool {
        match self.entries.entry(id) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                tracing::trace!(id = %entry.key(), "classifier declared twice in one target");
                false
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(IndexEntry {
                    declaration,
                    provided: Arc::new(provided),
                });
                true
            }
        }
    }

    /// The class or type alias this target declares under `id`.
    pub fn find_classifier(&self, id: &CirEntityId) -> Option<&CirClassifier> {
        self.entries.get(id).map(|entry| &entry.declaration)
    }

    pub fn classifier_ids(&self) -> impl Iterator<Item = &CirEntityId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CirProvidedClassifiers for CirClassifierIndex {
    fn has_classifier(&self, id: &CirEntityId) -> bool {
        self.entries.contains_key(id)
    }

    fn classifier(&self, id: &CirEntityId) -> Option<Arc<CirProvidedClassifier>> {
        self.entries.get(id).map(|entry| Arc::clone(&entry.provided))
    }

    fn find_type_aliases_with_underlying_type(&self, id: &CirEntityId) -> Vec<CirEntityId> {
        self.type_aliases_by_underlying
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "declarations have far fewer than u32::MAX type parameters"
)]
fn len_u32<T>(items: &[T]) -> u32 {
    items.len() as u32
}

fn provided_type_parameters(
    type_parameters: &[CirTypeParameter],
    offset: u32,
) -> Vec<ProvidedTypeParameter> {
    (offset..)
        .zip(type_parameters)
        .map(|(index, parameter)| ProvidedTypeParameter {
            index,
            variance: parameter.variance,
        })
        .collect()
}

fn provided_type(ty: &CirType) -> CirProvidedType {
    match ty {
        CirType::ClassOrTypeAlias(ty) => {
            CirProvidedType::ClassOrTypeAlias(provided_classifier_type(ty))
        }
        CirType::TypeParameter(ty) => CirProvidedType::TypeParameter {
            index: ty.index,
            is_marked_nullable: ty.is_marked_nullable,
        },
    }
}

/// Convert a CIR classifier type to the provided model. Type-alias types keep
/// only their id; the underlying type is resolved through the alias itself.
pub(crate) fn provided_classifier_type(
    ty: &CirClassOrTypeAliasType,
) -> CirProvidedClassOrTypeAliasType {
    cir_ir::ensure_sufficient_stack(|| match ty {
        CirClassOrTypeAliasType::Class(class_type) => provided_class_type(class_type),
        CirClassOrTypeAliasType::TypeAlias(alias_type) => {
            CirProvidedClassOrTypeAliasType::TypeAlias {
                type_alias_id: alias_type.type_alias_id.clone(),
                arguments: alias_type.arguments.iter().map(provided_projection).collect(),
                is_marked_nullable: alias_type.is_marked_nullable,
            }
        }
    })
}

fn provided_class_type(ty: &CirClassType) -> CirProvidedClassOrTypeAliasType {
    CirProvidedClassOrTypeAliasType::Class {
        class_id: ty.class_id.clone(),
        outer_type: ty
            .outer_type
            .as_deref()
            .map(|outer| Box::new(provided_class_type(outer))),
        arguments: ty.arguments.iter().map(provided_projection).collect(),
        is_marked_nullable: ty.is_marked_nullable,
    }
}

fn provided_projection(projection: &CirTypeProjection) -> ProvidedTypeProjection {
    match projection {
        CirTypeProjection::Star => ProvidedTypeProjection::Star,
        CirTypeProjection::Regular {
            projection_kind,
            ty,
        } => ProvidedTypeProjection::Regular {
            variance: *projection_kind,
            ty: provided_type(ty),
        },
    }
}
