//! Type commonization.
//!
//! Types referring to the same classifier in every target commonize
//! argument-wise. Types referring to different classifiers are unified on
//! the candidate classifier with the smallest worst-case type distance,
//! which is either a common point on their alias chains or an alias that
//! expands to them.

use std::collections::BTreeSet;

use cir_ir::{
    ensure_sufficient_stack, CirClassOrTypeAliasType, CirClassType, CirEntityId, CirType,
    CirTypeAlias, CirTypeAliasType, CirTypeParameterType, CirTypeProjection,
};

use smallvec::SmallVec;

use crate::resolvers::CirProvidedClassifiers;
use crate::tree::{CirNode, CirTree, ClassNodeId};

use super::commonize_class_header;

/// Commonize one type per present target. `types` is non-empty.
pub(crate) fn commonize_type(tree: &CirTree, types: &[(usize, &CirType)]) -> Option<CirType> {
    let &(_, first) = types.first()?;
    match first {
        CirType::TypeParameter(parameter) => {
            let same = types.iter().all(|(_, ty)| match ty {
                CirType::TypeParameter(other) => other == parameter,
                CirType::ClassOrTypeAlias(_) => false,
            });
            same.then_some(CirType::TypeParameter(CirTypeParameterType {
                index: parameter.index,
                is_marked_nullable: parameter.is_marked_nullable,
            }))
        }
        CirType::ClassOrTypeAlias(_) => {
            let classifier_types = types
                .iter()
                .map(|&(index, ty)| ty.as_class_or_type_alias().map(|ty| (index, ty)))
                .collect::<Option<Vec<_>>>()?;
            commonize_classifier_types(tree, &classifier_types).map(CirType::ClassOrTypeAlias)
        }
    }
}

/// Commonize one class or type-alias type per present target.
pub(crate) fn commonize_classifier_types(
    tree: &CirTree,
    types: &[(usize, &CirClassOrTypeAliasType)],
) -> Option<CirClassOrTypeAliasType> {
    ensure_sufficient_stack(|| {
        let (&(_, first), rest) = types.split_first()?;
        let nullable = first.is_marked_nullable();
        if rest.iter().any(|(_, ty)| ty.is_marked_nullable() != nullable) {
            return None;
        }
        let id = first.classifier_id();
        if rest.iter().all(|(_, ty)| ty.classifier_id() == id) {
            commonize_same_classifier(tree, types)
        } else {
            commonize_by_type_distance(tree, types)
        }
    })
}

/// Whether `id` names a classifier that exists in the common output.
///
/// Decided from headers only. Nothing here reads a node's memoized common
/// declaration, so commonizing a classifier never waits on itself.
pub(crate) fn is_available_in_common(tree: &CirTree, id: &CirEntityId) -> bool {
    let classifiers = tree.classifiers();
    let class = classifiers.class_node_id(id);
    let type_alias = classifiers.type_alias_node_id(id);
    if class.is_none() && type_alias.is_none() {
        return is_provided_in_common(tree, id);
    }
    class.is_some_and(|node_id| is_class_node_available(tree, node_id))
        || type_alias.is_some_and(|node_id| {
            type_alias_header_agrees(tree, tree.arena().type_alias(node_id).node())
        })
}

/// An alias is available when its targets agree on visibility and arity,
/// and all of them expand to one class that is itself available.
pub(crate) fn type_alias_header_agrees(
    tree: &CirTree,
    node: &CirNode<CirTypeAlias, CirTypeAlias>,
) -> bool {
    let mut present = node.present().map(|(_, alias)| alias);
    let Some(first) = present.next() else {
        return false;
    };
    let expanded = &first.expanded_type.class_id;
    present.all(|alias| {
        alias.visibility == first.visibility
            && alias.type_parameters.len() == first.type_parameters.len()
            && alias.expanded_type.class_id == *expanded
    }) && is_class_available(tree, expanded)
}

/// Class availability only; an expansion is never an alias.
fn is_class_available(tree: &CirTree, id: &CirEntityId) -> bool {
    match tree.classifiers().class_node_id(id) {
        Some(node_id) => is_class_node_available(tree, node_id),
        None => is_provided_in_common(tree, id),
    }
}

fn is_class_node_available(tree: &CirTree, node_id: ClassNodeId) -> bool {
    commonize_class_header(tree.arena().class(node_id).node()).is_some()
}

fn is_provided_in_common(tree: &CirTree, id: &CirEntityId) -> bool {
    let classifiers = tree.classifiers();
    classifiers.common_dependencies().has_classifier(id)
        || classifiers.fictitious_functions().has_classifier(id)
        || classifiers.forward_declarations().has_classifier(id)
}

fn commonize_same_classifier(
    tree: &CirTree,
    types: &[(usize, &CirClassOrTypeAliasType)],
) -> Option<CirClassOrTypeAliasType> {
    let &(_, first) = types.first()?;
    let id = first.classifier_id();
    if !is_available_in_common(tree, id) {
        return None;
    }
    let arguments = commonize_arguments(
        tree,
        &types
            .iter()
            .map(|&(index, ty)| (index, ty.arguments()))
            .collect::<Vec<_>>(),
    )?;
    let nullable = first.is_marked_nullable();

    match first {
        CirClassOrTypeAliasType::Class(first_class) => {
            let outer_types = types
                .iter()
                .map(|&(index, ty)| match ty {
                    CirClassOrTypeAliasType::Class(class_type) => {
                        Some((index, class_type.outer_type.as_deref()))
                    }
                    CirClassOrTypeAliasType::TypeAlias(_) => None,
                })
                .collect::<Option<Vec<_>>>()?;
            let outer_type = commonize_outer_types(tree, &outer_types)?;
            Some(CirClassOrTypeAliasType::Class(CirClassType {
                class_id: first_class.class_id.clone(),
                outer_type,
                arguments,
                is_marked_nullable: nullable,
            }))
        }
        CirClassOrTypeAliasType::TypeAlias(first_alias) => {
            let underlying_types = types
                .iter()
                .map(|&(index, ty)| ty.underlying_type().map(|underlying| (index, underlying)))
                .collect::<Option<Vec<_>>>()?;
            let underlying_type = commonize_classifier_types(tree, &underlying_types)?;
            Some(CirClassOrTypeAliasType::TypeAlias(CirTypeAliasType::new(
                first_alias.type_alias_id.clone(),
                underlying_type,
                arguments,
                nullable,
            )))
        }
    }
}

/// `Some(None)` when no target has an outer type.
fn commonize_outer_types(
    tree: &CirTree,
    outer_types: &[(usize, Option<&CirClassType>)],
) -> Option<Option<Box<CirClassType>>> {
    if outer_types.iter().all(|(_, outer)| outer.is_none()) {
        return Some(None);
    }
    let wrapped = outer_types
        .iter()
        .map(|&(index, outer)| {
            outer.map(|outer| (index, CirClassOrTypeAliasType::Class(outer.clone())))
        })
        .collect::<Option<Vec<_>>>()?;
    let refs: Vec<(usize, &CirClassOrTypeAliasType)> =
        wrapped.iter().map(|(index, ty)| (*index, ty)).collect();
    match commonize_classifier_types(tree, &refs)? {
        CirClassOrTypeAliasType::Class(outer) => Some(Some(Box::new(outer))),
        CirClassOrTypeAliasType::TypeAlias(_) => None,
    }
}

fn commonize_arguments(
    tree: &CirTree,
    lists: &[(usize, &[CirTypeProjection])],
) -> Option<Vec<CirTypeProjection>> {
    let &(_, first) = lists.first()?;
    if lists.iter().any(|(_, list)| list.len() != first.len()) {
        return None;
    }

    first
        .iter()
        .enumerate()
        .map(|(position, head)| match head {
            CirTypeProjection::Star => lists
                .iter()
                .all(|(_, list)| matches!(list[position], CirTypeProjection::Star))
                .then_some(CirTypeProjection::Star),
            CirTypeProjection::Regular {
                projection_kind, ..
            } => {
                let argument_types = lists
                    .iter()
                    .map(|&(index, list)| match &list[position] {
                        CirTypeProjection::Regular {
                            projection_kind: kind,
                            ty,
                        } if kind == projection_kind => Some((index, ty)),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(CirTypeProjection::Regular {
                    projection_kind: *projection_kind,
                    ty: commonize_type(tree, &argument_types)?,
                })
            }
        })
        .collect()
}

/// Pick the best shared classifier and rewrite every target's type to it.
fn commonize_by_type_distance(
    tree: &CirTree,
    types: &[(usize, &CirClassOrTypeAliasType)],
) -> Option<CirClassOrTypeAliasType> {
    let classifiers = tree.classifiers();

    let mut candidates = BTreeSet::new();
    for (_, ty) in types {
        for hop in ty.alias_chain() {
            let id = hop.classifier_id();
            candidates.insert(id.clone());
            candidates.extend(classifiers.associated_ids(id).iter().cloned());
        }
    }

    let (penalty, candidate) = candidates
        .into_iter()
        .filter(|candidate| is_available_in_common(tree, candidate))
        .filter_map(|candidate| {
            let worst = types
                .iter()
                .map(|&(index, ty)| classifiers.type_distance(index, ty, &candidate).penalty())
                .max()?;
            (!worst.is_worst()).then_some((worst, candidate))
        })
        .min_by(|a, b| a.0.cmp(&b.0))?;
    tracing::trace!(%candidate, ?penalty, "type distance candidate");

    let rewritten = types
        .iter()
        .map(|&(index, ty)| rewrite_to(tree, index, ty, &candidate).map(|ty| (index, ty)))
        .collect::<Option<SmallVec<[_; 4]>>>()?;
    let refs: SmallVec<[(usize, &CirClassOrTypeAliasType); 4]> =
        rewritten.iter().map(|(index, ty)| (*index, ty)).collect();
    commonize_classifier_types(tree, &refs)
}

/// `ty` expressed through `candidate`: the matching element of its alias
/// chain, or `candidate` wrapping `ty` when `candidate` is an alias of it.
fn rewrite_to(
    tree: &CirTree,
    target_index: usize,
    ty: &CirClassOrTypeAliasType,
    candidate: &CirEntityId,
) -> Option<CirClassOrTypeAliasType> {
    let mut nullable = false;
    for hop in ty.alias_chain() {
        nullable |= hop.is_marked_nullable();
        if hop.classifier_id() == candidate {
            return Some(hop.with_nullability(nullable));
        }
    }

    let classifier = tree
        .classifiers()
        .target_resolver(target_index)
        .classifier(candidate)?;
    if !classifier.is_type_alias()
        || !classifier.type_parameters().is_empty()
        || !ty.arguments().is_empty()
    {
        return None;
    }
    Some(CirClassOrTypeAliasType::TypeAlias(CirTypeAliasType::new(
        candidate.clone(),
        ty.with_nullability(false),
        Vec::new(),
        ty.is_marked_nullable(),
    )))
}
