//! Per-kind commonization policies.
//!
//! Each policy looks at the present target declarations of one node and
//! either derives a declaration valid for all of them or returns `None`.
//! Absent slots are ignored. A policy never looks at sibling nodes; only
//! type commonization consults other classifiers, through the tree.

mod types;

use cir_ir::{
    CirAnnotation, CirClass, CirClassConstructor, CirExtensionReceiver, CirFunction, CirModule,
    CirPackage, CirProperty, CirRoot, CirType, CirTypeAlias, CirTypeParameter, CirValueParameter,
    ClassFlags, FunctionModifiers, Modality, Visibility,
};

pub(crate) use types::{commonize_classifier_types, commonize_type, type_alias_header_agrees};

use crate::tree::{CirClassConstructorNode, CirFunctionNode, CirNode, CirPropertyNode, CirTree};

/// Class flags that must agree; the others are intersected.
const CLASS_HEADER_FLAGS: ClassFlags = ClassFlags::INNER
    .union(ClassFlags::DATA)
    .union(ClassFlags::VALUE)
    .union(ClassFlags::COMPANION)
    .union(ClassFlags::HAS_ENUM_ENTRIES);

/// Modifiers kept only when every target has them.
const INTERSECTED_MODIFIERS: FunctionModifiers = FunctionModifiers::OPERATOR
    .union(FunctionModifiers::INFIX)
    .union(FunctionModifiers::INLINE)
    .union(FunctionModifiers::TAILREC)
    .union(FunctionModifiers::EXTERNAL);

/// `(target index, field)` for each present declaration.
fn project<'a, T, U: ?Sized>(
    present: &[(usize, &'a T)],
    field: impl Fn(&'a T) -> &'a U,
) -> Vec<(usize, &'a U)> {
    present
        .iter()
        .map(|&(index, declaration)| (index, field(declaration)))
        .collect()
}

pub(crate) fn commonize_root(tree: &CirTree, node: &CirNode<CirRoot, CirRoot>) -> Option<CirRoot> {
    node.present().next()?;
    Some(CirRoot {
        target: tree.output_target(),
    })
}

pub(crate) fn commonize_module(
    _tree: &CirTree,
    node: &CirNode<CirModule, CirModule>,
) -> Option<CirModule> {
    node.present().next().map(|(_, module)| module.clone())
}

pub(crate) fn commonize_package(
    _tree: &CirTree,
    node: &CirNode<CirPackage, CirPackage>,
) -> Option<CirPackage> {
    node.present().next().map(|(_, package)| package.clone())
}

/// The non-type part of a class: kind, visibility, modality, flags and
/// companion. Also decides whether the class is available in common, which
/// must not depend on type commonization.
pub(crate) fn commonize_class_header(node: &CirNode<CirClass, CirClass>) -> Option<CirClass> {
    let mut present = node.present().map(|(_, class)| class);
    let first = present.next()?;
    if first.visibility.is_private() {
        return None;
    }

    let mut flags = first.flags;
    for class in present {
        if class.kind != first.kind
            || class.visibility != first.visibility
            || class.modality != first.modality
            || class.companion != first.companion
            || class.flags & CLASS_HEADER_FLAGS != first.flags & CLASS_HEADER_FLAGS
        {
            return None;
        }
        flags &= class.flags;
    }

    Some(CirClass {
        annotations: Vec::new(),
        name: first.name,
        type_parameters: Vec::new(),
        supertypes: Vec::new(),
        visibility: first.visibility,
        modality: first.modality,
        kind: first.kind,
        companion: first.companion,
        flags,
    })
}

pub(crate) fn commonize_class(
    tree: &CirTree,
    node: &CirNode<CirClass, CirClass>,
) -> Option<CirClass> {
    let mut common = commonize_class_header(node)?;
    let present: Vec<(usize, &CirClass)> = node.present().collect();

    common.type_parameters =
        commonize_type_parameters(tree, &project(&present, |class| {
            class.type_parameters.as_slice()
        }))?;
    common.supertypes = commonize_supertypes(tree, &present);
    common.annotations =
        intersect_annotations(&project(&present, |class| class.annotations.as_slice()));
    Some(common)
}

/// Supertypes that commonize in every present target. Supertypes are paired
/// across targets by the class they expand to.
fn commonize_supertypes(tree: &CirTree, present: &[(usize, &CirClass)]) -> Vec<CirType> {
    fn expanded_id(ty: &CirType) -> Option<cir_ir::CirEntityId> {
        ty.as_class_or_type_alias()
            .map(|ty| ty.expanded_type().class_id)
    }

    let Some((&(first_index, first), rest)) = present.split_first() else {
        return Vec::new();
    };
    first
        .supertypes
        .iter()
        .filter_map(|supertype| {
            let key = expanded_id(supertype)?;
            let mut group = vec![(first_index, supertype)];
            for &(index, class) in rest {
                let matching = class
                    .supertypes
                    .iter()
                    .find(|candidate| expanded_id(candidate).as_ref() == Some(&key))?;
                group.push((index, matching));
            }
            commonize_type(tree, &group)
        })
        .collect()
}

pub(crate) fn commonize_type_alias(
    tree: &CirTree,
    node: &CirNode<CirTypeAlias, CirTypeAlias>,
) -> Option<CirTypeAlias> {
    if !type_alias_header_agrees(tree, node) {
        return None;
    }
    let present: Vec<(usize, &CirTypeAlias)> = node.present().collect();
    let &(_, first) = present.first()?;

    let type_parameters =
        commonize_type_parameters(tree, &project(&present, |alias| {
            alias.type_parameters.as_slice()
        }))?;
    let underlying_type =
        commonize_classifier_types(tree, &project(&present, |alias| &alias.underlying_type))?;
    let expanded_type = underlying_type.expanded_type();
    Some(CirTypeAlias {
        annotations: intersect_annotations(&project(&present, |alias| {
            alias.annotations.as_slice()
        })),
        name: first.name,
        type_parameters,
        visibility: first.visibility,
        underlying_type,
        expanded_type,
    })
}

pub(crate) fn commonize_function(tree: &CirTree, node: &CirFunctionNode) -> Option<CirFunction> {
    let present: Vec<(usize, &CirFunction)> = node.present().collect();
    let &(_, first) = present.first()?;

    let visibility = lower_visibility(present.iter().map(|(_, function)| function.visibility))?;
    let modality =
        commonize_member_modality(present.iter().map(|(_, function)| function.modality))?;
    let is_suspend = first.modifiers.contains(FunctionModifiers::SUSPEND);
    if present.iter().any(|(_, function)| {
        function.kind != first.kind
            || function.modifiers.contains(FunctionModifiers::SUSPEND) != is_suspend
    }) {
        return None;
    }
    let mut modifiers = present
        .iter()
        .fold(INTERSECTED_MODIFIERS, |acc, (_, function)| acc & function.modifiers);
    modifiers.set(FunctionModifiers::SUSPEND, is_suspend);

    let has_stable_parameter_names = present
        .iter()
        .all(|(_, function)| function.has_stable_parameter_names);
    let type_parameters = commonize_type_parameters(
        tree,
        &project(&present, |function| function.type_parameters.as_slice()),
    )?;
    let value_parameters = commonize_value_parameters(
        tree,
        &project(&present, |function| function.value_parameters.as_slice()),
        has_stable_parameter_names,
    )?;
    let extension_receiver = commonize_extension_receivers(
        tree,
        &present
            .iter()
            .map(|&(index, function)| (index, function.extension_receiver.as_ref()))
            .collect::<Vec<_>>(),
    )?;
    let return_type = commonize_type(tree, &project(&present, |function| &function.return_type))?;

    Some(CirFunction {
        annotations: intersect_annotations(&project(&present, |function| {
            function.annotations.as_slice()
        })),
        name: first.name,
        type_parameters,
        visibility,
        modality,
        value_parameters,
        has_stable_parameter_names,
        extension_receiver,
        return_type,
        kind: first.kind,
        modifiers,
    })
}

pub(crate) fn commonize_property(tree: &CirTree, node: &CirPropertyNode) -> Option<CirProperty> {
    let present: Vec<(usize, &CirProperty)> = node.present().collect();
    let &(_, first) = present.first()?;

    let visibility = lower_visibility(present.iter().map(|(_, property)| property.visibility))?;
    let modality =
        commonize_member_modality(present.iter().map(|(_, property)| property.modality))?;
    if present.iter().any(|(_, property)| property.kind != first.kind) {
        return None;
    }

    let type_parameters = commonize_type_parameters(
        tree,
        &project(&present, |property| property.type_parameters.as_slice()),
    )?;
    let extension_receiver = commonize_extension_receivers(
        tree,
        &present
            .iter()
            .map(|&(index, property)| (index, property.extension_receiver.as_ref()))
            .collect::<Vec<_>>(),
    )?;
    let return_type = commonize_type(tree, &project(&present, |property| &property.return_type))?;

    // A constant whose value differs between targets becomes a plain `val`.
    let is_const = present.iter().all(|(_, property)| {
        property.is_const && property.compile_time_initializer == first.compile_time_initializer
    });

    Some(CirProperty {
        annotations: intersect_annotations(&project(&present, |property| {
            property.annotations.as_slice()
        })),
        name: first.name,
        type_parameters,
        visibility,
        modality,
        extension_receiver,
        return_type,
        kind: first.kind,
        is_var: present.iter().all(|(_, property)| property.is_var),
        is_late_init: present.iter().all(|(_, property)| property.is_late_init),
        is_const,
        compile_time_initializer: if is_const {
            first.compile_time_initializer.clone()
        } else {
            None
        },
    })
}

pub(crate) fn commonize_constructor(
    tree: &CirTree,
    node: &CirClassConstructorNode,
) -> Option<CirClassConstructor> {
    let present: Vec<(usize, &CirClassConstructor)> = node.present().collect();
    present.first()?;

    let visibility =
        lower_visibility(present.iter().map(|(_, constructor)| constructor.visibility))?;
    let has_stable_parameter_names = present
        .iter()
        .all(|(_, constructor)| constructor.has_stable_parameter_names);
    let type_parameters = commonize_type_parameters(
        tree,
        &project(&present, |constructor| constructor.type_parameters.as_slice()),
    )?;
    let value_parameters = commonize_value_parameters(
        tree,
        &project(&present, |constructor| constructor.value_parameters.as_slice()),
        has_stable_parameter_names,
    )?;

    Some(CirClassConstructor {
        annotations: intersect_annotations(&project(&present, |constructor| {
            constructor.annotations.as_slice()
        })),
        type_parameters,
        visibility,
        value_parameters,
        has_stable_parameter_names,
        is_primary: present.iter().all(|(_, constructor)| constructor.is_primary),
    })
}

/// The least visible of the member visibilities. Private members and a mix
/// of protected and internal do not commonize.
pub(crate) fn lower_visibility(
    visibilities: impl IntoIterator<Item = Visibility>,
) -> Option<Visibility> {
    let mut internal = false;
    let mut protected = false;
    for visibility in visibilities {
        match visibility {
            Visibility::Private => return None,
            Visibility::Internal => internal = true,
            Visibility::Protected => protected = true,
            Visibility::Public => {}
        }
    }
    match (internal, protected) {
        (true, true) => None,
        (true, false) => Some(Visibility::Internal),
        (false, true) => Some(Visibility::Protected),
        (false, false) => Some(Visibility::Public),
    }
}

/// Equal modalities, or `Final` for a mix of final and open.
pub(crate) fn commonize_member_modality(
    modalities: impl IntoIterator<Item = Modality>,
) -> Option<Modality> {
    let mut modalities = modalities.into_iter();
    let mut common = modalities.next()?;
    for modality in modalities {
        common = match (common, modality) {
            (a, b) if a == b => a,
            (Modality::Final, Modality::Open) | (Modality::Open, Modality::Final) => {
                Modality::Final
            }
            _ => return None,
        };
    }
    Some(common)
}

/// Annotations present, by value, in every list. Order follows the first list.
fn intersect_annotations(lists: &[(usize, &[CirAnnotation])]) -> Vec<CirAnnotation> {
    let Some(((_, first), rest)) = lists.split_first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|annotation| rest.iter().all(|(_, list)| list.contains(annotation)))
        .cloned()
        .collect()
}

fn commonize_type_parameters(
    tree: &CirTree,
    lists: &[(usize, &[CirTypeParameter])],
) -> Option<Vec<CirTypeParameter>> {
    let Some(&(_, first)) = lists.first() else {
        return Some(Vec::new());
    };
    if lists.iter().any(|(_, list)| list.len() != first.len()) {
        return None;
    }

    (0..first.len())
        .map(|position| {
            let parameters: Vec<(usize, &CirTypeParameter)> = lists
                .iter()
                .map(|&(index, list)| (index, &list[position]))
                .collect();
            let head = first.get(position)?;
            if parameters.iter().any(|(_, parameter)| {
                parameter.name != head.name
                    || parameter.variance != head.variance
                    || parameter.is_reified != head.is_reified
                    || parameter.upper_bounds.len() != head.upper_bounds.len()
            }) {
                return None;
            }
            let upper_bounds = (0..head.upper_bounds.len())
                .map(|bound| {
                    commonize_type(tree, &project(&parameters, |parameter| {
                        &parameter.upper_bounds[bound]
                    }))
                })
                .collect::<Option<Vec<_>>>()?;
            Some(CirTypeParameter {
                annotations: intersect_annotations(&project(&parameters, |parameter| {
                    parameter.annotations.as_slice()
                })),
                name: head.name,
                is_reified: head.is_reified,
                variance: head.variance,
                upper_bounds,
            })
        })
        .collect()
}

/// Value parameters pairwise. Names must agree unless some target has
/// unstable parameter names, in which case the first target's names are used.
fn commonize_value_parameters(
    tree: &CirTree,
    lists: &[(usize, &[CirValueParameter])],
    has_stable_parameter_names: bool,
) -> Option<Vec<CirValueParameter>> {
    let Some(&(_, first)) = lists.first() else {
        return Some(Vec::new());
    };
    if lists.iter().any(|(_, list)| list.len() != first.len()) {
        return None;
    }

    (0..first.len())
        .map(|position| {
            let parameters: Vec<(usize, &CirValueParameter)> = lists
                .iter()
                .map(|&(index, list)| (index, &list[position]))
                .collect();
            let head = first.get(position)?;
            if parameters.iter().any(|(_, parameter)| {
                (has_stable_parameter_names && parameter.name != head.name)
                    || parameter.is_crossinline != head.is_crossinline
                    || parameter.is_noinline != head.is_noinline
                    || parameter.vararg_element_type.is_some() != head.vararg_element_type.is_some()
            }) {
                return None;
            }
            let return_type = commonize_type(tree, &project(&parameters, |parameter| {
                &parameter.return_type
            }))?;
            let vararg_element_type = if head.vararg_element_type.is_some() {
                let element_types: Vec<(usize, &CirType)> = parameters
                    .iter()
                    .filter_map(|&(index, parameter)| {
                        parameter.vararg_element_type.as_ref().map(|ty| (index, ty))
                    })
                    .collect();
                Some(commonize_type(tree, &element_types)?)
            } else {
                None
            };
            Some(CirValueParameter {
                annotations: intersect_annotations(&project(&parameters, |parameter| {
                    parameter.annotations.as_slice()
                })),
                name: head.name,
                return_type,
                vararg_element_type,
                declares_default_value: parameters
                    .iter()
                    .all(|(_, parameter)| parameter.declares_default_value),
                is_crossinline: head.is_crossinline,
                is_noinline: head.is_noinline,
            })
        })
        .collect()
}

/// `Some(None)` when no target has a receiver, `None` when the receivers do
/// not commonize or only some targets have one.
fn commonize_extension_receivers(
    tree: &CirTree,
    receivers: &[(usize, Option<&CirExtensionReceiver>)],
) -> Option<Option<CirExtensionReceiver>> {
    if receivers.iter().all(|(_, receiver)| receiver.is_none()) {
        return Some(None);
    }
    let receivers: Vec<(usize, &CirExtensionReceiver)> = receivers
        .iter()
        .map(|&(index, receiver)| receiver.map(|receiver| (index, receiver)))
        .collect::<Option<_>>()?;
    let ty = commonize_type(tree, &project(&receivers, |receiver| &receiver.ty))?;
    Some(Some(CirExtensionReceiver {
        annotations: intersect_annotations(&project(&receivers, |receiver| {
            receiver.annotations.as_slice()
        })),
        ty,
    }))
}
