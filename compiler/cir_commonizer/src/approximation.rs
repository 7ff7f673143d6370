//! Approximation keys: structural identities for callables.
//!
//! Functions, properties and constructors have no identity shared across
//! targets. They are matched by name and by the signatures of their value
//! parameter and receiver types. Signatures are rendered alias-transparently,
//! so `fun f(x: Alias)` on one target and `fun f(x: Target)` on another land
//! on the same key.

use std::fmt;
use std::hash::{Hash, Hasher};

use cir_ir::{
    ensure_sufficient_stack, CirCallableWithParameters, CirClassConstructor, CirClassType,
    CirEntityId, CirFunction, CirName, CirProperty, CirType, CirTypeParameter, CirTypeProjection,
};
use rustc_hash::FxHasher;

/// Annotations that mark a callable as a native-interop binding. Such
/// callables overload on parameter names, not only on types.
pub const OBJC_INTEROP_ANNOTATIONS: [&str; 3] = [
    "kotlinx/cinterop/ObjCMethod",
    "kotlinx/cinterop/ObjCConstructor",
    "kotlinx/cinterop/ObjCFactory",
];

/// Rendered, alias-transparent type signature.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CirTypeSignature(String);

impl CirTypeSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CirTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CirTypeSignature({})", self.0)
    }
}

impl fmt::Display for CirTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type parameters in scope while rendering signatures: the enclosing
/// classes' ones first, then the member's own.
#[derive(Clone, Default)]
pub struct SignatureBuildingContext {
    type_parameters: Vec<CirTypeParameter>,
}

impl SignatureBuildingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with `type_parameters` appended after the ones in scope.
    #[must_use]
    pub fn with_type_parameters(&self, type_parameters: &[CirTypeParameter]) -> Self {
        let mut context = self.clone();
        context.type_parameters.extend_from_slice(type_parameters);
        context
    }

    pub fn signature(&self, ty: &CirType) -> CirTypeSignature {
        let mut out = String::new();
        self.render(&mut out, ty, true);
        CirTypeSignature(out)
    }

    fn render(&self, out: &mut String, ty: &CirType, with_bounds: bool) {
        ensure_sufficient_stack(|| match ty {
            CirType::ClassOrTypeAlias(ty) => {
                // Aliases render as their expansion.
                self.render_class(out, &ty.expanded_type());
            }
            CirType::TypeParameter(parameter) => {
                out.push('#');
                out.push_str(&parameter.index.to_string());
                if parameter.is_marked_nullable {
                    out.push('?');
                }
                if !with_bounds {
                    return;
                }
                let bounds = self
                    .type_parameters
                    .get(parameter.index as usize)
                    .map_or(&[][..], |declaration| &declaration.upper_bounds[..]);
                if !bounds.is_empty() {
                    out.push_str(":[");
                    for (i, bound) in bounds.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.render(out, bound, false);
                    }
                    out.push(']');
                }
            }
        });
    }

    fn render_class(&self, out: &mut String, ty: &CirClassType) {
        if let Some(outer) = &ty.outer_type {
            self.render_class(out, outer);
            out.push('.');
        }
        out.push_str(&ty.class_id.to_string());
        if !ty.arguments.is_empty() {
            out.push('<');
            for (i, argument) in ty.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match argument {
                    CirTypeProjection::Star => out.push('*'),
                    CirTypeProjection::Regular {
                        projection_kind,
                        ty,
                    } => {
                        out.push_str(projection_kind.label());
                        self.render(out, ty, false);
                    }
                }
            }
            out.push('>');
        }
        if ty.is_marked_nullable {
            out.push('?');
        }
    }
}

/// Fingerprint of parameter names for interop callables, `0` otherwise.
pub fn interop_fingerprint(callable: &impl CirCallableWithParameters) -> u64 {
    let is_interop = callable.annotations().iter().any(|annotation| {
        OBJC_INTEROP_ANNOTATIONS
            .iter()
            .filter_map(|name| CirEntityId::parse(name))
            .any(|id| id == annotation.class_id)
    });
    if !is_interop {
        return 0;
    }
    let mut hasher = FxHasher::default();
    for parameter in callable.value_parameters() {
        parameter.name.as_str().hash(&mut hasher);
    }
    hasher.finish()
}

fn value_parameter_signatures(
    context: &SignatureBuildingContext,
    callable: &impl CirCallableWithParameters,
) -> Box<[CirTypeSignature]> {
    callable
        .value_parameters()
        .iter()
        .map(|parameter| context.signature(&parameter.return_type))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyApproximationKey {
    pub name: CirName,
    pub extension_receiver_type: Option<CirTypeSignature>,
}

impl PropertyApproximationKey {
    pub fn new(property: &CirProperty, context: &SignatureBuildingContext) -> Self {
        let context = context.with_type_parameters(&property.type_parameters);
        Self {
            name: property.name,
            extension_receiver_type: property
                .extension_receiver
                .as_ref()
                .map(|receiver| context.signature(&receiver.ty)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionApproximationKey {
    pub name: CirName,
    pub value_parameter_types: Box<[CirTypeSignature]>,
    pub extension_receiver_type: Option<CirTypeSignature>,
    pub interop_fingerprint: u64,
}

impl FunctionApproximationKey {
    pub fn new(function: &CirFunction, context: &SignatureBuildingContext) -> Self {
        let context = context.with_type_parameters(&function.type_parameters);
        Self {
            name: function.name,
            value_parameter_types: value_parameter_signatures(&context, function),
            extension_receiver_type: function
                .extension_receiver
                .as_ref()
                .map(|receiver| context.signature(&receiver.ty)),
            interop_fingerprint: interop_fingerprint(function),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructorApproximationKey {
    pub value_parameter_types: Box<[CirTypeSignature]>,
    pub interop_fingerprint: u64,
}

impl ConstructorApproximationKey {
    pub fn new(constructor: &CirClassConstructor, context: &SignatureBuildingContext) -> Self {
        let context = context.with_type_parameters(&constructor.type_parameters);
        Self {
            value_parameter_types: value_parameter_signatures(&context, constructor),
            interop_fingerprint: interop_fingerprint(constructor),
        }
    }
}
