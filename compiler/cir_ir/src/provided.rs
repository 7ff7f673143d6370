//! Provided classifiers: the shape of classifiers that come from outside the
//! merge tree (dependencies, synthesized function interfaces, interop
//! forward declarations).
//!
//! Only what type commonization needs is kept: type parameters with their
//! variance, supertypes, alias underlying types and visibility.

use crate::{CirEntityId, ClassKind, Variance, Visibility};

/// A classifier known to a resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CirProvidedClassifier {
    Class(ProvidedClass),
    TypeAlias(ProvidedTypeAlias),
    /// Interop forward declaration exported by a native module.
    ExportedForwardDeclaration { synthetic_class_id: CirEntityId },
}

impl CirProvidedClassifier {
    pub fn type_parameters(&self) -> &[ProvidedTypeParameter] {
        match self {
            Self::Class(class) => &class.type_parameters,
            Self::TypeAlias(alias) => &alias.type_parameters,
            Self::ExportedForwardDeclaration { .. } => &[],
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Self::Class(class) => class.visibility,
            Self::TypeAlias(alias) => alias.visibility,
            Self::ExportedForwardDeclaration { .. } => Visibility::Public,
        }
    }

    pub fn as_type_alias(&self) -> Option<&ProvidedTypeAlias> {
        match self {
            Self::TypeAlias(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn is_type_alias(&self) -> bool {
        matches!(self, Self::TypeAlias(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProvidedClass {
    pub type_parameters: Vec<ProvidedTypeParameter>,
    pub supertypes: Vec<CirProvidedType>,
    pub visibility: Visibility,
    pub kind: ClassKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProvidedTypeAlias {
    pub type_parameters: Vec<ProvidedTypeParameter>,
    pub underlying_type: CirProvidedClassOrTypeAliasType,
    pub visibility: Visibility,
}

/// Type parameter of a provided classifier.
///
/// `index` is global: it counts the parameters of all enclosing classes first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProvidedTypeParameter {
    pub index: u32,
    pub variance: Variance,
}

/// Type reference inside a provided classifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CirProvidedType {
    ClassOrTypeAlias(CirProvidedClassOrTypeAliasType),
    TypeParameter { index: u32, is_marked_nullable: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CirProvidedClassOrTypeAliasType {
    Class {
        class_id: CirEntityId,
        outer_type: Option<Box<CirProvidedClassOrTypeAliasType>>,
        arguments: Vec<ProvidedTypeProjection>,
        is_marked_nullable: bool,
    },
    TypeAlias {
        type_alias_id: CirEntityId,
        arguments: Vec<ProvidedTypeProjection>,
        is_marked_nullable: bool,
    },
}

impl CirProvidedClassOrTypeAliasType {
    pub fn classifier_id(&self) -> &CirEntityId {
        match self {
            Self::Class { class_id, .. } => class_id,
            Self::TypeAlias { type_alias_id, .. } => type_alias_id,
        }
    }

    pub fn arguments(&self) -> &[ProvidedTypeProjection] {
        match self {
            Self::Class { arguments, .. } | Self::TypeAlias { arguments, .. } => arguments,
        }
    }

    pub fn is_marked_nullable(&self) -> bool {
        match self {
            Self::Class {
                is_marked_nullable, ..
            }
            | Self::TypeAlias {
                is_marked_nullable, ..
            } => *is_marked_nullable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProvidedTypeProjection {
    Star,
    Regular {
        variance: Variance,
        ty: CirProvidedType,
    },
}
