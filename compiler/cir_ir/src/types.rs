//! CIR type references.
//!
//! Types are immutable trees. A type-alias type carries its (already
//! argument-substituted) underlying type, so alias expansion never needs a
//! resolver.

use std::fmt;

use crate::{ensure_sufficient_stack, CirEntityId};

/// Declaration-site or use-site variance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variance {
    #[default]
    Invariant,
    /// Contravariant (`in`).
    In,
    /// Covariant (`out`).
    Out,
}

impl Variance {
    /// Keyword prefix used when rendering projections.
    pub fn label(self) -> &'static str {
        match self {
            Self::Invariant => "",
            Self::In => "in ",
            Self::Out => "out ",
        }
    }
}

/// Any type reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CirType {
    ClassOrTypeAlias(CirClassOrTypeAliasType),
    TypeParameter(CirTypeParameterType),
}

/// A reference to a classifier: a class type or a type-alias type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CirClassOrTypeAliasType {
    Class(CirClassType),
    TypeAlias(CirTypeAliasType),
}

/// `pkg/Outer<A>.Inner<B>?`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirClassType {
    pub class_id: CirEntityId,
    /// Set only for inner classes of generic outer classes.
    pub outer_type: Option<Box<CirClassType>>,
    pub arguments: Vec<CirTypeProjection>,
    pub is_marked_nullable: bool,
}

/// Reference to a type alias together with its substituted underlying type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirTypeAliasType {
    pub type_alias_id: CirEntityId,
    pub underlying_type: Box<CirClassOrTypeAliasType>,
    pub arguments: Vec<CirTypeProjection>,
    pub is_marked_nullable: bool,
}

/// Reference to a type parameter by its global index.
///
/// Indices count outward-in: the outermost class's parameters come first,
/// then nested classes', then the member's own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirTypeParameterType {
    pub index: u32,
    pub is_marked_nullable: bool,
}

/// A type argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CirTypeProjection {
    /// `*`
    Star,
    Regular {
        projection_kind: Variance,
        ty: CirType,
    },
}

impl CirType {
    /// Non-generic, non-nullable class type.
    pub fn class(class_id: CirEntityId) -> Self {
        Self::ClassOrTypeAlias(CirClassOrTypeAliasType::Class(CirClassType::new(
            class_id,
            Vec::new(),
            false,
        )))
    }

    pub fn type_parameter(index: u32, is_marked_nullable: bool) -> Self {
        Self::TypeParameter(CirTypeParameterType {
            index,
            is_marked_nullable,
        })
    }

    pub fn is_marked_nullable(&self) -> bool {
        match self {
            Self::ClassOrTypeAlias(ty) => ty.is_marked_nullable(),
            Self::TypeParameter(ty) => ty.is_marked_nullable,
        }
    }

    pub fn as_class_or_type_alias(&self) -> Option<&CirClassOrTypeAliasType> {
        match self {
            Self::ClassOrTypeAlias(ty) => Some(ty),
            Self::TypeParameter(_) => None,
        }
    }

    /// Classifier id of a class or type-alias type.
    pub fn classifier_id(&self) -> Option<&CirEntityId> {
        self.as_class_or_type_alias()
            .map(CirClassOrTypeAliasType::classifier_id)
    }
}

impl From<CirClassType> for CirType {
    fn from(ty: CirClassType) -> Self {
        Self::ClassOrTypeAlias(CirClassOrTypeAliasType::Class(ty))
    }
}

impl From<CirTypeAliasType> for CirType {
    fn from(ty: CirTypeAliasType) -> Self {
        Self::ClassOrTypeAlias(CirClassOrTypeAliasType::TypeAlias(ty))
    }
}

impl From<CirClassOrTypeAliasType> for CirType {
    fn from(ty: CirClassOrTypeAliasType) -> Self {
        Self::ClassOrTypeAlias(ty)
    }
}

impl CirClassOrTypeAliasType {
    pub fn classifier_id(&self) -> &CirEntityId {
        match self {
            Self::Class(ty) => &ty.class_id,
            Self::TypeAlias(ty) => &ty.type_alias_id,
        }
    }

    pub fn is_marked_nullable(&self) -> bool {
        match self {
            Self::Class(ty) => ty.is_marked_nullable,
            Self::TypeAlias(ty) => ty.is_marked_nullable,
        }
    }

    pub fn arguments(&self) -> &[CirTypeProjection] {
        match self {
            Self::Class(ty) => &ty.arguments,
            Self::TypeAlias(ty) => &ty.arguments,
        }
    }

    /// The immediate underlying type of a type-alias type.
    pub fn underlying_type(&self) -> Option<&CirClassOrTypeAliasType> {
        match self {
            Self::Class(_) => None,
            Self::TypeAlias(ty) => Some(&ty.underlying_type),
        }
    }

    /// All types reachable by repeatedly taking the underlying type,
    /// starting with `self`.
    pub fn alias_chain(&self) -> impl Iterator<Item = &CirClassOrTypeAliasType> {
        std::iter::successors(Some(self), |ty| ty.underlying_type())
    }

    /// The final class type of the alias chain. Nullability accumulates:
    /// a nullable alias of a non-null class expands to a nullable class.
    pub fn expanded_type(&self) -> CirClassType {
        let mut nullable = false;
        for ty in self.alias_chain() {
            nullable |= ty.is_marked_nullable();
            if let Self::Class(class_type) = ty {
                let mut expanded = class_type.clone();
                expanded.is_marked_nullable = nullable;
                return expanded;
            }
        }
        // The chain of a well-formed type always ends in a class type.
        CirClassType::new(self.classifier_id().clone(), Vec::new(), nullable)
    }

    #[must_use]
    pub fn with_nullability(&self, is_marked_nullable: bool) -> Self {
        let mut ty = self.clone();
        match &mut ty {
            Self::Class(class_type) => class_type.is_marked_nullable = is_marked_nullable,
            Self::TypeAlias(alias_type) => alias_type.is_marked_nullable = is_marked_nullable,
        }
        ty
    }
}

impl CirClassType {
    pub fn new(
        class_id: CirEntityId,
        arguments: Vec<CirTypeProjection>,
        is_marked_nullable: bool,
    ) -> Self {
        Self {
            class_id,
            outer_type: None,
            arguments,
            is_marked_nullable,
        }
    }
}

impl CirTypeAliasType {
    pub fn new(
        type_alias_id: CirEntityId,
        underlying_type: CirClassOrTypeAliasType,
        arguments: Vec<CirTypeProjection>,
        is_marked_nullable: bool,
    ) -> Self {
        Self {
            type_alias_id,
            underlying_type: Box::new(underlying_type),
            arguments,
            is_marked_nullable,
        }
    }
}

impl CirTypeProjection {
    pub fn invariant(ty: CirType) -> Self {
        Self::Regular {
            projection_kind: Variance::Invariant,
            ty,
        }
    }
}

impl fmt::Display for CirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassOrTypeAlias(ty) => write!(f, "{ty}"),
            Self::TypeParameter(ty) => {
                write!(f, "T#{}", ty.index)?;
                if ty.is_marked_nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for CirClassOrTypeAliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| {
            write!(f, "{}", self.classifier_id())?;
            let arguments = self.arguments();
            if !arguments.is_empty() {
                f.write_str("<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match argument {
                        CirTypeProjection::Star => f.write_str("*")?,
                        CirTypeProjection::Regular {
                            projection_kind,
                            ty,
                        } => write!(f, "{}{ty}", projection_kind.label())?,
                    }
                }
                f.write_str(">")?;
            }
            if self.is_marked_nullable() {
                f.write_str("?")?;
            }
            Ok(())
        })
    }
}
