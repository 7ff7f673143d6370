//! CIR declarations.
//!
//! One value per declaration per target, as produced by the metadata reader.
//! The same types describe the common declarations derived by the
//! commonizer, so a common tree can be serialized with the same writer as a
//! per-target one.

use bitflags::bitflags;

use crate::{
    CirClassOrTypeAliasType, CirClassType, CirEntityId, CirName, CirPackageName, CirType,
    CommonizerTarget, Variance,
};

/// Declaration visibility.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

/// Declaration modality.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
    Sealed,
}

/// Kind of a class-like declaration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    AnnotationClass,
    Object,
    CompanionObject,
}

/// How a callable member came to exist in its container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallableKind {
    #[default]
    Declaration,
    FakeOverride,
    Delegation,
    Synthesized,
}

bitflags! {
    /// Boolean class attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ClassFlags: u16 {
        const INNER = 1 << 0;
        const DATA = 1 << 1;
        const VALUE = 1 << 2;
        const COMPANION = 1 << 3;
        const HAS_ENUM_ENTRIES = 1 << 4;
        const EXTERNAL = 1 << 5;
        const FUN_INTERFACE = 1 << 6;
    }
}

bitflags! {
    /// Function modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FunctionModifiers: u8 {
        const OPERATOR = 1 << 0;
        const INFIX = 1 << 1;
        const INLINE = 1 << 2;
        const SUSPEND = 1 << 3;
        const TAILREC = 1 << 4;
        const EXTERNAL = 1 << 5;
    }
}

/// Compile-time constant, as found in annotation arguments and `const`
/// property initializers. Floats are stored as bits for `Hash`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CirConstantValue {
    Null,
    String(String),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    UByte(u8),
    UShort(u16),
    UInt(u32),
    ULong(u64),
    FloatBits(u32),
    DoubleBits(u64),
    Boolean(bool),
    Enum {
        enum_class_id: CirEntityId,
        entry_name: CirName,
    },
    Array(Vec<CirConstantValue>),
}

/// An annotation use.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirAnnotation {
    pub class_id: CirEntityId,
    pub arguments: Vec<(CirName, CirConstantValue)>,
}

impl CirAnnotation {
    pub fn new(class_id: CirEntityId) -> Self {
        Self {
            class_id,
            arguments: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirTypeParameter {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub is_reified: bool,
    pub variance: Variance,
    pub upper_bounds: Vec<CirType>,
}

impl CirTypeParameter {
    pub fn new(name: CirName, variance: Variance, upper_bounds: Vec<CirType>) -> Self {
        Self {
            annotations: Vec::new(),
            name,
            is_reified: false,
            variance,
            upper_bounds,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirValueParameter {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub return_type: CirType,
    pub vararg_element_type: Option<CirType>,
    pub declares_default_value: bool,
    pub is_crossinline: bool,
    pub is_noinline: bool,
}

impl CirValueParameter {
    pub fn new(name: CirName, return_type: CirType) -> Self {
        Self {
            annotations: Vec::new(),
            name,
            return_type,
            vararg_element_type: None,
            declares_default_value: false,
            is_crossinline: false,
            is_noinline: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirExtensionReceiver {
    pub annotations: Vec<CirAnnotation>,
    pub ty: CirType,
}

/// The synthetic root declaration: which target a tree describes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirRoot {
    pub target: CommonizerTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirModule {
    pub name: CirName,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirPackage {
    pub package_name: CirPackageName,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirClass {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub type_parameters: Vec<CirTypeParameter>,
    pub supertypes: Vec<CirType>,
    pub visibility: Visibility,
    pub modality: Modality,
    pub kind: ClassKind,
    /// Simple name of the companion object, if any.
    pub companion: Option<CirName>,
    pub flags: ClassFlags,
}

impl CirClass {
    /// A public final class with no type parameters or supertypes.
    pub fn new(name: CirName, kind: ClassKind) -> Self {
        Self {
            annotations: Vec::new(),
            name,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            visibility: Visibility::Public,
            modality: Modality::Final,
            kind,
            companion: None,
            flags: ClassFlags::empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirClassConstructor {
    pub annotations: Vec<CirAnnotation>,
    pub type_parameters: Vec<CirTypeParameter>,
    pub visibility: Visibility,
    pub value_parameters: Vec<CirValueParameter>,
    pub has_stable_parameter_names: bool,
    pub is_primary: bool,
}

impl CirClassConstructor {
    pub fn new(value_parameters: Vec<CirValueParameter>) -> Self {
        Self {
            annotations: Vec::new(),
            type_parameters: Vec::new(),
            visibility: Visibility::Public,
            value_parameters,
            has_stable_parameter_names: true,
            is_primary: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirFunction {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub type_parameters: Vec<CirTypeParameter>,
    pub visibility: Visibility,
    pub modality: Modality,
    pub value_parameters: Vec<CirValueParameter>,
    pub has_stable_parameter_names: bool,
    pub extension_receiver: Option<CirExtensionReceiver>,
    pub return_type: CirType,
    pub kind: CallableKind,
    pub modifiers: FunctionModifiers,
}

impl CirFunction {
    /// A public final declared function.
    pub fn new(
        name: CirName,
        value_parameters: Vec<CirValueParameter>,
        return_type: CirType,
    ) -> Self {
        Self {
            annotations: Vec::new(),
            name,
            type_parameters: Vec::new(),
            visibility: Visibility::Public,
            modality: Modality::Final,
            value_parameters,
            has_stable_parameter_names: true,
            extension_receiver: None,
            return_type,
            kind: CallableKind::Declaration,
            modifiers: FunctionModifiers::empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirProperty {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub type_parameters: Vec<CirTypeParameter>,
    pub visibility: Visibility,
    pub modality: Modality,
    pub extension_receiver: Option<CirExtensionReceiver>,
    pub return_type: CirType,
    pub kind: CallableKind,
    pub is_var: bool,
    pub is_late_init: bool,
    pub is_const: bool,
    pub compile_time_initializer: Option<CirConstantValue>,
}

impl CirProperty {
    /// A public final `val`.
    pub fn new(name: CirName, return_type: CirType) -> Self {
        Self {
            annotations: Vec::new(),
            name,
            type_parameters: Vec::new(),
            visibility: Visibility::Public,
            modality: Modality::Final,
            extension_receiver: None,
            return_type,
            kind: CallableKind::Declaration,
            is_var: false,
            is_late_init: false,
            is_const: false,
            compile_time_initializer: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirTypeAlias {
    pub annotations: Vec<CirAnnotation>,
    pub name: CirName,
    pub type_parameters: Vec<CirTypeParameter>,
    pub visibility: Visibility,
    pub underlying_type: CirClassOrTypeAliasType,
    pub expanded_type: CirClassType,
}

impl CirTypeAlias {
    /// A public type alias; the expanded type is derived from `underlying_type`.
    pub fn new(name: CirName, underlying_type: CirClassOrTypeAliasType) -> Self {
        let expanded_type = underlying_type.expanded_type();
        Self {
            annotations: Vec::new(),
            name,
            type_parameters: Vec::new(),
            visibility: Visibility::Public,
            underlying_type,
            expanded_type,
        }
    }
}

/// Callables whose value parameters take part in overload matching.
pub trait CirCallableWithParameters {
    fn annotations(&self) -> &[CirAnnotation];
    fn value_parameters(&self) -> &[CirValueParameter];
    fn type_parameters(&self) -> &[CirTypeParameter];
}

impl CirCallableWithParameters for CirFunction {
    fn annotations(&self) -> &[CirAnnotation] {
        &self.annotations
    }

    fn value_parameters(&self) -> &[CirValueParameter] {
        &self.value_parameters
    }

    fn type_parameters(&self) -> &[CirTypeParameter] {
        &self.type_parameters
    }
}

impl CirCallableWithParameters for CirClassConstructor {
    fn annotations(&self) -> &[CirAnnotation] {
        &self.annotations
    }

    fn value_parameters(&self) -> &[CirValueParameter] {
        &self.value_parameters
    }

    fn type_parameters(&self) -> &[CirTypeParameter] {
        &self.type_parameters
    }
}
