//! CIR - Commonizer Intermediate Representation
//!
//! Data model shared by the commonizer and its collaborators:
//! - Interned names, package names and entity ids
//! - Declarations and types, one value per declaration per target
//! - Provided classifiers (the dependency view used during type commonization)
//! - Decoded library metadata and the modules that hold it
//! - Commonizer targets
//!
//! Every value type is `Clone + Eq + Hash + Debug` so declarations can be
//! compared across targets and used as map keys. Floats in constants are
//! stored as bits.

mod declarations;
mod interner;
pub mod metadata;
mod name;
mod provided;
mod stack;
mod target;
mod types;

pub use declarations::{
    CallableKind, CirAnnotation, CirCallableWithParameters, CirClass, CirClassConstructor,
    CirConstantValue, CirExtensionReceiver, CirFunction, CirModule, CirPackage, CirProperty,
    CirRoot, CirTypeAlias, CirTypeParameter, CirValueParameter, ClassFlags, ClassKind,
    FunctionModifiers, Modality, Visibility,
};
pub use interner::{interner, InternError, NameInterner};
pub use name::{CirEntityId, CirName, CirPackageName};
pub use provided::{
    CirProvidedClassOrTypeAliasType, CirProvidedClassifier, CirProvidedType, ProvidedClass,
    ProvidedTypeAlias, ProvidedTypeParameter, ProvidedTypeProjection,
};
pub use stack::ensure_sufficient_stack;
pub use target::CommonizerTarget;
pub use types::{
    CirClassOrTypeAliasType, CirClassType, CirType, CirTypeAliasType, CirTypeParameterType,
    CirTypeProjection, Variance,
};
