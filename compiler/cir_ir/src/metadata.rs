//! Decoded library metadata.
//!
//! These are the already-decoded protobuf messages of a serialized library,
//! reduced to what classifier resolution reads: class headers, type
//! parameters, supertypes and type aliases. Names are indices into the
//! fragment's string and qualified-name tables; types may be stored inline
//! or in a per-class / per-package type table and referenced by id.

mod flags;
mod names;
mod provider;

pub use flags::Flags;
pub use names::{NameResolver, PackageFragmentBuilder};
pub use provider::{
    CInteropModuleAttributes, InMemoryModulesProvider, ModuleInfo, ModuleLoadError,
    ModulesProvider,
};

/// Metadata of one module: package fragments grouped by package name.
///
/// `fragment_names[i]` is the dot-separated package name of every fragment
/// in `fragments[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializedMetadata {
    pub fragment_names: Vec<String>,
    pub fragments: Vec<Vec<PackageFragmentProto>>,
}

impl SerializedMetadata {
    /// Append the fragments of one package.
    #[must_use]
    pub fn with_package(
        mut self,
        package_name: impl Into<String>,
        fragments: Vec<PackageFragmentProto>,
    ) -> Self {
        self.fragment_names.push(package_name.into());
        self.fragments.push(fragments);
        self
    }

    /// Pairs of (package name, fragments).
    pub fn packages(&self) -> impl Iterator<Item = (&str, &[PackageFragmentProto])> {
        self.fragment_names
            .iter()
            .map(String::as_str)
            .zip(self.fragments.iter().map(Vec::as_slice))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageFragmentProto {
    pub strings: StringTable,
    pub qualified_names: QualifiedNameTable,
    pub classes: Vec<ClassProto>,
    pub package: Option<PackageProto>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTable {
    pub strings: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QualifiedNameTable {
    pub qualified_names: Vec<QualifiedName>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QualifiedNameKind {
    Class,
    Package,
    /// Class declared inside a function body.
    Local,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub parent_qualified_name: Option<u32>,
    /// Index into the string table.
    pub short_name: u32,
    pub kind: QualifiedNameKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeTable {
    pub types: Vec<TypeProto>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassProto {
    pub flags: Flags,
    /// Index into the qualified-name table.
    pub fq_name: u32,
    pub type_parameters: Vec<TypeParameterProto>,
    pub supertypes: Vec<TypeProto>,
    /// Supertypes stored in `type_table`.
    pub supertype_ids: Vec<u32>,
    pub type_table: TypeTable,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageProto {
    pub type_aliases: Vec<TypeAliasProto>,
    pub type_table: TypeTable,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VarianceProto {
    In,
    Out,
    #[default]
    Inv,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterProto {
    /// Unique within the enclosing declaration chain.
    pub id: u32,
    /// Index into the string table.
    pub name: u32,
    pub reified: bool,
    pub variance: VarianceProto,
    pub upper_bounds: Vec<TypeProto>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeClassifierProto {
    /// Qualified-name index of a class.
    Class(u32),
    /// Qualified-name index of a type alias.
    TypeAlias(u32),
    /// Type parameter by proto id.
    TypeParameter(u32),
    /// Type parameter by string-table name.
    TypeParameterName(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeProto {
    pub classifier: TypeClassifierProto,
    pub arguments: Vec<TypeArgumentProto>,
    pub nullable: bool,
    pub outer_type: Option<Box<TypeProto>>,
}

impl TypeProto {
    pub fn new(classifier: TypeClassifierProto) -> Self {
        Self {
            classifier,
            arguments: Vec::new(),
            nullable: false,
            outer_type: None,
        }
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<TypeArgumentProto>) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProjectionProto {
    In,
    Out,
    Inv,
    Star,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeArgumentProto {
    pub projection: ProjectionProto,
    /// Inline argument type. Absent for `Star`, or when `type_id` is set.
    pub ty: Option<TypeProto>,
    pub type_id: Option<u32>,
}

impl TypeArgumentProto {
    pub fn invariant(ty: TypeProto) -> Self {
        Self {
            projection: ProjectionProto::Inv,
            ty: Some(ty),
            type_id: None,
        }
    }

    pub fn star() -> Self {
        Self {
            projection: ProjectionProto::Star,
            ty: None,
            type_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAliasProto {
    pub flags: Flags,
    /// Index into the string table.
    pub name: u32,
    pub type_parameters: Vec<TypeParameterProto>,
    pub underlying_type: Option<TypeProto>,
    /// Underlying type stored in the package type table.
    pub underlying_type_id: Option<u32>,
}

#[cfg(test)]
mod tests;
