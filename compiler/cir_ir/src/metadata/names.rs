//! Name tables of a package fragment.

use rustc_hash::FxHashMap;

use super::{
    ClassProto, PackageFragmentProto, PackageProto, QualifiedName, QualifiedNameKind,
    QualifiedNameTable, StringTable, TypeAliasProto, TypeProto,
};
use crate::{CirEntityId, CirName, CirPackageName};

/// Resolves string and qualified-name indices of one fragment.
#[derive(Copy, Clone)]
pub struct NameResolver<'a> {
    strings: &'a StringTable,
    qualified_names: &'a QualifiedNameTable,
}

impl<'a> NameResolver<'a> {
    pub fn new(fragment: &'a PackageFragmentProto) -> Self {
        Self {
            strings: &fragment.strings,
            qualified_names: &fragment.qualified_names,
        }
    }

    pub fn string(&self, index: u32) -> Option<&'a str> {
        self.strings
            .strings
            .get(index as usize)
            .map(String::as_str)
    }

    /// The chain of qualified names from the outermost package segment down
    /// to `index`, or `None` if an index is dangling or the chain is cyclic.
    fn chain(&self, index: u32) -> Option<Vec<&'a QualifiedName>> {
        let table = &self.qualified_names.qualified_names;
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            if chain.len() > table.len() {
                return None;
            }
            let name = table.get(i as usize)?;
            chain.push(name);
            current = name.parent_qualified_name;
        }
        chain.reverse();
        Some(chain)
    }

    /// Whether the class name at `index` is declared inside a function body.
    pub fn is_local_class_name(&self, index: u32) -> bool {
        self.chain(index).is_some_and(|chain| {
            chain
                .iter()
                .any(|name| name.kind == QualifiedNameKind::Local)
        })
    }

    /// Class id at `index`.
    pub fn class_id(&self, index: u32) -> Option<CirEntityId> {
        let chain = self.chain(index)?;
        let mut package_segments = Vec::new();
        let mut class_segments = Vec::new();
        for name in chain {
            let short_name = CirName::create(self.string(name.short_name)?);
            match name.kind {
                QualifiedNameKind::Package if class_segments.is_empty() => {
                    package_segments.push(short_name);
                }
                // A package segment below a class is malformed.
                QualifiedNameKind::Package => return None,
                QualifiedNameKind::Class | QualifiedNameKind::Local => {
                    class_segments.push(short_name);
                }
            }
        }
        CirEntityId::create_relative(
            CirPackageName::from_segments(package_segments),
            class_segments,
        )
    }

    /// Class name at `index` in the metadata format (`pkg/sub/Outer.Inner`).
    pub fn qualified_class_name(&self, index: u32) -> Option<String> {
        self.class_id(index).map(|id| id.to_string())
    }
}

/// Assembles a [`PackageFragmentProto`], interning strings and qualified
/// names as they are referenced.
#[derive(Default)]
pub struct PackageFragmentBuilder {
    strings: Vec<String>,
    string_indices: FxHashMap<String, u32>,
    qualified_names: Vec<QualifiedName>,
    qualified_indices: FxHashMap<QualifiedName, u32>,
    classes: Vec<ClassProto>,
    type_aliases: Vec<TypeAliasProto>,
    package_types: Vec<TypeProto>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "metadata tables are indexed by u32"
)]
impl PackageFragmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `s` in the string table.
    pub fn string(&mut self, s: &str) -> u32 {
        if let Some(&index) = self.string_indices.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(s.to_owned());
        self.string_indices.insert(s.to_owned(), index);
        index
    }

    fn qualified(&mut self, parent: Option<u32>, short: &str, kind: QualifiedNameKind) -> u32 {
        let name = QualifiedName {
            parent_qualified_name: parent,
            short_name: self.string(short),
            kind,
        };
        if let Some(&index) = self.qualified_indices.get(&name) {
            return index;
        }
        let index = self.qualified_names.len() as u32;
        self.qualified_names.push(name);
        self.qualified_indices.insert(name, index);
        index
    }

    /// Qualified-name index of `id`.
    pub fn class_name(&mut self, id: &CirEntityId) -> u32 {
        let mut parent = None;
        for segment in id.package_name().segments() {
            parent = Some(self.qualified(parent, segment.as_str(), QualifiedNameKind::Package));
        }
        let mut index = 0;
        for segment in id.relative_name_segments() {
            index = self.qualified(parent, segment.as_str(), QualifiedNameKind::Class);
            parent = Some(index);
        }
        index
    }

    /// Qualified-name index of a local class nested in `outer`.
    pub fn local_class_name(&mut self, outer: &CirEntityId, name: &str) -> u32 {
        let parent = self.class_name(outer);
        self.qualified(Some(parent), name, QualifiedNameKind::Local)
    }

    pub fn add_class(&mut self, class: ClassProto) -> &mut Self {
        self.classes.push(class);
        self
    }

    pub fn add_type_alias(&mut self, type_alias: TypeAliasProto) -> &mut Self {
        self.type_aliases.push(type_alias);
        self
    }

    /// Store `ty` in the package type table and return its id.
    pub fn package_type(&mut self, ty: TypeProto) -> u32 {
        let id = self.package_types.len() as u32;
        self.package_types.push(ty);
        id
    }

    pub fn build(self) -> PackageFragmentProto {
        let package = if self.type_aliases.is_empty() && self.package_types.is_empty() {
            None
        } else {
            Some(PackageProto {
                type_aliases: self.type_aliases,
                type_table: super::TypeTable {
                    types: self.package_types,
                },
            })
        };
        PackageFragmentProto {
            strings: StringTable {
                strings: self.strings,
            },
            qualified_names: QualifiedNameTable {
                qualified_names: self.qualified_names,
            },
            classes: self.classes,
            package,
        }
    }
}
