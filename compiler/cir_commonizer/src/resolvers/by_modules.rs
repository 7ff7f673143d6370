//! Classifiers read from library metadata.

use std::sync::Arc;

use cir_ir::metadata::{
    ClassProto, ModuleLoadError, ModulesProvider, NameResolver, PackageFragmentProto,
    ProjectionProto, TypeAliasProto, TypeArgumentProto, TypeClassifierProto, TypeParameterProto,
    TypeProto, TypeTable, VarianceProto,
};
use cir_ir::{
    ensure_sufficient_stack, CirEntityId, CirName, CirPackageName,
    CirProvidedClassOrTypeAliasType, CirProvidedClassifier, CirProvidedType, ClassKind,
    ProvidedClass, ProvidedTypeAlias, ProvidedTypeParameter, ProvidedTypeProjection, Variance,
    Visibility,
};
use rustc_hash::FxHashMap;

use super::CirProvidedClassifiers;
use crate::CommonizerError;

/// Packages that hold interop forward declarations.
pub const SYNTHETIC_FORWARD_DECLARATION_PACKAGES: [&str; 3] =
    ["cnames.structs", "objcnames.classes", "objcnames.protocols"];

/// Resolver over the classifiers of a set of modules.
pub struct ProvidedClassifiersByModules {
    classifiers: FxHashMap<CirEntityId, Arc<CirProvidedClassifier>>,
    type_aliases_by_underlying: FxHashMap<CirEntityId, Vec<CirEntityId>>,
    /// Present only for the forward-declaration union.
    synthetic_fallback: Option<SyntheticFallback>,
}

/// Resolves any id under a synthetic forward-declaration package.
struct SyntheticFallback {
    packages: Vec<CirPackageName>,
    classifier: Arc<CirProvidedClassifier>,
}

impl SyntheticFallback {
    fn new() -> Self {
        Self {
            packages: SYNTHETIC_FORWARD_DECLARATION_PACKAGES
                .iter()
                .map(|package| CirPackageName::create(package))
                .collect(),
            classifier: Arc::new(CirProvidedClassifier::Class(ProvidedClass {
                type_parameters: Vec::new(),
                supertypes: Vec::new(),
                visibility: Visibility::Public,
                kind: ClassKind::Class,
            })),
        }
    }

    fn covers(&self, id: &CirEntityId) -> bool {
        self.packages
            .iter()
            .any(|package| id.package_name().starts_with(package))
    }
}

impl ProvidedClassifiersByModules {
    /// Read every classifier of every module in `modules`.
    ///
    /// When two modules declare the same id, the first one read wins.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(modules = modules.module_infos().len())
    )]
    pub fn load(modules: &dyn ModulesProvider) -> Result<Self, CommonizerError> {
        let mut reader = MetadataReader::default();
        for info in modules.module_infos() {
            let module_error = |source| CommonizerError::ModuleLoad {
                module: info.name.clone(),
                source,
            };
            let metadata = modules
                .load_module_metadata(&info.name)
                .map_err(module_error)?;
            for (package_name, fragments) in metadata.packages() {
                let package_name = CirPackageName::create(package_name);
                for fragment in fragments {
                    reader
                        .read_fragment(&package_name, fragment)
                        .map_err(module_error)?;
                }
            }
        }

        tracing::debug!(
            classifiers = reader.classifiers.len(),
            "loaded provided classifiers"
        );
        Ok(Self {
            classifiers: reader.classifiers,
            type_aliases_by_underlying: reader.type_aliases_by_underlying,
            synthetic_fallback: None,
        })
    }

    /// Union of the forward declarations exported by the interop modules of
    /// all targets.
    ///
    /// Each declaration is registered under its synthetic-package id and
    /// under the same name in the module's main package. On collision the
    /// first registration wins, so targets exporting the same name share one
    /// classifier.
    #[tracing::instrument(level = "debug", skip_all, fields(targets = providers.len()))]
    pub fn load_exported_forward_declarations(providers: &[&dyn ModulesProvider]) -> Self {
        let mut classifiers: FxHashMap<CirEntityId, Arc<CirProvidedClassifier>> =
            FxHashMap::default();
        for provider in providers {
            for info in provider.module_infos() {
                let Some(attributes) = &info.cinterop_attributes else {
                    continue;
                };
                for synthetic_class_id in &attributes.exported_forward_declarations {
                    let classifier = Arc::new(CirProvidedClassifier::ExportedForwardDeclaration {
                        synthetic_class_id: synthetic_class_id.clone(),
                    });
                    let main_package_id =
                        synthetic_class_id.with_package(attributes.main_package.clone());
                    classifiers
                        .entry(synthetic_class_id.clone())
                        .or_insert_with(|| Arc::clone(&classifier));
                    classifiers.entry(main_package_id).or_insert(classifier);
                }
            }
        }

        tracing::debug!(
            classifiers = classifiers.len(),
            "loaded exported forward declarations"
        );
        Self {
            classifiers,
            type_aliases_by_underlying: FxHashMap::default(),
            synthetic_fallback: Some(SyntheticFallback::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl CirProvidedClassifiers for ProvidedClassifiersByModules {
    fn has_classifier(&self, id: &CirEntityId) -> bool {
        self.classifiers.contains_key(id)
            || self
                .synthetic_fallback
                .as_ref()
                .is_some_and(|fallback| fallback.covers(id))
    }

    fn classifier(&self, id: &CirEntityId) -> Option<Arc<CirProvidedClassifier>> {
        if let Some(classifier) = self.classifiers.get(id) {
            return Some(Arc::clone(classifier));
        }
        self.synthetic_fallback
            .as_ref()
            .filter(|fallback| fallback.covers(id))
            .map(|fallback| Arc::clone(&fallback.classifier))
    }

    fn find_type_aliases_with_underlying_type(&self, id: &CirEntityId) -> Vec<CirEntityId> {
        self.type_aliases_by_underlying
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

fn malformed(reason: impl Into<String>) -> ModuleLoadError {
    ModuleLoadError::Malformed {
        reason: reason.into(),
    }
}

#[derive(Default)]
struct MetadataReader {
    classifiers: FxHashMap<CirEntityId, Arc<CirProvidedClassifier>>,
    type_aliases_by_underlying: FxHashMap<CirEntityId, Vec<CirEntityId>>,
}

/// A type parameter visible while reading a declaration.
#[derive(Copy, Clone)]
struct ScopedTypeParameter<'a> {
    id: u32,
    name: &'a str,
    index: u32,
}

impl MetadataReader {
    fn read_fragment(
        &mut self,
        package_name: &CirPackageName,
        fragment: &PackageFragmentProto,
    ) -> Result<(), ModuleLoadError> {
        let names = NameResolver::new(fragment);

        let mut classes_by_parent: FxHashMap<Option<CirEntityId>, Vec<(CirEntityId, &ClassProto)>> =
            FxHashMap::default();
        for class in &fragment.classes {
            if names.is_local_class_name(class.fq_name) {
                continue;
            }
            let class_id = names.class_id(class.fq_name).ok_or_else(|| {
                malformed(format!("class name #{} does not resolve", class.fq_name))
            })?;
            classes_by_parent
                .entry(class_id.outer_class_id())
                .or_default()
                .push((class_id, class));
        }

        // Parents are read before their children so that nested type
        // parameters are numbered after the enclosing classes' ones.
        let mut pending: Vec<(Option<CirEntityId>, Vec<ScopedTypeParameter<'_>>)> =
            vec![(None, Vec::new())];
        while let Some((parent_id, parent_scope)) = pending.pop() {
            let Some(children) = classes_by_parent.remove(&parent_id) else {
                continue;
            };
            for (class_id, proto) in children {
                let scope = extend_scope(names, &parent_scope, &proto.type_parameters)?;
                let class = read_class(names, &scope, parent_scope.len(), proto)?;
                self.insert(class_id.clone(), CirProvidedClassifier::Class(class));
                pending.push((Some(class_id), scope));
            }
        }
        for (orphan_parent, orphans) in &classes_by_parent {
            tracing::trace!(
                parent = ?orphan_parent,
                count = orphans.len(),
                "skipping nested classes without an outer class in the fragment"
            );
        }

        if let Some(package) = &fragment.package {
            for alias in &package.type_aliases {
                self.read_type_alias(names, package_name, &package.type_table, alias)?;
            }
        }
        Ok(())
    }

    fn read_type_alias(
        &mut self,
        names: NameResolver<'_>,
        package_name: &CirPackageName,
        type_table: &TypeTable,
        proto: &TypeAliasProto,
    ) -> Result<(), ModuleLoadError> {
        let name = names
            .string(proto.name)
            .ok_or_else(|| malformed(format!("type alias name #{} does not resolve", proto.name)))?;
        let alias_id = CirEntityId::create(package_name.clone(), CirName::create(name));

        let scope = extend_scope(names, &[], &proto.type_parameters)?;
        let reader = TypeReader {
            names,
            scope: &scope,
            table: type_table,
        };
        let underlying = match (&proto.underlying_type, proto.underlying_type_id) {
            (Some(ty), _) => ty,
            (None, Some(id)) => reader.table_type(id)?,
            (None, None) => {
                return Err(malformed(format!("type alias `{alias_id}` has no underlying type")))
            }
        };
        let underlying_type = reader.read_classifier_type(underlying)?;
        let underlying_id = underlying_type.classifier_id().clone();

        let alias = ProvidedTypeAlias {
            type_parameters: own_type_parameters(&scope, 0, &proto.type_parameters),
            underlying_type,
            visibility: proto.flags.visibility(),
        };
        if self.insert(alias_id.clone(), CirProvidedClassifier::TypeAlias(alias)) {
            self.type_aliases_by_underlying
                .entry(underlying_id)
                .or_default()
                .push(alias_id);
        }
        Ok(())
    }

    /// Register `classifier` unless `id` is taken. Returns whether it was added.
    fn insert(&mut self, id: CirEntityId, classifier: CirProvidedClassifier) -> bool {
        match self.classifiers.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Arc::new(classifier));
                true
            }
        }
    }
}

fn extend_scope<'a>(
    names: NameResolver<'a>,
    parent: &[ScopedTypeParameter<'a>],
    type_parameters: &[TypeParameterProto],
) -> Result<Vec<ScopedTypeParameter<'a>>, ModuleLoadError> {
    let mut scope = parent.to_vec();
    for parameter in type_parameters {
        let name = names.string(parameter.name).ok_or_else(|| {
            malformed(format!("type parameter name #{} does not resolve", parameter.name))
        })?;
        let index = u32::try_from(scope.len())
            .map_err(|_| malformed("too many type parameters"))?;
        scope.push(ScopedTypeParameter {
            id: parameter.id,
            name,
            index,
        });
    }
    Ok(scope)
}

fn own_type_parameters(
    scope: &[ScopedTypeParameter<'_>],
    offset: usize,
    protos: &[TypeParameterProto],
) -> Vec<ProvidedTypeParameter> {
    scope[offset..]
        .iter()
        .zip(protos)
        .map(|(scoped, proto)| ProvidedTypeParameter {
            index: scoped.index,
            variance: variance(proto.variance),
        })
        .collect()
}

fn read_class(
    names: NameResolver<'_>,
    scope: &[ScopedTypeParameter<'_>],
    offset: usize,
    proto: &ClassProto,
) -> Result<ProvidedClass, ModuleLoadError> {
    let reader = TypeReader {
        names,
        scope,
        table: &proto.type_table,
    };
    let mut supertypes = Vec::with_capacity(proto.supertypes.len() + proto.supertype_ids.len());
    for supertype in &proto.supertypes {
        supertypes.push(reader.read_type(supertype)?);
    }
    for &id in &proto.supertype_ids {
        supertypes.push(reader.read_type(reader.table_type(id)?)?);
    }
    Ok(ProvidedClass {
        type_parameters: own_type_parameters(scope, offset, &proto.type_parameters),
        supertypes,
        visibility: proto.flags.visibility(),
        kind: proto.flags.class_kind(),
    })
}

fn variance(variance: VarianceProto) -> Variance {
    match variance {
        VarianceProto::In => Variance::In,
        VarianceProto::Out => Variance::Out,
        VarianceProto::Inv => Variance::Invariant,
    }
}

/// Reads type protos in the context of one declaration.
struct TypeReader<'a, 'b> {
    names: NameResolver<'a>,
    scope: &'b [ScopedTypeParameter<'a>],
    table: &'b TypeTable,
}

impl<'b> TypeReader<'_, 'b> {
    fn table_type(&self, id: u32) -> Result<&'b TypeProto, ModuleLoadError> {
        self.table
            .types
            .get(id as usize)
            .ok_or_else(|| malformed(format!("type #{id} is not in the type table")))
    }

    fn class_id(&self, name: u32) -> Result<CirEntityId, ModuleLoadError> {
        self.names
            .class_id(name)
            .ok_or_else(|| malformed(format!("class name #{name} does not resolve")))
    }

    fn read_type(&self, proto: &TypeProto) -> Result<CirProvidedType, ModuleLoadError> {
        let parameter = match proto.classifier {
            TypeClassifierProto::TypeParameter(id) => {
                self.scope.iter().rev().find(|parameter| parameter.id == id)
            }
            TypeClassifierProto::TypeParameterName(name) => {
                let name = self.names.string(name);
                self.scope
                    .iter()
                    .rev()
                    .find(|parameter| Some(parameter.name) == name)
            }
            TypeClassifierProto::Class(_) | TypeClassifierProto::TypeAlias(_) => {
                return self
                    .read_classifier_type(proto)
                    .map(CirProvidedType::ClassOrTypeAlias);
            }
        };
        let parameter = parameter
            .ok_or_else(|| malformed(format!("unresolved type parameter {:?}", proto.classifier)))?;
        Ok(CirProvidedType::TypeParameter {
            index: parameter.index,
            is_marked_nullable: proto.nullable,
        })
    }

    fn read_classifier_type(
        &self,
        proto: &TypeProto,
    ) -> Result<CirProvidedClassOrTypeAliasType, ModuleLoadError> {
        ensure_sufficient_stack(|| {
            let arguments = proto
                .arguments
                .iter()
                .map(|argument| self.read_argument(argument))
                .collect::<Result<Vec<_>, _>>()?;
            match proto.classifier {
                TypeClassifierProto::Class(name) => {
                    let outer_type = proto
                        .outer_type
                        .as_deref()
                        .map(|outer| self.read_classifier_type(outer))
                        .transpose()?
                        .map(Box::new);
                    Ok(CirProvidedClassOrTypeAliasType::Class {
                        class_id: self.class_id(name)?,
                        outer_type,
                        arguments,
                        is_marked_nullable: proto.nullable,
                    })
                }
                TypeClassifierProto::TypeAlias(name) => {
                    Ok(CirProvidedClassOrTypeAliasType::TypeAlias {
                        type_alias_id: self.class_id(name)?,
                        arguments,
                        is_marked_nullable: proto.nullable,
                    })
                }
                TypeClassifierProto::TypeParameter(_)
                | TypeClassifierProto::TypeParameterName(_) => {
                    Err(malformed("expected a class or type alias type"))
                }
            }
        })
    }

    fn read_argument(
        &self,
        argument: &TypeArgumentProto,
    ) -> Result<ProvidedTypeProjection, ModuleLoadError> {
        let variance = match argument.projection {
            ProjectionProto::Star => return Ok(ProvidedTypeProjection::Star),
            ProjectionProto::In => Variance::In,
            ProjectionProto::Out => Variance::Out,
            ProjectionProto::Inv => Variance::Invariant,
        };
        let ty = match (&argument.ty, argument.type_id) {
            (Some(ty), _) => ty,
            (None, Some(id)) => self.table_type(id)?,
            (None, None) => return Err(malformed("type argument without a type")),
        };
        Ok(ProvidedTypeProjection::Regular {
            variance,
            ty: self.read_type(ty)?,
        })
    }
}
