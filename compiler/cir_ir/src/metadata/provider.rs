//! Access to the modules of one target or of the common dependencies.

use rustc_hash::FxHashMap;

use super::SerializedMetadata;
use crate::{CirEntityId, CirPackageName};

/// Failure to read one module's metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleLoadError {
    #[error("module `{name}` is not provided")]
    NotFound { name: String },
    #[error("malformed metadata: {reason}")]
    Malformed { reason: String },
}

/// Attributes of a native interop module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CInteropModuleAttributes {
    /// Package the interop bindings are generated into.
    pub main_package: CirPackageName,
    /// Forward-declared classes, as ids in their synthetic packages.
    pub exported_forward_declarations: Vec<CirEntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub cinterop_attributes: Option<CInteropModuleAttributes>,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cinterop_attributes: None,
        }
    }

    #[must_use]
    pub fn with_cinterop_attributes(mut self, attributes: CInteropModuleAttributes) -> Self {
        self.cinterop_attributes = Some(attributes);
        self
    }
}

/// Source of module metadata.
pub trait ModulesProvider: Send + Sync {
    fn module_infos(&self) -> &[ModuleInfo];

    fn load_module_metadata(&self, name: &str) -> Result<SerializedMetadata, ModuleLoadError>;
}

/// Modules held in memory, for tools that decode metadata themselves.
#[derive(Default)]
pub struct InMemoryModulesProvider {
    infos: Vec<ModuleInfo>,
    metadata: FxHashMap<String, SerializedMetadata>,
}

impl InMemoryModulesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. A module with the same name replaces the earlier one.
    #[must_use]
    pub fn with_module(mut self, info: ModuleInfo, metadata: SerializedMetadata) -> Self {
        self.add_module(info, metadata);
        self
    }

    pub fn add_module(&mut self, info: ModuleInfo, metadata: SerializedMetadata) {
        self.infos.retain(|existing| existing.name != info.name);
        self.metadata.insert(info.name.clone(), metadata);
        self.infos.push(info);
    }

    /// Register a module whose metadata is missing; loading it fails.
    pub fn add_module_info(&mut self, info: ModuleInfo) {
        self.infos.retain(|existing| existing.name != info.name);
        self.metadata.remove(&info.name);
        self.infos.push(info);
    }
}

impl ModulesProvider for InMemoryModulesProvider {
    fn module_infos(&self) -> &[ModuleInfo] {
        &self.infos
    }

    fn load_module_metadata(&self, name: &str) -> Result<SerializedMetadata, ModuleLoadError> {
        self.metadata
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleLoadError::NotFound {
                name: name.to_owned(),
            })
    }
}
