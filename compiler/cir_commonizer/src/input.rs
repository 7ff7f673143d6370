//! Per-target declarations handed to the tree merger.
//!
//! The metadata reader produces one [`CirTargetInput`] per leaf target. The
//! nesting mirrors the tree: modules hold packages, packages hold classes,
//! type aliases and top-level callables, classes hold members and nested
//! classes.

use cir_ir::{
    CirClass, CirClassConstructor, CirFunction, CirModule, CirPackage, CirProperty, CirTypeAlias,
    CommonizerTarget,
};

#[derive(Clone, Debug)]
pub struct CirTargetInput {
    pub target: CommonizerTarget,
    pub modules: Vec<CirModuleInput>,
}

#[derive(Clone, Debug)]
pub struct CirModuleInput {
    pub module: CirModule,
    pub packages: Vec<CirPackageInput>,
}

#[derive(Clone, Debug)]
pub struct CirPackageInput {
    pub package: CirPackage,
    pub classes: Vec<CirClassInput>,
    pub type_aliases: Vec<CirTypeAlias>,
    pub functions: Vec<CirFunction>,
    pub properties: Vec<CirProperty>,
}

#[derive(Clone, Debug)]
pub struct CirClassInput {
    pub class: CirClass,
    pub constructors: Vec<CirClassConstructor>,
    pub functions: Vec<CirFunction>,
    pub properties: Vec<CirProperty>,
    pub nested: Vec<CirClassInput>,
}

impl CirTargetInput {
    pub fn new(target: CommonizerTarget) -> Self {
        Self {
            target,
            modules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_module(mut self, module: CirModuleInput) -> Self {
        self.modules.push(module);
        self
    }
}

impl CirModuleInput {
    pub fn new(module: CirModule) -> Self {
        Self {
            module,
            packages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: CirPackageInput) -> Self {
        self.packages.push(package);
        self
    }
}

impl CirPackageInput {
    pub fn new(package: CirPackage) -> Self {
        Self {
            package,
            classes: Vec::new(),
            type_aliases: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: CirClassInput) -> Self {
        self.classes.push(class);
        self
    }

    #[must_use]
    pub fn with_type_alias(mut self, type_alias: CirTypeAlias) -> Self {
        self.type_aliases.push(type_alias);
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: CirFunction) -> Self {
        self.functions.push(function);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: CirProperty) -> Self {
        self.properties.push(property);
        self
    }
}

impl CirClassInput {
    pub fn new(class: CirClass) -> Self {
        Self {
            class,
            constructors: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_constructor(mut self, constructor: CirClassConstructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: CirFunction) -> Self {
        self.functions.push(function);
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: CirProperty) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_nested(mut self, nested: CirClassInput) -> Self {
        self.nested.push(nested);
        self
    }
}
