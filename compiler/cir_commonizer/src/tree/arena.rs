//! Arena of classifier nodes.
//!
//! Class and type-alias nodes are referenced from their parent container and
//! from the known-classifiers map. Both hold indices into this arena.

use super::{CirClassNode, CirTypeAliasNode};

/// Index of a class node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClassNodeId(u32);

/// Index of a type-alias node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeAliasNodeId(u32);

impl ClassNodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TypeAliasNodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node registered under a classifier id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CirClassifierNodeId {
    Class(ClassNodeId),
    TypeAlias(TypeAliasNodeId),
}

fn next_index(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(index) => index,
        Err(_) => panic!("classifier node arena exceeded u32::MAX nodes"),
    }
}

#[derive(Default)]
pub struct CirNodeArena {
    classes: Vec<CirClassNode>,
    type_aliases: Vec<CirTypeAliasNode>,
}

impl CirNodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_class(&mut self, node: CirClassNode) -> ClassNodeId {
        let id = ClassNodeId(next_index(self.classes.len()));
        self.classes.push(node);
        id
    }

    pub fn alloc_type_alias(&mut self, node: CirTypeAliasNode) -> TypeAliasNodeId {
        let id = TypeAliasNodeId(next_index(self.type_aliases.len()));
        self.type_aliases.push(node);
        id
    }

    #[inline]
    pub fn class(&self, id: ClassNodeId) -> &CirClassNode {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn class_mut(&mut self, id: ClassNodeId) -> &mut CirClassNode {
        &mut self.classes[id.index()]
    }

    #[inline]
    pub fn type_alias(&self, id: TypeAliasNodeId) -> &CirTypeAliasNode {
        &self.type_aliases[id.index()]
    }

    #[inline]
    pub fn type_alias_mut(&mut self, id: TypeAliasNodeId) -> &mut CirTypeAliasNode {
        &mut self.type_aliases[id.index()]
    }

    pub fn classes(&self) -> &[CirClassNode] {
        &self.classes
    }

    pub fn type_aliases(&self) -> &[CirTypeAliasNode] {
        &self.type_aliases
    }
}
