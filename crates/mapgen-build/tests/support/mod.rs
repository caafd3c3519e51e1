#![allow(dead_code)]

use mapgen_build::{ComposedMapping, InlineMappingResolver};
use mapgen_core::path::MemberPath;
use mapgen_core::symbol::{MemberDef, SymbolAccessor, TypePair, TypeRef};
use std::collections::{HashMap, HashSet};

pub fn ty(name: &str) -> TypeRef {
    TypeRef::new(name)
}

pub fn pair(source: &str, target: &str) -> TypePair {
    TypePair::new(ty(source), ty(target))
}

pub fn member(declaring: &str, name: &str, member_ty: &str) -> MemberDef {
    MemberDef::new(ty(declaring), name, ty(member_ty))
}

pub fn nullable_member(declaring: &str, name: &str, member_ty: &str) -> MemberDef {
    member(declaring, name, member_ty).nullable()
}

pub fn path(root: &str, steps: Vec<MemberDef>) -> MemberPath {
    MemberPath::new(ty(root), steps).unwrap()
}

/// Symbol resolution fake: every type is constructible and every setter
/// supports coalesce assignment unless registered otherwise.
pub struct FakeSymbols {
    missing_ctors: HashSet<String>,
    no_coalesce: HashSet<String>,
}

impl FakeSymbols {
    pub fn new() -> Self {
        Self {
            missing_ctors: HashSet::new(),
            no_coalesce: HashSet::new(),
        }
    }

    pub fn without_parameterless_ctor(mut self, ty: &str) -> Self {
        self.missing_ctors.insert(ty.to_string());
        self
    }

    pub fn without_coalesce(mut self, path: &str) -> Self {
        self.no_coalesce.insert(path.to_string());
        self
    }
}

impl SymbolAccessor for FakeSymbols {
    fn has_accessible_parameterless_constructor(&self, ty: &TypeRef) -> bool {
        !self.missing_ctors.contains(&ty.name)
    }

    fn supports_coalesce_assignment(&self, path: &MemberPath) -> bool {
        !self.no_coalesce.contains(&path.to_string())
    }
}

/// Mapping lookup fake backed by a plain map.
pub struct FakeResolver {
    mappings: HashMap<TypePair, ComposedMapping>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: ComposedMapping) -> Self {
        self.mappings.insert(mapping.pair.clone(), mapping);
        self
    }
}

impl InlineMappingResolver for FakeResolver {
    fn find_composed_mapping(&self, pair: &TypePair) -> Option<ComposedMapping> {
        self.mappings.get(pair).cloned()
    }
}
