//! Per-mapping container builder.
//!
//! Owns the guard map and container tree for exactly one mapping build; the
//! host builds independent mappings on independent contexts.

use itertools::Itertools;
use mapgen_core::cfg::MapperConfig;
use mapgen_core::diagnostics::{DiagnosticDescriptor, DiagnosticManager};
use mapgen_core::path::MemberPath;
use mapgen_core::symbol::{AccessMode, SymbolAccessor};
use mapgen_core::tree::{
    AssignmentMapping, ContainerId, GuardMapping, InitializerMapping, MappingTree,
    MemberMappingInfo,
};
use mapgen_core::Result;
use std::collections::HashMap;
use tracing::{debug, trace};

pub struct ContainerBuilderContext<'a> {
    symbols: &'a dyn SymbolAccessor,
    config: MapperConfig,
    diagnostics: DiagnosticManager,
    tree: MappingTree,
    guards: HashMap<MemberPath, ContainerId>,
    mapped_targets: Vec<MemberPath>,
}

impl<'a> ContainerBuilderContext<'a> {
    pub fn new(
        symbols: &'a dyn SymbolAccessor,
        config: MapperConfig,
        diagnostics: DiagnosticManager,
    ) -> Self {
        Self {
            symbols,
            config,
            diagnostics,
            tree: MappingTree::new(),
            guards: HashMap::new(),
            mapped_targets: Vec::new(),
        }
    }

    /// Add an assignment directly to the root container.
    pub fn add_member_assignment(&mut self, info: MemberMappingInfo) -> Result<()> {
        let root = self.tree.root();
        self.add_assignment_into(root, info)
    }

    /// Add an assignment whose source member access may be null along
    /// intermediate steps, nesting it inside the matching guard chain. An
    /// assignment without a source member or without any nullable source
    /// step needs no guard and is added directly.
    pub fn add_guarded_assignment(&mut self, info: MemberMappingInfo) -> Result<()> {
        let Some(source) = info.source.clone() else {
            return self.add_member_assignment(info);
        };
        let Some(condition_path) = source.without_trailing_non_nullable() else {
            return self.add_member_assignment(info);
        };

        let container = self.get_or_create_guard(condition_path)?;
        let target = info.target.clone();
        self.add_assignment_into(container, info)?;

        // null out the target when null assignments are allowed and the
        // source path turns out null
        if self.config.allow_null_property_assignment && target.member().nullable {
            let setter = self.symbols.build_setter(&target);
            self.tree.guard_mut(container)?.add_null_assignment(setter);
        } else if self.config.throw_on_property_mapping_null_mismatch {
            self.tree.guard_mut(container)?.raise_mismatch_on_null();
        }
        Ok(())
    }

    /// Every target path mapped so far, in insertion order.
    pub fn mapped_targets(&self) -> &[MemberPath] {
        &self.mapped_targets
    }

    pub fn diagnostics(&self) -> &DiagnosticManager {
        &self.diagnostics
    }

    /// Consume the context and hand the finished tree to the emitter.
    pub fn finish(self) -> MappingTree {
        self.tree
    }

    fn add_assignment_into(&mut self, container: ContainerId, info: MemberMappingInfo) -> Result<()> {
        self.add_null_member_initializers(container, &info.target)?;
        let getter = info
            .source
            .as_ref()
            .map(|path| self.symbols.build_getter(path, AccessMode::Direct));
        let setter = self.symbols.build_setter(&info.target);
        self.tree
            .add_assignment(container, AssignmentMapping { getter, setter })?;
        self.mapped_targets.push(info.target);
        Ok(())
    }

    /// Emit initializers for every nullable intermediate step of the target
    /// path, root to leaf, each at most once per container chain.
    fn add_null_member_initializers(
        &mut self,
        container: ContainerId,
        target: &MemberPath,
    ) -> Result<()> {
        for nullable_path in target.object_path_nullable_sub_paths() {
            let member = nullable_path.member();
            if !member.settable {
                continue;
            }

            if !self
                .symbols
                .has_accessible_parameterless_constructor(&member.ty)
            {
                self.diagnostics.report(
                    DiagnosticDescriptor::NoParameterlessConstructorFound,
                    &member.ty,
                );
                continue;
            }

            let setter = self.symbols.build_setter(&nullable_path);
            let initializer = if setter.supports_coalesce_assignment {
                InitializerMapping::Coalesce { setter }
            } else {
                let getter = self.symbols.build_getter(&nullable_path, AccessMode::Direct);
                InitializerMapping::GetCheckSet { getter, setter }
            };
            self.tree.add_initializer(container, initializer)?;
        }
        Ok(())
    }

    fn get_or_create_guard(&mut self, condition_path: MemberPath) -> Result<ContainerId> {
        // exact match: reuse the guard as-is
        if let Some(&existing) = self.guards.get(&condition_path) {
            trace!("reusing null guard for {}", condition_path);
            return Ok(existing);
        }

        // try to reuse a guard on an ancestor path and nest inside it; any
        // nullable ancestor skipped over on the way up still lacks a guard,
        // so the condition getter must traverse it null-conditionally
        let mut parent = self.tree.root();
        let mut needs_null_safe_access = false;
        let prefixes = condition_path.object_path_nullable_sub_paths().collect_vec();
        for prefix in prefixes.into_iter().rev() {
            if let Some(&ancestor) = self.guards.get(&prefix) {
                parent = ancestor;
                break;
            }
            needs_null_safe_access = true;
        }

        let access = if needs_null_safe_access {
            AccessMode::NullConditional
        } else {
            AccessMode::Direct
        };
        let condition = self.symbols.build_getter(&condition_path, access);
        debug!("creating null guard for {}", condition_path);
        let id = self
            .tree
            .add_container(parent, GuardMapping::new(condition, needs_null_safe_access))?;
        self.guards.insert(condition_path, id);
        Ok(id)
    }
}
