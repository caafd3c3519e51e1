//! The mapping container tree.
//!
//! One tree is built per mapping definition, owned exclusively by its
//! builder, and handed to the external emitter once complete. The emitter
//! makes no semantic decisions; it serializes children in insertion order.
//! Children are never removed or reordered after insertion.

use crate::path::MemberPath;
use crate::symbol::{MemberGetter, MemberSetter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub type ContainerId = usize;

/// The raw source/target pairing of one member assignment rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMappingInfo {
    pub source: Option<MemberPath>,
    pub target: MemberPath,
}

impl MemberMappingInfo {
    pub fn new(source: MemberPath, target: MemberPath) -> Self {
        Self {
            source: Some(source),
            target,
        }
    }

    /// A rule with no source member access (constant or derived values).
    pub fn without_source(target: MemberPath) -> Self {
        Self {
            source: None,
            target,
        }
    }
}

/// Terminal member-to-member value assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMapping {
    pub getter: Option<MemberGetter>,
    pub setter: MemberSetter,
}

/// Ensures an intermediate target member is non-null before deeper
/// assignments run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitializerMapping {
    /// The setter natively supports coalesce-on-null-then-assign.
    Coalesce { setter: MemberSetter },
    /// Explicit get, null check, then plain set.
    GetCheckSet {
        getter: MemberGetter,
        setter: MemberSetter,
    },
}

impl InitializerMapping {
    pub fn target(&self) -> &MemberPath {
        match self {
            InitializerMapping::Coalesce { setter } => &setter.path,
            InitializerMapping::GetCheckSet { setter, .. } => &setter.path,
        }
    }
}

/// What a guard does when its source path turns out null. The two kinds are
/// mutually exclusive per guard; null assignments accumulate setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnNullAction {
    AssignNull(Vec<MemberSetter>),
    RaiseMismatch,
}

/// Null-conditional branch around one or more assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardMapping {
    pub condition: MemberGetter,
    /// Set when the condition getter must traverse unguarded nullable
    /// ancestors null-conditionally.
    pub needs_null_safe_access: bool,
    pub on_null: Option<OnNullAction>,
}

impl GuardMapping {
    pub fn new(condition: MemberGetter, needs_null_safe_access: bool) -> Self {
        Self {
            condition,
            needs_null_safe_access,
            on_null: None,
        }
    }

    pub fn path(&self) -> &MemberPath {
        &self.condition.path
    }

    /// Accumulate a target setter to null out when the source path is null.
    /// Ignored when a mismatch action is already attached.
    pub fn add_null_assignment(&mut self, setter: MemberSetter) {
        match &mut self.on_null {
            Some(OnNullAction::AssignNull(setters)) => setters.push(setter),
            Some(OnNullAction::RaiseMismatch) => {}
            None => self.on_null = Some(OnNullAction::AssignNull(vec![setter])),
        }
    }

    /// Raise a mismatch condition when the source path is null. Ignored when
    /// null assignments are already attached.
    pub fn raise_mismatch_on_null(&mut self) {
        if self.on_null.is_none() {
            self.on_null = Some(OnNullAction::RaiseMismatch);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingChild {
    Assignment(AssignmentMapping),
    Initializer(InitializerMapping),
    Container(ContainerId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    Root,
    Guard(GuardMapping),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerNode {
    kind: ContainerKind,
    parent: Option<ContainerId>,
    children: Vec<MappingChild>,
}

impl ContainerNode {
    pub fn kind(&self) -> &ContainerKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn children(&self) -> &[MappingChild] {
        &self.children
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingTree {
    nodes: Vec<ContainerNode>,
    root: ContainerId,
}

impl MappingTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![ContainerNode {
                kind: ContainerKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            root: 0,
        }
    }

    pub fn root(&self) -> ContainerId {
        self.root
    }

    pub fn node(&self, id: ContainerId) -> crate::Result<&ContainerNode> {
        match self.nodes.get(id) {
            Some(node) => Ok(node),
            None => bail!("unknown container id {}", id),
        }
    }

    pub fn guard(&self, id: ContainerId) -> crate::Result<&GuardMapping> {
        match self.node(id)?.kind {
            ContainerKind::Guard(ref guard) => Ok(guard),
            ContainerKind::Root => bail!("container {} is not a guard", id),
        }
    }

    pub fn guard_mut(&mut self, id: ContainerId) -> crate::Result<&mut GuardMapping> {
        if id >= self.nodes.len() {
            bail!("unknown container id {}", id);
        }
        match self.nodes[id].kind {
            ContainerKind::Guard(ref mut guard) => Ok(guard),
            ContainerKind::Root => bail!("container {} is not a guard", id),
        }
    }

    /// Append a new guard container as the last child of `parent`.
    pub fn add_container(
        &mut self,
        parent: ContainerId,
        guard: GuardMapping,
    ) -> crate::Result<ContainerId> {
        self.node(parent)?;
        let id = self.nodes.len();
        self.nodes.push(ContainerNode {
            kind: ContainerKind::Guard(guard),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(MappingChild::Container(id));
        Ok(id)
    }

    pub fn add_assignment(
        &mut self,
        container: ContainerId,
        assignment: AssignmentMapping,
    ) -> crate::Result<()> {
        self.node(container)?;
        self.nodes[container]
            .children
            .push(MappingChild::Assignment(assignment));
        Ok(())
    }

    /// Append an initializer unless an equal one already exists in
    /// `container` or any of its ancestors. Returns whether it was added.
    pub fn add_initializer(
        &mut self,
        container: ContainerId,
        initializer: InitializerMapping,
    ) -> crate::Result<bool> {
        self.node(container)?;
        if self.contains_initializer(container, &initializer) {
            trace!(
                "initializer for {} already present in container chain",
                initializer.target()
            );
            return Ok(false);
        }
        self.nodes[container]
            .children
            .push(MappingChild::Initializer(initializer));
        Ok(true)
    }

    fn contains_initializer(&self, container: ContainerId, initializer: &InitializerMapping) -> bool {
        let mut current = Some(container);
        while let Some(id) = current {
            let node = &self.nodes[id];
            let found = node.children.iter().any(
                |child| matches!(child, MappingChild::Initializer(existing) if existing == initializer),
            );
            if found {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Deterministic indented text rendering of the tree, driven purely by
    /// insertion order. Used by tests and as a cheap emitter-side debug view.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_container(self.root, 0, &mut out);
        out
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn write_container(&self, id: ContainerId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        let indent = "  ".repeat(depth);
        match &node.kind {
            ContainerKind::Root => {
                let _ = writeln!(out, "{}root", indent);
            }
            ContainerKind::Guard(guard) => {
                let _ = write!(out, "{}guard {}", indent, guard.path());
                if guard.needs_null_safe_access {
                    let _ = write!(out, " (null-safe)");
                }
                match &guard.on_null {
                    Some(OnNullAction::AssignNull(setters)) => {
                        let _ = write!(
                            out,
                            " on-null: set-null {}",
                            setters.iter().map(|s| s.path.to_string()).join(", ")
                        );
                    }
                    Some(OnNullAction::RaiseMismatch) => {
                        let _ = write!(out, " on-null: mismatch");
                    }
                    None => {}
                }
                let _ = writeln!(out);
            }
        }
        for child in &node.children {
            match child {
                MappingChild::Assignment(assignment) => {
                    let indent = "  ".repeat(depth + 1);
                    match &assignment.getter {
                        Some(getter) => {
                            let _ = writeln!(
                                out,
                                "{}assign {} = {}",
                                indent, assignment.setter.path, getter.path
                            );
                        }
                        None => {
                            let _ = writeln!(out, "{}assign {}", indent, assignment.setter.path);
                        }
                    }
                }
                MappingChild::Initializer(initializer) => {
                    let indent = "  ".repeat(depth + 1);
                    let form = match initializer {
                        InitializerMapping::Coalesce { .. } => "coalesce",
                        InitializerMapping::GetCheckSet { .. } => "get-check-set",
                    };
                    let _ = writeln!(out, "{}init {} {}", indent, initializer.target(), form);
                }
                MappingChild::Container(child_id) => {
                    self.write_container(*child_id, depth + 1, out);
                }
            }
        }
    }
}

impl Default for MappingTree {
    fn default() -> Self {
        MappingTree::new()
    }
}
