use crate::error::{Error, Result};
use crate::symbol::{MemberDef, TypeRef};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Ordered chain of member accesses rooted at a type.
///
/// Paths are value types: two paths compare and hash equal iff root type and
/// step sequence are equal, which makes them usable as map keys during a
/// build. A path always contains at least one step.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct MemberPath {
    root: TypeRef,
    steps: Vec<MemberDef>,
}

impl MemberPath {
    pub fn new(root: TypeRef, steps: Vec<MemberDef>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::InvalidPath(format!(
                "path rooted at {} has no steps",
                root
            )));
        }
        Ok(Self { root, steps })
    }

    fn from_parts(root: TypeRef, steps: Vec<MemberDef>) -> Self {
        Self { root, steps }
    }

    pub fn root_type(&self) -> &TypeRef {
        &self.root
    }

    pub fn steps(&self) -> &[MemberDef] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// The leaf member the path ends at.
    pub fn member(&self) -> &MemberDef {
        &self.steps[self.steps.len() - 1]
    }

    /// All steps except the leaf member.
    pub fn object_path(&self) -> &[MemberDef] {
        &self.steps[..self.steps.len() - 1]
    }

    /// Leading prefix of the first `len` steps. `len` must be in
    /// `1..=self.len()`.
    pub fn sub_path(&self, len: usize) -> MemberPath {
        MemberPath::from_parts(self.root.clone(), self.steps[..len].to_vec())
    }

    /// The longest leading sub-path ending at the last nullable step, i.e.
    /// the path minus its trailing non-nullable suffix. `None` when no step
    /// is nullable.
    pub fn without_trailing_non_nullable(&self) -> Option<MemberPath> {
        let last_nullable = self.steps.iter().rposition(|step| step.nullable)?;
        Some(self.sub_path(last_nullable + 1))
    }

    /// Every proper leading sub-path of the object path whose final step is
    /// nullable, ordered shallowest to deepest.
    pub fn object_path_nullable_sub_paths(&self) -> impl Iterator<Item = MemberPath> + '_ {
        (1..self.steps.len())
            .filter(|&len| self.steps[len - 1].nullable)
            .map(|len| self.sub_path(len))
    }
}

impl std::fmt::Display for MemberPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}",
            self.root,
            self.steps.iter().map(|step| step.name.as_str()).join(".")
        )
    }
}
