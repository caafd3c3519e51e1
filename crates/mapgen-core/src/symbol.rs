//! Symbol-layer value types and the resolution collaborator boundary.
//!
//! Everything the builders know about types and members flows in through
//! [`SymbolAccessor`]; the builders themselves never resolve anything.

use crate::expr::Expr;
use crate::path::MemberPath;
use serde::{Deserialize, Serialize};

/// A simple identifier - a single name like `value` or `MapToDto`
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident::new(name)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

/// Opaque reference to a resolved type. Identity is the fully qualified
/// name the resolver hands out.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Source/target type pair identifying one generated mapping function.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct TypePair {
    pub source: TypeRef,
    pub target: TypeRef,
}

impl TypePair {
    pub fn new(source: TypeRef, target: TypeRef) -> Self {
        Self { source, target }
    }
}

impl std::fmt::Display for TypePair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// One resolved member access step.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct MemberDef {
    pub declaring_type: TypeRef,
    pub name: Ident,
    pub ty: TypeRef,
    pub nullable: bool,
    pub settable: bool,
    pub gettable: bool,
}

impl MemberDef {
    pub fn new(declaring_type: TypeRef, name: impl Into<Ident>, ty: TypeRef) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            ty,
            nullable: false,
            settable: true,
            gettable: true,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.settable = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.gettable = false;
        self
    }
}

/// How a member access chain dereferences intermediate steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// Every step is a plain dereference; an ancestor guard already proved
    /// the chain non-null.
    Direct,
    /// Steps after a nullable member use null-conditional traversal.
    NullConditional,
}

/// Code fragment reading the value at a member path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberGetter {
    pub path: MemberPath,
    pub access: AccessMode,
}

impl MemberGetter {
    /// Expand the fragment into a select chain rooted at `receiver`.
    pub fn to_expr(&self, receiver: Expr) -> Expr {
        let mut expr = receiver;
        let steps = self.path.steps();
        for (index, step) in steps.iter().enumerate() {
            let null_conditional = self.access == AccessMode::NullConditional
                && index > 0
                && steps[index - 1].nullable;
            expr = if null_conditional {
                Expr::select_null_conditional(expr, step.name.clone())
            } else {
                Expr::select(expr, step.name.clone())
            };
        }
        expr
    }
}

/// Code fragment writing the value at a member path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSetter {
    pub path: MemberPath,
    /// Whether the underlying setter supports a native
    /// coalesce-on-null-then-assign form.
    pub supports_coalesce_assignment: bool,
}

/// The symbol/type resolution collaborator.
///
/// `build_getter`/`build_setter` have default implementations producing the
/// standard fragments; a resolver only overrides them when member access
/// goes through something other than plain gettable/settable members.
pub trait SymbolAccessor {
    fn has_accessible_parameterless_constructor(&self, ty: &TypeRef) -> bool;

    fn supports_coalesce_assignment(&self, path: &MemberPath) -> bool;

    fn build_getter(&self, path: &MemberPath, access: AccessMode) -> MemberGetter {
        MemberGetter {
            path: path.clone(),
            access,
        }
    }

    fn build_setter(&self, path: &MemberPath) -> MemberSetter {
        MemberSetter {
            path: path.clone(),
            supports_coalesce_assignment: self.supports_coalesce_assignment(path),
        }
    }
}
