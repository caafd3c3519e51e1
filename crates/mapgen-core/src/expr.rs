//! The restricted expression sub-language.
//!
//! Expressions built here are data handed to an emitter, never executed.
//! The in-language kinds are the subset usable inside a composed mapping
//! expression; `Block`, `Assign` and `Loop` exist so that statement-flavored
//! user code can be represented and then rejected by the inline rewriter.

use crate::span::Span;
use crate::symbol::{Ident, TypePair, TypeRef};
use derive_more::From;
use serde::{Deserialize, Serialize};

pub type BExpr = Box<Expr>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default, skip_serializing_if = "Span::is_dummy")]
    pub span: Span,
    #[serde(flatten)]
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, From)]
pub enum ExprKind {
    /// Reference to the mapping method's source parameter.
    Param(Ident),
    Select(ExprSelect),
    InvokeMapping(ExprInvokeMapping),
    MethodCall(ExprMethodCall),
    BinOp(ExprBinOp),
    UnOp(ExprUnOp),
    Conditional(ExprConditional),
    Construct(ExprConstruct),
    Literal(Value),
    Block(ExprBlock),
    Assign(ExprAssign),
    Loop(ExprLoop),
}

/// Member access, optionally null-conditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprSelect {
    pub obj: BExpr,
    pub member: Ident,
    pub null_conditional: bool,
}

/// Invocation of another generated mapping function, identified by its
/// source/target type pair. Mapping functions take exactly one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprInvokeMapping {
    pub mapping: TypePair,
    pub arg: BExpr,
}

/// Ordinary method invocation; passes through inlining untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprMethodCall {
    pub obj: BExpr,
    pub method: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprBinOp {
    pub op: BinOpKind,
    pub lhs: BExpr,
    pub rhs: BExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Coalesce,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprUnOp {
    pub op: UnOpKind,
    pub expr: BExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOpKind {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprConditional {
    pub cond: BExpr,
    pub then: BExpr,
    pub otherwise: BExpr,
}

/// Object creation with optional member initializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprConstruct {
    pub ty: TypeRef,
    pub args: Vec<Expr>,
    pub initializers: Vec<(Ident, Expr)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

/// Statement body fragment; outside the sub-language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprBlock {
    pub stmts: Vec<Expr>,
}

/// Mutation; outside the sub-language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprAssign {
    pub target: BExpr,
    pub value: BExpr,
}

/// Iteration; outside the sub-language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprLoop {
    pub body: BExpr,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            span: Span::dummy(),
            kind,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn param(name: impl Into<Ident>) -> Expr {
        ExprKind::Param(name.into()).into()
    }

    pub fn select(obj: Expr, member: impl Into<Ident>) -> Expr {
        ExprKind::Select(ExprSelect {
            obj: obj.into(),
            member: member.into(),
            null_conditional: false,
        })
        .into()
    }

    pub fn select_null_conditional(obj: Expr, member: impl Into<Ident>) -> Expr {
        ExprKind::Select(ExprSelect {
            obj: obj.into(),
            member: member.into(),
            null_conditional: true,
        })
        .into()
    }

    pub fn invoke_mapping(mapping: TypePair, arg: Expr) -> Expr {
        ExprKind::InvokeMapping(ExprInvokeMapping {
            mapping,
            arg: arg.into(),
        })
        .into()
    }

    pub fn method_call(obj: Expr, method: impl Into<Ident>, args: Vec<Expr>) -> Expr {
        ExprKind::MethodCall(ExprMethodCall {
            obj: obj.into(),
            method: method.into(),
            args,
        })
        .into()
    }

    pub fn bin_op(op: BinOpKind, lhs: Expr, rhs: Expr) -> Expr {
        ExprKind::BinOp(ExprBinOp {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        })
        .into()
    }

    pub fn un_op(op: UnOpKind, expr: Expr) -> Expr {
        ExprKind::UnOp(ExprUnOp {
            op,
            expr: expr.into(),
        })
        .into()
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        ExprKind::Conditional(ExprConditional {
            cond: cond.into(),
            then: then.into(),
            otherwise: otherwise.into(),
        })
        .into()
    }

    pub fn construct(ty: TypeRef, args: Vec<Expr>, initializers: Vec<(Ident, Expr)>) -> Expr {
        ExprKind::Construct(ExprConstruct {
            ty,
            args,
            initializers,
        })
        .into()
    }

    pub fn value(value: Value) -> Expr {
        ExprKind::Literal(value).into()
    }

    pub fn null() -> Expr {
        Expr::value(Value::Null)
    }

    pub fn assign(target: Expr, value: Expr) -> Expr {
        ExprKind::Assign(ExprAssign {
            target: target.into(),
            value: value.into(),
        })
        .into()
    }

    pub fn block(stmts: Vec<Expr>) -> Expr {
        ExprKind::Block(ExprBlock { stmts }).into()
    }

    pub fn loop_(body: Expr) -> Expr {
        ExprKind::Loop(ExprLoop { body: body.into() }).into()
    }

    /// Replace every reference to `param` with `replacement`. The
    /// sub-language has no binders, so the substitution is capture-free by
    /// construction.
    pub fn substitute_param(&self, param: &Ident, replacement: &Expr) -> Expr {
        let kind = match &self.kind {
            ExprKind::Param(name) if name == param => return replacement.clone(),
            ExprKind::Param(name) => ExprKind::Param(name.clone()),
            ExprKind::Select(select) => ExprKind::Select(ExprSelect {
                obj: select.obj.substitute_param(param, replacement).into(),
                member: select.member.clone(),
                null_conditional: select.null_conditional,
            }),
            ExprKind::InvokeMapping(invoke) => ExprKind::InvokeMapping(ExprInvokeMapping {
                mapping: invoke.mapping.clone(),
                arg: invoke.arg.substitute_param(param, replacement).into(),
            }),
            ExprKind::MethodCall(call) => ExprKind::MethodCall(ExprMethodCall {
                obj: call.obj.substitute_param(param, replacement).into(),
                method: call.method.clone(),
                args: call
                    .args
                    .iter()
                    .map(|arg| arg.substitute_param(param, replacement))
                    .collect(),
            }),
            ExprKind::BinOp(bin_op) => ExprKind::BinOp(ExprBinOp {
                op: bin_op.op,
                lhs: bin_op.lhs.substitute_param(param, replacement).into(),
                rhs: bin_op.rhs.substitute_param(param, replacement).into(),
            }),
            ExprKind::UnOp(un_op) => ExprKind::UnOp(ExprUnOp {
                op: un_op.op,
                expr: un_op.expr.substitute_param(param, replacement).into(),
            }),
            ExprKind::Conditional(conditional) => ExprKind::Conditional(ExprConditional {
                cond: conditional.cond.substitute_param(param, replacement).into(),
                then: conditional.then.substitute_param(param, replacement).into(),
                otherwise: conditional
                    .otherwise
                    .substitute_param(param, replacement)
                    .into(),
            }),
            ExprKind::Construct(construct) => ExprKind::Construct(ExprConstruct {
                ty: construct.ty.clone(),
                args: construct
                    .args
                    .iter()
                    .map(|arg| arg.substitute_param(param, replacement))
                    .collect(),
                initializers: construct
                    .initializers
                    .iter()
                    .map(|(member, init)| {
                        (member.clone(), init.substitute_param(param, replacement))
                    })
                    .collect(),
            }),
            ExprKind::Literal(value) => ExprKind::Literal(value.clone()),
            ExprKind::Block(block) => ExprKind::Block(ExprBlock {
                stmts: block
                    .stmts
                    .iter()
                    .map(|stmt| stmt.substitute_param(param, replacement))
                    .collect(),
            }),
            ExprKind::Assign(assign) => ExprKind::Assign(ExprAssign {
                target: assign.target.substitute_param(param, replacement).into(),
                value: assign.value.substitute_param(param, replacement).into(),
            }),
            ExprKind::Loop(loop_expr) => ExprKind::Loop(ExprLoop {
                body: loop_expr.body.substitute_param(param, replacement).into(),
            }),
        };
        Expr {
            span: self.span,
            kind,
        }
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}
