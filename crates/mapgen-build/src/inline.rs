//! Inlining of user-implemented mapping methods.
//!
//! A user method can be embedded inside a restricted expression (e.g. a
//! query projection) only if its body is a single expression over one
//! parameter and stays within the sub-language. Invocations of other
//! generated mappings are replaced by their composed expressions; everything
//! that cannot be rewritten is reported and the caller falls back to an
//! invocation-based strategy.

use mapgen_core::diagnostics::{DiagnosticDescriptor, DiagnosticManager};
use mapgen_core::expr::{
    Expr, ExprBinOp, ExprConditional, ExprConstruct, ExprInvokeMapping, ExprKind, ExprMethodCall,
    ExprSelect, ExprUnOp,
};
use mapgen_core::span::Span;
use mapgen_core::symbol::{Ident, TypePair};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodBody {
    /// Single return-expression body.
    Expr(Expr),
    /// Statement body; never inlinable.
    Block,
}

/// One syntactic declaration of a user method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub span: Span,
    pub parameters: Vec<Ident>,
    pub body: MethodBody,
}

/// A user-implemented mapping method as handed over by the host after
/// symbol resolution. Partial methods may carry several declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMethodMapping {
    pub pair: TypePair,
    pub name: Ident,
    pub declarations: Vec<MethodDeclaration>,
}

/// A fully inlined mapping: the original method, its parameter, the
/// invocations the rewrite absorbed, and the composed expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedMapping {
    pub pair: TypePair,
    pub method: Ident,
    pub parameter: Ident,
    pub invocations: HashSet<TypePair>,
    pub body: Expr,
}

/// Lookup of already-built composed mappings by source/target type pair.
pub trait InlineMappingResolver {
    fn find_composed_mapping(&self, pair: &TypePair) -> Option<ComposedMapping>;
}

/// Try to inline a user-implemented mapping method.
///
/// Every failure mode reports [`DiagnosticDescriptor::CannotInline`] and
/// yields `None`; the attempt leaves no state behind, so retrying is
/// deterministic.
pub fn try_build_inline_mapping(
    method: &UserMethodMapping,
    resolver: &dyn InlineMappingResolver,
    diagnostics: &DiagnosticManager,
) -> Option<ComposedMapping> {
    let [declaration] = method.declarations.as_slice() else {
        diagnostics.report(DiagnosticDescriptor::CannotInline, &method.name);
        return None;
    };

    let MethodBody::Expr(body) = &declaration.body else {
        diagnostics.report_with_span(
            DiagnosticDescriptor::CannotInline,
            &method.name,
            declaration.span,
        );
        return None;
    };

    let [parameter] = declaration.parameters.as_slice() else {
        diagnostics.report_with_span(
            DiagnosticDescriptor::CannotInline,
            &method.name,
            declaration.span,
        );
        return None;
    };

    let mut rewriter = InlineExpressionRewriter::new(resolver, diagnostics, method.pair.clone());
    let body = rewriter.rewrite(body);
    if !rewriter.can_be_inlined() {
        diagnostics.report(DiagnosticDescriptor::CannotInline, &method.name);
        return None;
    }

    debug!("inlined mapping method {} for {}", method.name, method.pair);
    Some(ComposedMapping {
        pair: method.pair.clone(),
        method: method.name.clone(),
        parameter: parameter.clone(),
        invocations: rewriter.invocations,
        body,
    })
}

/// Single-pass tree rewriter over the restricted expression sub-language.
///
/// The inlinable flag is a single-owner mutable result field: it turns
/// false at the first out-of-language construct, unresolvable invocation or
/// inlining cycle and never turns true again, while the traversal keeps
/// producing a structurally well-formed result.
pub struct InlineExpressionRewriter<'a> {
    resolver: &'a dyn InlineMappingResolver,
    diagnostics: &'a DiagnosticManager,
    can_be_inlined: bool,
    invocations: HashSet<TypePair>,
    active: Vec<TypePair>,
}

impl<'a> InlineExpressionRewriter<'a> {
    pub fn new(
        resolver: &'a dyn InlineMappingResolver,
        diagnostics: &'a DiagnosticManager,
        root: TypePair,
    ) -> Self {
        Self {
            resolver,
            diagnostics,
            can_be_inlined: true,
            invocations: HashSet::new(),
            active: vec![root],
        }
    }

    pub fn can_be_inlined(&self) -> bool {
        self.can_be_inlined
    }

    pub fn rewrite(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Param(name) => ExprKind::Param(name.clone()),
            ExprKind::Select(select) => ExprKind::Select(ExprSelect {
                obj: self.rewrite(&select.obj).into(),
                member: select.member.clone(),
                null_conditional: select.null_conditional,
            }),
            ExprKind::InvokeMapping(invoke) => return self.rewrite_invoke(expr.span, invoke),
            ExprKind::MethodCall(call) => ExprKind::MethodCall(ExprMethodCall {
                obj: self.rewrite(&call.obj).into(),
                method: call.method.clone(),
                args: call.args.iter().map(|arg| self.rewrite(arg)).collect(),
            }),
            ExprKind::BinOp(bin_op) => ExprKind::BinOp(ExprBinOp {
                op: bin_op.op,
                lhs: self.rewrite(&bin_op.lhs).into(),
                rhs: self.rewrite(&bin_op.rhs).into(),
            }),
            ExprKind::UnOp(un_op) => ExprKind::UnOp(ExprUnOp {
                op: un_op.op,
                expr: self.rewrite(&un_op.expr).into(),
            }),
            ExprKind::Conditional(conditional) => ExprKind::Conditional(ExprConditional {
                cond: self.rewrite(&conditional.cond).into(),
                then: self.rewrite(&conditional.then).into(),
                otherwise: self.rewrite(&conditional.otherwise).into(),
            }),
            ExprKind::Construct(construct) => ExprKind::Construct(ExprConstruct {
                ty: construct.ty.clone(),
                args: construct.args.iter().map(|arg| self.rewrite(arg)).collect(),
                initializers: construct
                    .initializers
                    .iter()
                    .map(|(member, init)| (member.clone(), self.rewrite(init)))
                    .collect(),
            }),
            ExprKind::Literal(value) => ExprKind::Literal(value.clone()),
            ExprKind::Block(_) | ExprKind::Assign(_) | ExprKind::Loop(_) => {
                trace!("expression outside the inline sub-language at {}", expr.span);
                self.can_be_inlined = false;
                return expr.clone();
            }
        };
        Expr { span: expr.span, kind }
    }

    fn rewrite_invoke(&mut self, span: Span, invoke: &ExprInvokeMapping) -> Expr {
        let arg = self.rewrite(&invoke.arg);

        if self.active.contains(&invoke.mapping) {
            self.diagnostics
                .report_with_span(DiagnosticDescriptor::CannotInline, &invoke.mapping, span);
            self.can_be_inlined = false;
            return Expr {
                span,
                kind: ExprKind::InvokeMapping(ExprInvokeMapping {
                    mapping: invoke.mapping.clone(),
                    arg: arg.into(),
                }),
            };
        }

        let Some(target) = self.resolver.find_composed_mapping(&invoke.mapping) else {
            self.diagnostics
                .report_with_span(DiagnosticDescriptor::CannotInline, &invoke.mapping, span);
            self.can_be_inlined = false;
            return Expr {
                span,
                kind: ExprKind::InvokeMapping(ExprInvokeMapping {
                    mapping: invoke.mapping.clone(),
                    arg: arg.into(),
                }),
            };
        };

        self.active.push(invoke.mapping.clone());
        let substituted = target.body.substitute_param(&target.parameter, &arg);
        let rewritten = self.rewrite(&substituted);
        self.active.pop();

        self.invocations.insert(invoke.mapping.clone());
        self.invocations.extend(target.invocations.iter().cloned());
        rewritten
    }
}
