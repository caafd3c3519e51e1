use crate::span::Span;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// The reportable conditions of the mapping build. Each descriptor carries a
/// stable code so the host can match on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticDescriptor {
    /// An intermediate nullable target member cannot be auto-initialized
    /// because its type has no accessible parameterless constructor.
    NoParameterlessConstructorFound,
    /// A user-implemented mapping method cannot be inlined into a
    /// restricted expression.
    CannotInline,
}

impl DiagnosticDescriptor {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticDescriptor::NoParameterlessConstructorFound => "MAP012",
            DiagnosticDescriptor::CannotInline => "MAP068",
        }
    }

    pub fn level(&self) -> DiagnosticLevel {
        match self {
            DiagnosticDescriptor::NoParameterlessConstructorFound => DiagnosticLevel::Error,
            DiagnosticDescriptor::CannotInline => DiagnosticLevel::Warning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DiagnosticDescriptor::NoParameterlessConstructorFound => {
                "no accessible parameterless constructor found"
            }
            DiagnosticDescriptor::CannotInline => {
                "mapping method cannot be inlined into an expression"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub descriptor: DiagnosticDescriptor,
    pub level: DiagnosticLevel,
    pub message: String,
    /// The symbol, path or type pair the condition applies to.
    pub context: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(descriptor: DiagnosticDescriptor, context: impl Display) -> Self {
        Self {
            descriptor,
            level: descriptor.level(),
            message: descriptor.message().to_string(),
            context: context.to_string(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.descriptor.code(), self.message, self.context)?;
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

/// Accumulating, non-fatal diagnostics sink. Cloning shares the underlying
/// buffer, so the host keeps one handle and hands clones to each build.
#[derive(Debug, Clone)]
pub struct DiagnosticManager {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticManager {
    pub fn new() -> Self {
        Self {
            diagnostics: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn report(&self, descriptor: DiagnosticDescriptor, context: impl Display) {
        self.add_diagnostic(Diagnostic::new(descriptor, context));
    }

    pub fn report_with_span(
        &self,
        descriptor: DiagnosticDescriptor,
        context: impl Display,
        span: Span,
    ) {
        self.add_diagnostic(Diagnostic::new(descriptor, context).with_span(span));
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }

    pub fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .map(|d| d.iter().any(|diag| diag.level == DiagnosticLevel::Error))
            .unwrap_or(false)
    }

    pub fn count_of(&self, descriptor: DiagnosticDescriptor) -> usize {
        self.diagnostics
            .lock()
            .map(|d| d.iter().filter(|diag| diag.descriptor == descriptor).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics
            .lock()
            .map(|d| d.is_empty())
            .unwrap_or(true)
    }
}

impl Default for DiagnosticManager {
    fn default() -> Self {
        DiagnosticManager::new()
    }
}
