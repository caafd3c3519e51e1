#[macro_use]
pub mod macros;

pub mod cfg;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod path;
pub mod span;
pub mod symbol;
pub mod tree;

// Re-export commonly used items for convenience
pub use tracing;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
