// mapgen-build: builders that assemble mapping trees and inline expressions
//
// Architecture:
// - container: per-mapping builder that nests assignments under null guards
//   and emits intermediate target initializers
// - inline: rewrites user-implemented mapping method bodies into composed
//   expressions

pub mod container;
pub mod inline;

// Re-export key types for convenience
pub use container::*;
pub use inline::*;
