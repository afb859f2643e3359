//! Stratus compiler core: normalizer, constant folder, and dependency resolver.
//!
//! This crate turns a parsed module tree into an annotated tree ready for
//! template emission:
//! - `ast` - arena-backed declaration/expression model, visitor, substitution
//! - `analyze` - binder, normalizer, evaluator, dependency resolver, validators
//! - `diagnostics` - accumulated errors and warnings
//! - `pipeline` - staged facade over the passes

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod ast;
pub mod diagnostics;
pub mod pipeline;

#[cfg(test)]
pub mod test_utils;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity, Span};
pub use pipeline::{CompileConfig, ModuleBound, ModuleBuilder, ModuleFolded, ModuleResolved};

/// Errors that stop compilation.
///
/// Everything recoverable is reported through [`Diagnostics`] instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The evaluator did not reach a fixed point within its pass budget.
    #[error("evaluation limit exceeded after {passes} passes")]
    EvaluationFuelExhausted { passes: u32 },

    #[error("module compilation failed with {} errors", .0.error_count())]
    CompilationFailed(Diagnostics),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
