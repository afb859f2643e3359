//! Semantic validation passes.
//!
//! Validates constraints that folding and resolution do not enforce:
//! - Macro and resource-type handlers (handlers)
//! - Finalizer dependencies (finalizer)
//! - Interpolated-string syntax (interpolations)

pub mod finalizer;
pub mod handlers;
pub mod interpolations;


pub use finalizer::analyze_finalizer;
pub use handlers::validate_handlers;
pub use interpolations::validate_interpolations;
