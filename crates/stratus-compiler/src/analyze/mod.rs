//! Semantic analysis passes.
//!
//! Passes run in this order over one module tree:
//! - Binding: full names and the item directory (bind)
//! - Interpolated-string desugaring (normalize)
//! - Constant folding to a fixed point (evaluate)
//! - Dependency edges between items (resolve)
//! - Semantic validation (validation, cycles)

pub mod bind;
pub mod cycles;
mod directory;
pub mod evaluate;
pub mod interpolation;
pub mod normalize;
pub mod resolve;
pub mod validation;

#[cfg(test)]
mod bind_tests;
#[cfg(test)]
mod evaluate_tests;
#[cfg(test)]
mod normalize_tests;

pub use bind::bind;
pub use cycles::validate_dependency_cycles;
pub use directory::ItemDirectory;
pub use evaluate::{FoldStats, evaluate};
pub use normalize::normalize;
pub use resolve::resolve_dependencies;
