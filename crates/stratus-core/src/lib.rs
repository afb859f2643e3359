#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Stratus compiler crates.
//!
//! - [`SourceMap`]: registry of module sources, addressed by [`SourceId`]
//! - [`Interner`]: string interning for cheap name comparison in graph passes
//! - [`utils`]: full-name scoping

mod interner;
mod source_map;
pub mod utils;


pub use interner::{Interner, Symbol};
pub use source_map::{Source, SourceId, SourceKind, SourceMap};
