//! Dependency generation layering.
//!
//! [`DependencyGraph`] groups a universe of items into ordered generations
//! so that every item comes after everything it requires. The write-back
//! and conversion pipelines use [`keyword_generations`] to decide which
//! native record types to process first.

pub mod error;
pub mod graph;
pub mod keywords;

pub use error::GraphError;
pub use graph::DependencyGraph;
pub use keywords::{keyword_generations, keyword_graph};
