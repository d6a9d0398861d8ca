//! Dependency graph errors.

use thiserror::Error;

/// Errors raised while building or layering a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An endpoint was never registered in the universe.
    #[error("item {item} is not part of the dependency universe")]
    UnknownItem { item: String },

    /// The requires relation loops back on itself.
    #[error("cyclic requirement: {cycle}")]
    CyclicRequirement { cycle: String },
}
