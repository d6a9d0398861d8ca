//! Processing order for native record types.

use gwalink_schema::{Keyword, Layer};

use crate::error::GraphError;
use crate::graph::DependencyGraph;

/// Build the requirement graph for every keyword of a layer.
///
/// References to keywords outside the layer are dropped, so for example
/// members in the design layer do not wait on analysis elements.
pub fn keyword_graph(layer: Layer) -> Result<DependencyGraph<Keyword>, GraphError> {
    let keywords = Keyword::in_layer_all(layer);
    let mut graph = DependencyGraph::new(keywords.iter().copied());
    for kw in &keywords {
        let refs = kw.references().iter().filter(|r| r.in_layer(layer));
        graph.integrate(kw, refs)?;
    }
    Ok(graph)
}

/// Keyword generations for a layer: every keyword appears after all the
/// keywords its records reference.
pub fn keyword_generations(layer: Layer) -> Result<Vec<Vec<Keyword>>, GraphError> {
    keyword_graph(layer)?.generations()
}
