//! Generation layering over a "requires" relation.
//!
//! Items that nothing requires sit at depth 0; every other item sits one
//! level deeper than its deepest requirer. Generations are emitted deepest
//! first, so each dependency is emitted strictly before every item that
//! requires it and callers can process the generations left to right.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::error::GraphError;

/// A universe of items plus the direct requirements declared between them.
#[derive(Debug, Clone)]
pub struct DependencyGraph<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
    /// item -> items it requires
    requires: Vec<BTreeSet<usize>>,
    /// item -> items that require it
    required_by: Vec<BTreeSet<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

impl<T> DependencyGraph<T>
where
    T: Clone + Eq + Hash + Debug,
{
    /// Register the full universe. Duplicates are ignored; items without
    /// relations are still members.
    pub fn new(universe: impl IntoIterator<Item = T>) -> Self {
        let mut graph = Self {
            items: Vec::new(),
            positions: HashMap::new(),
            requires: Vec::new(),
            required_by: Vec::new(),
        };
        for item in universe {
            if graph.positions.contains_key(&item) {
                continue;
            }
            graph.positions.insert(item.clone(), graph.items.len());
            graph.items.push(item);
            graph.requires.push(BTreeSet::new());
            graph.required_by.push(BTreeSet::new());
        }
        graph
    }

    /// Record that `item` directly requires each of `deps`.
    ///
    /// Repeated calls for the same item add edges. Nothing is recorded if
    /// any endpoint is outside the universe.
    pub fn integrate<'a, I>(&mut self, item: &T, deps: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let requirer = self.position(item)?;
        let deps = deps
            .into_iter()
            .map(|dep| self.position(dep))
            .collect::<Result<Vec<_>, _>>()?;
        for dep in deps {
            self.requires[requirer].insert(dep);
            self.required_by[dep].insert(requirer);
        }
        Ok(())
    }

    fn position(&self, item: &T) -> Result<usize, GraphError> {
        self.positions
            .get(item)
            .copied()
            .ok_or_else(|| GraphError::UnknownItem {
                item: format!("{item:?}"),
            })
    }

    /// Number of items in the universe.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    /// Items in the universe, in registration order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Direct requirements of `item`, in registration order.
    pub fn requirements_of(&self, item: &T) -> Result<Vec<&T>, GraphError> {
        let pos = self.position(item)?;
        Ok(self.requires[pos].iter().map(|&i| &self.items[i]).collect())
    }

    /// Items that directly require `item`, in registration order.
    pub fn requirers_of(&self, item: &T) -> Result<Vec<&T>, GraphError> {
        let pos = self.position(item)?;
        Ok(self.required_by[pos].iter().map(|&i| &self.items[i]).collect())
    }

    /// Depth of a single item.
    pub fn depth(&self, item: &T) -> Result<usize, GraphError> {
        let pos = self.position(item)?;
        Ok(self.depths()?[pos])
    }

    /// Compute every item's depth.
    ///
    /// Iterative depth-first walk along the requirer direction with
    /// memoised results; meeting an item that is still in progress means
    /// the relation has a cycle.
    fn depths(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.items.len();
        let requirers: Vec<Vec<usize>> = self
            .required_by
            .iter()
            .map(|set| set.iter().copied().collect())
            .collect();
        let mut state = vec![Visit::Unvisited; n];
        let mut depth = vec![0usize; n];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..n {
            if state[start] != Visit::Unvisited {
                continue;
            }
            state[start] = Visit::InProgress;
            stack.push((start, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&next) = requirers[node].get(top.1) {
                    top.1 += 1;
                    match state[next] {
                        Visit::Unvisited => {
                            state[next] = Visit::InProgress;
                            stack.push((next, 0));
                        }
                        Visit::InProgress => return Err(self.cycle_error(&stack, next)),
                        Visit::Done => {}
                    }
                } else {
                    depth[node] = requirers[node]
                        .iter()
                        .map(|&r| depth[r] + 1)
                        .max()
                        .unwrap_or(0);
                    state[node] = Visit::Done;
                    stack.pop();
                }
            }
        }

        Ok(depth)
    }

    /// Describe the cycle closed by `back_to`, in "requires" direction.
    fn cycle_error(&self, stack: &[(usize, usize)], back_to: usize) -> GraphError {
        let from = stack
            .iter()
            .position(|&(node, _)| node == back_to)
            .unwrap_or(0);
        let mut path: Vec<String> = vec![format!("{:?}", self.items[back_to])];
        path.extend(
            stack[from..]
                .iter()
                .rev()
                .map(|&(node, _)| format!("{:?}", self.items[node])),
        );
        GraphError::CyclicRequirement {
            cycle: path.join(" requires "),
        }
    }

    /// Group the universe into generations, deepest first.
    ///
    /// Every item appears exactly once; within a generation items keep
    /// registration order.
    pub fn generations(&self) -> Result<Vec<Vec<T>>, GraphError> {
        if self.items.is_empty() {
            return Ok(Vec::new());
        }
        let depths = self.depths()?;
        let max_depth = depths.iter().copied().max().unwrap_or(0);
        let mut groups: Vec<Vec<T>> = vec![Vec::new(); max_depth + 1];
        for (item, &d) in self.items.iter().zip(&depths) {
            groups[max_depth - d].push(item.clone());
        }
        debug!(
            items = self.items.len(),
            generations = groups.len(),
            "computed dependency generations"
        );
        Ok(groups)
    }
}
