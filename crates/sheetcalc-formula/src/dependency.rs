//! Dependency tracking for formula calculation
//!
//! An edge `A -> B` means "A's formula reads B". Both directions are stored:
//! `precedents` answers "what does A read?" and `dependents` answers "who
//! reads B?". Edges are only ever committed after [`would_create_cycle`]
//! has cleared them, so the graph stays acyclic.
//!
//! [`would_create_cycle`]: DependencyGraph::would_create_cycle

use ahash::AHashMap;
use sheetcalc_core::CellAddress;
use std::collections::{BTreeSet, VecDeque};
use tracing::warn;

/// Dependency graph for formula cells
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell -> Cells that read it (dependents)
    dependents: AHashMap<CellAddress, BTreeSet<CellAddress>>,
    /// Cell -> Cells it reads (precedents)
    precedents: AHashMap<CellAddress, BTreeSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all outgoing edges of `cell` with edges to `references`
    pub fn set_dependencies<I>(&mut self, cell: CellAddress, references: I)
    where
        I: IntoIterator<Item = CellAddress>,
    {
        self.clear_dependencies(cell);

        let references: BTreeSet<CellAddress> = references.into_iter().collect();
        if references.is_empty() {
            return;
        }

        for &precedent in &references {
            self.dependents.entry(precedent).or_default().insert(cell);
        }
        self.precedents.insert(cell, references);
    }

    /// Remove the outgoing edges of a cell
    ///
    /// Cells that read `cell` keep their edges.
    pub fn clear_dependencies(&mut self, cell: CellAddress) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Whether giving `cell` the edges `references` would close a cycle
    ///
    /// Runs before commit: a cycle exists if `cell` reads itself or if any
    /// referenced cell already reads `cell`, directly or transitively.
    pub fn would_create_cycle(&self, cell: CellAddress, references: &BTreeSet<CellAddress>) -> bool {
        if references.contains(&cell) {
            return true;
        }

        let mut visited = BTreeSet::new();
        let mut stack: Vec<CellAddress> = references.iter().copied().collect();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.precedents_of(current));
        }

        false
    }

    /// Every cell that transitively reads `cell`, excluding `cell` itself
    pub fn affected_closure(&self, cell: CellAddress) -> BTreeSet<CellAddress> {
        let mut affected = BTreeSet::new();
        let mut queue = VecDeque::from([cell]);

        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents_of(current) {
                if dependent != cell && affected.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        affected
    }

    /// Order `subset` so every cell comes after the cells it reads
    ///
    /// Only edges with both ends inside `subset` count. Ties are broken in
    /// row-major order, so the result is deterministic.
    pub fn topo_order(&self, subset: &BTreeSet<CellAddress>) -> Vec<CellAddress> {
        let mut in_degree: AHashMap<CellAddress, usize> = subset
            .iter()
            .map(|&cell| {
                let degree = self
                    .precedents_of(cell)
                    .filter(|p| subset.contains(p))
                    .count();
                (cell, degree)
            })
            .collect();

        let mut ready: BTreeSet<CellAddress> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&cell, _)| cell)
            .collect();

        let mut order = Vec::with_capacity(subset.len());

        while let Some(cell) = ready.pop_first() {
            order.push(cell);
            for dependent in self.dependents_of(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() < subset.len() {
            // Unreachable while edges go through would_create_cycle
            let placed: BTreeSet<CellAddress> = order.iter().copied().collect();
            let leftover: Vec<CellAddress> = subset.difference(&placed).copied().collect();
            warn!(
                count = leftover.len(),
                "cycle in dependency graph; appending cells in row-major order"
            );
            order.extend(leftover);
        }

        order
    }

    /// Get cells that read the given cell
    pub fn dependents_of(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell reads
    pub fn precedents_of(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(BTreeSet::len).sum()
    }

    /// Exhaustive acyclicity check over the whole graph
    pub fn is_acyclic(&self) -> bool {
        let nodes: BTreeSet<CellAddress> = self
            .precedents
            .keys()
            .chain(self.dependents.keys())
            .copied()
            .collect();

        let mut in_degree: AHashMap<CellAddress, usize> = nodes
            .iter()
            .map(|&cell| (cell, self.precedents_of(cell).count()))
            .collect();

        let mut ready: Vec<CellAddress> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&cell, _)| cell)
            .collect();

        let mut visited = 0;
        while let Some(cell) = ready.pop() {
            visited += 1;
            for dependent in self.dependents_of(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(dependent);
                    }
                }
            }
        }

        visited == nodes.len()
    }
}
