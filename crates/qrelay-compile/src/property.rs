//! Target description and the properties passes share.
//!
//! A [`Target`] is what a backend advertises: how many qubits it has, which
//! gates it executes natively and, for hardware-like backends, which qubit
//! pairs can interact. [`PropertySet`] carries the same information through
//! the pass pipeline together with the [`Layout`] chosen by the layout pass.
//!
//! ```
//! use qrelay_compile::{BasisGates, CouplingMap, Target};
//!
//! let target = Target::new("line", 5, BasisGates::ibm())
//!     .with_coupling_map(CouplingMap::linear(5));
//!
//! assert!(target.coupling_map().unwrap().is_connected(1, 2));
//! assert!(target.basis_gates().contains("sx"));
//! ```

use std::collections::VecDeque;

use qrelay_ir::QubitId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A mapping from logical qubits to physical qubits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    /// Map from logical qubit to physical qubit index.
    logical_to_physical: FxHashMap<QubitId, u32>,
    /// Map from physical qubit index to logical qubit.
    physical_to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial layout (logical qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = Self::new();
        for i in 0..num_qubits {
            layout.add(QubitId(i), i);
        }
        layout
    }

    /// Add a mapping from logical to physical qubit, replacing any mapping
    /// either side already had.
    pub fn add(&mut self, logical: QubitId, physical: u32) {
        if let Some(old_logical) = self.physical_to_logical.insert(physical, logical) {
            if old_logical != logical {
                self.logical_to_physical.remove(&old_logical);
            }
        }
        if let Some(old_physical) = self.logical_to_physical.insert(logical, physical) {
            if old_physical != physical {
                self.physical_to_logical.remove(&old_physical);
            }
        }
    }

    /// Get the physical qubit for a logical qubit.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Get the logical qubit for a physical qubit.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Swap the contents of two physical qubits.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical.remove(&p1);
        let l2 = self.physical_to_logical.remove(&p2);

        if let Some(l1) = l1 {
            self.logical_to_physical.insert(l1, p2);
            self.physical_to_logical.insert(p2, l1);
        }
        if let Some(l2) = l2 {
            self.logical_to_physical.insert(l2, p1);
            self.physical_to_logical.insert(p1, l2);
        }
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }
}

/// Target device coupling map.
///
/// Edges are undirected. All-pairs shortest paths are computed once on
/// construction so routing can look distances and paths up directly.
/// Only the qubit count and edges are serialized; the lookup tables are
/// rebuilt when a map is deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CouplingEdges", into = "CouplingEdges")]
pub struct CouplingMap {
    /// Connected qubit pairs.
    edges: Vec<(u32, u32)>,
    /// Number of physical qubits.
    num_qubits: u32,
    adjacency: FxHashMap<u32, Vec<u32>>,
    /// `dist_matrix[from][to]`, or `u32::MAX` if unreachable.
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the node before `to` on a shortest path.
    pred_matrix: Vec<Vec<u32>>,
}

/// Serialized form of a [`CouplingMap`].
#[derive(Serialize, Deserialize)]
struct CouplingEdges {
    num_qubits: u32,
    edges: Vec<(u32, u32)>,
}

impl From<CouplingEdges> for CouplingMap {
    fn from(raw: CouplingEdges) -> Self {
        Self::from_edges(raw.num_qubits, &raw.edges)
    }
}

impl From<CouplingMap> for CouplingEdges {
    fn from(map: CouplingMap) -> Self {
        Self {
            num_qubits: map.num_qubits,
            edges: map.edges,
        }
    }
}

impl CouplingMap {
    /// Create a coupling map from an explicit edge list.
    pub fn from_edges(num_qubits: u32, edges: &[(u32, u32)]) -> Self {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: FxHashMap::default(),
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        for &(a, b) in edges {
            map.add_edge(a, b);
        }
        map.precompute_distances();
        map
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self::from_edges(n, &edges)
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        let edges: Vec<_> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        Self::from_edges(n, &edges)
    }

    /// Duplicate edges (in either direction) are ignored.
    fn add_edge(&mut self, q1: u32, q2: u32) {
        if self.is_connected(q1, q2) {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency.entry(q1).or_default().push(q2);
        self.adjacency.entry(q2).or_default().push(q1);
    }

    /// BFS from each node.
    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src as u32);

            while let Some(current) = queue.pop_front() {
                let cur = current as usize;
                for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                    let nb = neighbor as usize;
                    if nb < n && self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = current;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Check if two qubits are directly connected.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(&q1)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Shortest-path distance, `None` if unreachable.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist_matrix.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// Shortest path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;

        let f = from as usize;
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = self.pred_matrix[f][current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// Basis gates for the target device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    /// List of gate names in the basis.
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a new basis gates set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the basis gates.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// IBM basis (RZ + SX + X + CX).
    pub fn ibm() -> Self {
        Self::new(["id", "rz", "sx", "x", "cx", "measure", "reset", "barrier"])
    }

    /// Every gate the circuit model knows.
    pub fn universal() -> Self {
        Self::new([
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
            "u", "cx", "cy", "cz", "ch", "swap", "crx", "cry", "crz", "cp", "rxx", "rzz", "ccx",
            "cswap", "measure", "reset", "barrier",
        ])
    }
}

/// What a backend can execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    name: String,
    num_qubits: u32,
    basis_gates: BasisGates,
    coupling_map: Option<CouplingMap>,
}

impl Target {
    /// A target with all-to-all connectivity.
    pub fn new(name: impl Into<String>, num_qubits: u32, basis_gates: BasisGates) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            basis_gates,
            coupling_map: None,
        }
    }

    /// An ideal simulator target: universal basis, no connectivity limits.
    pub fn ideal(name: impl Into<String>, num_qubits: u32) -> Self {
        Self::new(name, num_qubits, BasisGates::universal())
    }

    /// Restrict two-qubit gates to the pairs of a coupling map.
    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.coupling_map = Some(coupling_map);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn basis_gates(&self) -> &BasisGates {
        &self.basis_gates
    }

    pub fn coupling_map(&self) -> Option<&CouplingMap> {
        self.coupling_map.as_ref()
    }
}

/// Properties shared between compilation passes.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Logical-to-physical mapping, set by the layout pass and kept current
    /// by routing.
    pub layout: Option<Layout>,
    /// Device connectivity.
    pub coupling_map: Option<CouplingMap>,
    /// Native gate set.
    pub basis_gates: Option<BasisGates>,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the coupling map and basis gates of a target.
    #[must_use]
    pub fn with_target(mut self, target: &Target) -> Self {
        self.coupling_map = target.coupling_map().cloned();
        self.basis_gates = Some(target.basis_gates().clone());
        self
    }
}
