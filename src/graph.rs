//! The bidirected graph interface consumed by the path-cover planner, plus
//! an in-memory implementation for tests, per §4.F and §6.
//!
//! `follow_edges`'s left/right-traversal trick (going left from a handle
//! is going right from its flip, then flipping the results) and the
//! successor/predecessor shape of the trait are grounded on the corpus's
//! own small graph helper,
//! `other_examples/cc819d63_natir-CABnis__src-graph.rs.rs`.

/// An oriented reference to a node: `packed = (id << 1) | is_reverse`, the
/// same encoding the path-index builder expects for path steps (§6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn new(id: u64, is_reverse: bool) -> Self {
        Handle((id << 1) | is_reverse as u64)
    }

    pub fn id(&self) -> u64 {
        self.0 >> 1
    }

    pub fn is_reverse(&self) -> bool {
        self.0 & 1 != 0
    }

    pub fn flip(&self) -> Self {
        Handle(self.0 ^ 1)
    }

    pub fn packed(&self) -> u64 {
        self.0
    }
}

/// The consumed graph interface: nodes with positive integer ids, oriented
/// handles, and neighbor enumeration. `for_each_handle`'s `parallel` flag
/// from the source interface is dropped — this crate's callers are
/// single-threaded (see §5) — leaving a plain sequential visitor.
pub trait HandleGraph {
    fn min_node_id(&self) -> u64;
    fn max_node_id(&self) -> u64;
    fn node_count(&self) -> usize;

    /// Visits every handle (forward orientation) in implementation-defined
    /// order; `visit` returning `false` stops the traversal early.
    fn for_each_handle(&self, visit: &mut dyn FnMut(Handle) -> bool);

    /// Visits the neighbors reachable from `handle` in one step.
    /// `go_left` selects the direction; `visit` returning `false` stops
    /// early.
    fn follow_edges(&self, handle: Handle, go_left: bool, visit: &mut dyn FnMut(Handle) -> bool);

    fn get_handle(&self, id: u64, is_reverse: bool) -> Handle {
        Handle::new(id, is_reverse)
    }

    fn get_id(&self, handle: Handle) -> u64 {
        handle.id()
    }

    fn get_is_reverse(&self, handle: Handle) -> bool {
        handle.is_reverse()
    }

    fn flip(&self, handle: Handle) -> Handle {
        handle.flip()
    }
}

/// Maximal node-id-keyed subgraphs connected when edge direction is
/// ignored, in the iteration order of `for_each_handle`. A bit-vector
/// indexed by `id - min_node_id` tracks visited nodes, per §4.F.
pub fn weakly_connected_components<G: HandleGraph>(graph: &G) -> Vec<Vec<u64>> {
    if graph.node_count() == 0 {
        return Vec::new();
    }
    let min_id = graph.min_node_id();
    let max_id = graph.max_node_id();
    let span = (max_id - min_id + 1) as usize;
    let mut visited = vec![false; span];

    let mut order = Vec::with_capacity(graph.node_count());
    graph.for_each_handle(&mut |h| {
        order.push(h.id());
        true
    });

    let mut components = Vec::new();
    for start_id in order {
        let start_idx = (start_id - min_id) as usize;
        if visited[start_idx] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![start_id];
        visited[start_idx] = true;
        while let Some(id) = stack.pop() {
            component.push(id);
            for &is_reverse in &[false, true] {
                let h = graph.get_handle(id, is_reverse);
                for &go_left in &[false, true] {
                    let mut neighbors = Vec::new();
                    graph.follow_edges(h, go_left, &mut |nh| {
                        neighbors.push(nh.id());
                        true
                    });
                    for nid in neighbors {
                        let nidx = (nid - min_id) as usize;
                        if !visited[nidx] {
                            visited[nidx] = true;
                            stack.push(nid);
                        }
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

/// The lexicographically smaller of `window` and its reverse complement
/// (reverse the list, flip each handle), comparing element-wise by packed
/// handle value, per §4.F.
pub fn canonical_window(window: &[Handle]) -> Vec<Handle> {
    let rc: Vec<Handle> = window.iter().rev().map(Handle::flip).collect();
    if rc < window.to_vec() {
        rc
    } else {
        window.to_vec()
    }
}

/// A small in-memory adjacency-list [`HandleGraph`], for tests and for
/// embedders without their own graph type.
pub mod hash_graph {
    use super::{Handle, HandleGraph};
    use std::collections::{HashMap, HashSet};

    #[derive(Default, Clone, Debug)]
    pub struct HashGraph {
        order: Vec<u64>,
        present: HashSet<u64>,
        min_id: Option<u64>,
        max_id: Option<u64>,
        adjacency: HashMap<Handle, Vec<Handle>>,
    }

    impl HashGraph {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a node. Ids must be `>= 1`; duplicate calls are
        /// no-ops.
        pub fn add_node(&mut self, id: u64) {
            assert!(id >= 1, "node ids must be >= 1");
            if self.present.insert(id) {
                self.order.push(id);
                self.min_id = Some(self.min_id.map_or(id, |m| m.min(id)));
                self.max_id = Some(self.max_id.map_or(id, |m| m.max(id)));
            }
        }

        /// Adds a bidirected edge `from -> to`. The reciprocal edge
        /// `flip(to) -> flip(from)` is recorded automatically, so
        /// `follow_edges` sees the same connectivity from either endpoint.
        pub fn add_edge(&mut self, from: Handle, to: Handle) {
            self.adjacency.entry(from).or_default().push(to);
            let (rfrom, rto) = (to.flip(), from.flip());
            if (rfrom, rto) != (from, to) {
                self.adjacency.entry(rfrom).or_default().push(rto);
            }
        }
    }

    impl HandleGraph for HashGraph {
        fn min_node_id(&self) -> u64 {
            self.min_id.unwrap_or(0)
        }

        fn max_node_id(&self) -> u64 {
            self.max_id.unwrap_or(0)
        }

        fn node_count(&self) -> usize {
            self.order.len()
        }

        fn for_each_handle(&self, visit: &mut dyn FnMut(Handle) -> bool) {
            for &id in &self.order {
                if !visit(Handle::new(id, false)) {
                    break;
                }
            }
        }

        fn follow_edges(
            &self,
            handle: Handle,
            go_left: bool,
            visit: &mut dyn FnMut(Handle) -> bool,
        ) {
            let (lookup, flip_results) = if go_left {
                (handle.flip(), true)
            } else {
                (handle, false)
            };
            if let Some(neighbors) = self.adjacency.get(&lookup) {
                for &n in neighbors {
                    let n = if flip_results { n.flip() } else { n };
                    if !visit(n) {
                        break;
                    }
                }
            }
        }
    }

}
