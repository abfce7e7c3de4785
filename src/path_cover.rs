//! Coverage-driven greedy path-cover construction, per §4.G.
//!
//! `Coverage` is the pluggable scoring policy the design notes call for
//! ("future haplotype-aware variants plug in by replacing the scoring
//! policy"); `SimpleCoverage` is the counter-based implementation used by
//! default. `PathIndexBuilder` is the external sink's interface (§6); the
//! `RecordingPathIndexBuilder` in-memory implementation plays the role of
//! the out-of-scope succinct path index in tests.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::error::{GraphIndexError, Result};
use crate::graph::{canonical_window, weakly_connected_components, Handle, HandleGraph};

/// Minimum supported window length for path-cover construction.
pub const PATH_COVER_MIN_K: usize = 2;

/// Validated `(n, k)` parameters: `n` paths per component, window length
/// `k`. Defaults (`n=16, k=4`) match the historical defaults of the
/// path-cover tool this module generalizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathCoverParams {
    pub n: usize,
    pub k: usize,
}

impl Default for PathCoverParams {
    fn default() -> Self {
        Self { n: 16, k: 4 }
    }
}

impl PathCoverParams {
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k < PATH_COVER_MIN_K {
            log::error!("invalid path-cover parameter: k={k} (must be >= {PATH_COVER_MIN_K})");
            return Err(GraphIndexError::InvalidParameter(format!(
                "k must be >= {PATH_COVER_MIN_K}, got {k}"
            )));
        }
        if n == 0 {
            log::error!("invalid path-cover parameter: n=0");
            return Err(GraphIndexError::InvalidParameter(
                "n must be >= 1".to_string(),
            ));
        }
        Ok(Self { n, k })
    }
}

/// A pluggable coverage-scoring policy, keyed by whatever identifies a
/// coverage unit (a node id, or a canonical window).
///
/// `give_priority` returns the ordering used to pick the *best* (lowest
/// priority value) candidate; lower always wins, matching the "priority to
/// lower values" rule in §4.G.
pub trait Coverage<K> {
    fn no_coverage(&self) -> usize;
    fn worst_coverage(&self) -> usize;
    fn get(&self, key: &K) -> usize;
    fn give_priority(&self, a: usize, b: usize) -> std::cmp::Ordering {
        a.cmp(&b)
    }
    fn increase_coverage(&mut self, key: &K);
}

/// Plain per-key counters, the default `Coverage` implementation.
#[derive(Clone, Debug, Default)]
pub struct SimpleCoverage<K: Eq + Hash + Clone> {
    counts: std::collections::HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> SimpleCoverage<K> {
    pub fn new() -> Self {
        Self {
            counts: std::collections::HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Coverage<K> for SimpleCoverage<K> {
    fn no_coverage(&self) -> usize {
        0
    }

    fn worst_coverage(&self) -> usize {
        usize::MAX
    }

    fn get(&self, key: &K) -> usize {
        *self.counts.get(key).unwrap_or(&0)
    }

    fn increase_coverage(&mut self, key: &K) {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
    }
}

/// The produced path-index interface (§6). Node steps are encoded
/// `(id << 1) | is_reverse` by convention, matching [`Handle::packed`].
pub trait PathIndexBuilder {
    fn insert(&mut self, path: &[(u64, bool)], bidirectional: bool);
    fn add_path(&mut self, sample: usize, contig: usize, phase: usize, count: usize);
    fn set_samples(&mut self, samples: usize);
    fn set_haplotypes(&mut self, haplotypes: usize);
    fn set_contigs(&mut self, contigs: usize);
    fn finish(&mut self);
}

/// An in-memory, `Vec`-backed [`PathIndexBuilder`], for tests and for
/// embedders without their own succinct path index.
#[derive(Clone, Debug, Default)]
pub struct RecordingPathIndexBuilder {
    pub paths: Vec<Vec<(u64, bool)>>,
    pub path_names: Vec<(usize, usize, usize, usize)>,
    pub samples: usize,
    pub haplotypes: usize,
    pub contigs: usize,
    pub finished: bool,
}

impl RecordingPathIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathIndexBuilder for RecordingPathIndexBuilder {
    fn insert(&mut self, path: &[(u64, bool)], _bidirectional: bool) {
        self.paths.push(path.to_vec());
    }

    fn add_path(&mut self, sample: usize, contig: usize, phase: usize, count: usize) {
        self.path_names.push((sample, contig, phase, count));
    }

    fn set_samples(&mut self, samples: usize) {
        self.samples = samples;
    }

    fn set_haplotypes(&mut self, haplotypes: usize) {
        self.haplotypes = haplotypes;
    }

    fn set_contigs(&mut self, contigs: usize) {
        self.contigs = contigs;
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

fn packed_window(window: &[Handle]) -> Vec<u64> {
    canonical_window(window).iter().map(Handle::packed).collect()
}

/// The k-1 path handles nearest the extension point, plus `candidate`,
/// arranged into the k-window that scoring and coverage bookkeeping use.
fn extension_window(path: &VecDeque<Handle>, candidate: Handle, go_left: bool, k: usize) -> Vec<u64> {
    let window: Vec<Handle> = if go_left {
        let mut w = vec![candidate];
        w.extend(path.iter().take(k - 1).copied());
        w
    } else {
        let mut w: Vec<Handle> = path.iter().rev().take(k - 1).copied().collect();
        w.reverse();
        w.push(candidate);
        w
    };
    packed_window(&window)
}

#[allow(clippy::too_many_arguments)]
fn pick_extension(
    graph: &impl HandleGraph,
    from: Handle,
    go_left: bool,
    path: &VecDeque<Handle>,
    k: usize,
    node_set: &HashSet<u64>,
    visited: &HashSet<u64>,
    node_coverage: &SimpleCoverage<u64>,
    window_coverage: &SimpleCoverage<Vec<u64>>,
) -> Option<Handle> {
    let mut candidates = Vec::new();
    graph.follow_edges(from, go_left, &mut |h| {
        candidates.push(h);
        true
    });
    let candidates: Vec<Handle> = candidates
        .into_iter()
        .filter(|h| node_set.contains(&h.id()) && !visited.contains(&h.id()))
        .collect();

    let score = |h: &Handle| -> usize {
        if path.len() < k - 1 {
            node_coverage.get(&h.id())
        } else {
            window_coverage.get(&extension_window(path, *h, go_left, k))
        }
    };

    candidates
        .into_iter()
        .min_by(|a, b| score(a).cmp(&score(b)).then(a.id().cmp(&b.id())))
}

fn apply_extension(
    path: &mut VecDeque<Handle>,
    candidate: Handle,
    go_left: bool,
    k: usize,
    node_coverage: &mut SimpleCoverage<u64>,
    window_coverage: &mut SimpleCoverage<Vec<u64>>,
) {
    if path.len() + 1 >= k {
        let window = extension_window(path, candidate, go_left, k);
        window_coverage.increase_coverage(&window);
    }
    if go_left {
        path.push_front(candidate);
    } else {
        path.push_back(candidate);
    }
    node_coverage.increase_coverage(&candidate.id());
}

fn build_one_path(
    graph: &impl HandleGraph,
    nodes: &[u64],
    k: usize,
    node_coverage: &mut SimpleCoverage<u64>,
    window_coverage: &mut SimpleCoverage<Vec<u64>>,
) -> Vec<Handle> {
    let node_set: HashSet<u64> = nodes.iter().copied().collect();

    // Seed: minimum node_coverage, ties broken by lower id (§4.G step 1).
    // The source sorts a coverage array for this; a direct `min_by_key`
    // scan is equivalent and avoids the extra bookkeeping.
    let seed_id = *nodes
        .iter()
        .min_by(|&&a, &&b| {
            node_coverage
                .get(&a)
                .cmp(&node_coverage.get(&b))
                .then(a.cmp(&b))
        })
        .expect("component is non-empty");

    let mut path = VecDeque::new();
    path.push_back(Handle::new(seed_id, false));
    node_coverage.increase_coverage(&seed_id);

    loop {
        if path.len() >= nodes.len() {
            break;
        }

        let visited: HashSet<u64> = path.iter().map(|h| h.id()).collect();
        let mut extended = false;

        let last = *path.back().unwrap();
        if let Some(candidate) = pick_extension(
            graph,
            last,
            false,
            &path,
            k,
            &node_set,
            &visited,
            node_coverage,
            window_coverage,
        ) {
            apply_extension(&mut path, candidate, false, k, node_coverage, window_coverage);
            extended = true;
        }

        if path.len() < nodes.len() {
            let visited: HashSet<u64> = path.iter().map(|h| h.id()).collect();
            let first = *path.front().unwrap();
            if let Some(candidate) = pick_extension(
                graph,
                first,
                true,
                &path,
                k,
                &node_set,
                &visited,
                node_coverage,
                window_coverage,
            ) {
                apply_extension(&mut path, candidate, true, k, node_coverage, window_coverage);
                extended = true;
            }
        }

        if !extended {
            break;
        }
    }

    path.into_iter().collect()
}

fn run_component<B: PathIndexBuilder>(
    graph: &impl HandleGraph,
    nodes: &[u64],
    n: usize,
    k: usize,
    component_index: usize,
    builder: &mut B,
) {
    let mut node_coverage = SimpleCoverage::new();
    let mut window_coverage = SimpleCoverage::new();

    for i in 0..n {
        let path = build_one_path(graph, nodes, k, &mut node_coverage, &mut window_coverage);
        let encoded: Vec<(u64, bool)> = path.iter().map(|h| (h.id(), h.is_reverse())).collect();
        builder.insert(&encoded, true);
        builder.add_path(i, component_index, 0, 0);
    }
}

/// Fallible entry point: builds `params.n` paths per weakly-connected
/// component of `graph` and populates `builder`. `progress`, if given, is
/// called once per finished component with `(done, total)`; returning
/// `false` stops construction after the current component.
pub fn try_generic_path_cover<G: HandleGraph, B: PathIndexBuilder>(
    graph: &G,
    params: PathCoverParams,
    builder: &mut B,
    mut progress: Option<&mut dyn FnMut(usize, usize) -> bool>,
) -> Result<()> {
    if params.k < PATH_COVER_MIN_K {
        log::error!(
            "invalid path-cover parameter: k={} (must be >= {PATH_COVER_MIN_K})",
            params.k
        );
        return Err(GraphIndexError::InvalidParameter(format!(
            "k must be >= {PATH_COVER_MIN_K}, got {}",
            params.k
        )));
    }
    if graph.min_node_id() < 1 {
        log::error!(
            "invalid path-cover parameter: min_node_id={} (must be >= 1)",
            graph.min_node_id()
        );
        return Err(GraphIndexError::InvalidParameter(
            "graph minimum node id must be >= 1".to_string(),
        ));
    }

    let components = weakly_connected_components(graph);
    let total = components.len();
    for (component_index, nodes) in components.iter().enumerate() {
        run_component(graph, nodes, params.n, params.k, component_index, builder);
        log::debug!(
            "path cover: component {}/{} done ({} nodes)",
            component_index + 1,
            total,
            nodes.len()
        );
        if let Some(cb) = progress.as_deref_mut() {
            if !cb(component_index + 1, total) {
                break;
            }
        }
    }

    builder.set_samples(params.n);
    builder.set_haplotypes(params.n);
    builder.set_contigs(total);
    builder.finish();
    Ok(())
}

/// Infallible convenience wrapper: on an invalid parameter, logs the error
/// and returns a finished, empty `builder` instead of propagating, matching
/// the source's "print to stderr, return empty" behavior (§7). Callers
/// that need the error value should use [`try_generic_path_cover`].
pub fn generic_path_cover<G: HandleGraph, B: PathIndexBuilder>(
    graph: &G,
    params: PathCoverParams,
    builder: &mut B,
    progress: Option<&mut dyn FnMut(usize, usize) -> bool>,
) {
    if let Err(e) = try_generic_path_cover(graph, params, builder, progress) {
        log::error!("generic_path_cover: {e}; returning an empty finished path index");
        builder.set_samples(0);
        builder.set_haplotypes(0);
        builder.set_contigs(0);
        builder.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hash_graph::HashGraph;

    fn linear_chain(n: u64) -> HashGraph {
        let mut g = HashGraph::new();
        for id in 1..=n {
            g.add_node(id);
        }
        for id in 1..n {
            g.add_edge(Handle::new(id, false), Handle::new(id + 1, false));
        }
        g
    }

    #[test]
    fn params_reject_short_k_and_zero_n() {
        assert!(matches!(
            PathCoverParams::new(2, 1),
            Err(GraphIndexError::InvalidParameter(_))
        ));
        assert!(matches!(
            PathCoverParams::new(0, 4),
            Err(GraphIndexError::InvalidParameter(_))
        ));
        assert!(PathCoverParams::new(2, 2).is_ok());
    }

    #[test]
    fn scenario_p1_linear_chain_paths_equal_node_sequence() {
        let g = linear_chain(5);
        let params = PathCoverParams::new(2, 2).unwrap();
        let mut builder = RecordingPathIndexBuilder::new();
        try_generic_path_cover(&g, params, &mut builder, None).unwrap();

        assert_eq!(builder.paths.len(), 2);
        let expected: Vec<(u64, bool)> = (1..=5).map(|id| (id, false)).collect();
        for path in &builder.paths {
            assert_eq!(path, &expected);
        }
        assert!(builder.finished);
        assert_eq!(builder.samples, 2);
        assert_eq!(builder.haplotypes, 2);
        assert_eq!(builder.contigs, 1);
    }

    #[test]
    fn generated_paths_are_valid_walks() {
        let mut g = HashGraph::new();
        for id in [1, 2, 3, 4] {
            g.add_node(id);
        }
        g.add_edge(Handle::new(1, false), Handle::new(2, false));
        g.add_edge(Handle::new(2, false), Handle::new(3, false));
        g.add_edge(Handle::new(2, false), Handle::new(4, false));

        let params = PathCoverParams::new(3, 2).unwrap();
        let mut builder = RecordingPathIndexBuilder::new();
        try_generic_path_cover(&g, params, &mut builder, None).unwrap();

        for path in &builder.paths {
            for pair in path.windows(2) {
                let (from_id, from_rev) = pair[0];
                let (to_id, to_rev) = pair[1];
                let from = Handle::new(from_id, from_rev);
                let to = Handle::new(to_id, to_rev);
                let mut ok = false;
                g.follow_edges(from, false, &mut |h| {
                    if h == to {
                        ok = true;
                    }
                    true
                });
                assert!(ok, "no edge {from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn progress_callback_runs_once_per_component_and_can_stop_early() {
        let mut g = HashGraph::new();
        for id in [1, 2, 10, 11, 20] {
            g.add_node(id);
        }
        g.add_edge(Handle::new(1, false), Handle::new(2, false));
        g.add_edge(Handle::new(10, false), Handle::new(11, false));

        let params = PathCoverParams::new(1, 2).unwrap();
        let mut builder = RecordingPathIndexBuilder::new();
        let mut calls = Vec::new();
        {
            let mut cb = |done: usize, total: usize| {
                calls.push((done, total));
                done < 2
            };
            try_generic_path_cover(&g, params, &mut builder, Some(&mut cb)).unwrap();
        }
        assert!(calls.len() <= 3);
        assert_eq!(calls.last().unwrap().1, 3);
    }

    #[test]
    fn try_variant_reports_invalid_min_node_id() {
        let g = HashGraph::new();
        let params = PathCoverParams::new(1, 2).unwrap();
        let mut builder = RecordingPathIndexBuilder::new();
        let err = try_generic_path_cover(&g, params, &mut builder, None).unwrap_err();
        assert!(matches!(err, GraphIndexError::InvalidParameter(_)));
    }

    #[test]
    fn infallible_variant_returns_empty_finished_builder_on_error() {
        let g = HashGraph::new();
        let params = PathCoverParams::new(1, 2).unwrap();
        let mut builder = RecordingPathIndexBuilder::new();
        generic_path_cover(&g, params, &mut builder, None);
        assert!(builder.finished);
        assert_eq!(builder.samples, 0);
        assert!(builder.paths.is_empty());
    }

    #[test]
    fn simple_coverage_counts_and_defaults() {
        let mut cov: SimpleCoverage<u64> = SimpleCoverage::new();
        assert_eq!(cov.get(&1), cov.no_coverage());
        cov.increase_coverage(&1);
        cov.increase_coverage(&1);
        assert_eq!(cov.get(&1), 2);
        assert_eq!(cov.get(&2), 0);
    }
}
