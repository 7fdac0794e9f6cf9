//! Min-Cut Solver (C5): a hand-rolled Edmonds-Karp max-flow over a super-source
//! / super-sink capacity network, extracting the reachable / non-reachable
//! node partition from the final residual graph (spec §4.3).
//!
//! `petgraph` 0.6 (the version this workspace is pinned to) does not ship
//! `petgraph::algo::maximum_flow`, so this is grounded directly in the
//! reachable/non-reachable partition technique petgraph's own (newer)
//! `min_st_cut` uses: BFS the residual graph from the source, anything it
//! reaches is `R`, everything else is `R̄`.

use crate::cut_weighter::WeightedEdges;
use std::collections::{HashMap, HashSet, VecDeque};

pub const SUPER_SOURCE: &str = "__super_source__";
pub const SUPER_SINK: &str = "__super_sink__";

pub struct MinCutResult {
    pub reachable: HashSet<String>,
    pub non_reachable: HashSet<String>,
    pub max_flow: f64,
}

impl MinCutResult {
    /// Whether the super-source and super-sink ended up separated at all.
    /// An unseparated cut (sink still reachable) means no finite set of
    /// cuttable edges isolates every source from every asset.
    pub fn is_feasible(&self) -> bool {
        !self.reachable.contains(SUPER_SINK)
    }
}

struct FlowNetwork {
    index: HashMap<String, usize>,
    names: Vec<String>,
    adj: Vec<Vec<usize>>,
    edge_to: Vec<usize>,
    edge_cap: Vec<f64>,
}

impl FlowNetwork {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            names: Vec::new(),
            adj: Vec::new(),
            edge_to: Vec::new(),
            edge_cap: Vec::new(),
        }
    }

    fn node(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.to_string());
        self.adj.push(Vec::new());
        self.index.insert(name.to_string(), i);
        i
    }

    /// Adds a directed edge with residual bookkeeping. Edges are always
    /// pushed in forward/backward pairs starting at index 0, so `eid ^ 1`
    /// is the paired reverse edge.
    fn add_edge(&mut self, u: usize, v: usize, cap: f64) {
        let fwd = self.edge_to.len();
        self.edge_to.push(v);
        self.edge_cap.push(cap);
        self.adj[u].push(fwd);

        let bwd = self.edge_to.len();
        self.edge_to.push(u);
        self.edge_cap.push(0.0);
        self.adj[v].push(bwd);
    }

    fn bfs_augmenting_path(&self, s: usize, t: usize) -> Option<(f64, Vec<usize>)> {
        let mut parent_edge: Vec<Option<usize>> = vec![None; self.names.len()];
        let mut visited = vec![false; self.names.len()];
        visited[s] = true;
        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(u) = queue.pop_front() {
            if u == t {
                break;
            }
            for &eid in &self.adj[u] {
                let v = self.edge_to[eid];
                if !visited[v] && self.edge_cap[eid] > 1e-9 {
                    visited[v] = true;
                    parent_edge[v] = Some(eid);
                    queue.push_back(v);
                }
            }
        }

        if !visited[t] {
            return None;
        }

        let mut path = Vec::new();
        let mut bottleneck = f64::INFINITY;
        let mut v = t;
        while v != s {
            let eid = parent_edge[v].expect("reachable node has a parent edge");
            bottleneck = bottleneck.min(self.edge_cap[eid]);
            path.push(eid);
            v = self.edge_to[eid ^ 1];
        }
        path.reverse();
        Some((bottleneck, path))
    }

    fn residual_reachable_from(&self, s: usize) -> HashSet<usize> {
        let mut visited = HashSet::new();
        visited.insert(s);
        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(u) = queue.pop_front() {
            for &eid in &self.adj[u] {
                let v = self.edge_to[eid];
                if self.edge_cap[eid] > 1e-9 && visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
        visited
    }
}

/// Computes the global min s-t cut separating `sources` from `sinks` over
/// the weighted capacity graph. Every node named by an edge endpoint in
/// `weighted`, plus `sources`/`sinks` themselves, participates even if it
/// has no cuttable edge touching it.
pub fn min_cut(weighted: &WeightedEdges, sources: &[String], sinks: &[String]) -> MinCutResult {
    let mut net = FlowNetwork::new();
    let s = net.node(SUPER_SOURCE);
    let t = net.node(SUPER_SINK);

    for (u, v) in weighted.capacities.keys() {
        net.node(u);
        net.node(v);
    }
    for source in sources {
        let i = net.node(source);
        net.add_edge(s, i, crate::cut_weighter::INFINITE_CAPACITY);
    }
    for sink in sinks {
        let i = net.node(sink);
        net.add_edge(i, t, crate::cut_weighter::INFINITE_CAPACITY);
    }
    for ((u, v), cap) in &weighted.capacities {
        let ui = net.node(u);
        let vi = net.node(v);
        net.add_edge(ui, vi, *cap);
    }

    let mut max_flow = 0.0;
    while let Some((bottleneck, path)) = net.bfs_augmenting_path(s, t) {
        for eid in &path {
            net.edge_cap[*eid] -= bottleneck;
            net.edge_cap[*eid ^ 1] += bottleneck;
        }
        max_flow += bottleneck;
    }

    let reachable_idx = net.residual_reachable_from(s);
    let reachable: HashSet<String> = reachable_idx.iter().map(|&i| net.names[i].clone()).collect();
    let non_reachable: HashSet<String> = net
        .names
        .iter()
        .enumerate()
        .filter(|(i, _)| !reachable_idx.contains(i))
        .map(|(_, name)| name.clone())
        .collect();

    MinCutResult {
        reachable,
        non_reachable,
        max_flow,
    }
}

/// Extracts the cut edges: directed `(u, v)` pairs crossing from `R` to
/// `R̄` whose underlying multigraph carried at least one `is_isolation_point`
/// parallel edge (spec §4.3).
pub fn cut_edges(weighted: &WeightedEdges, result: &MinCutResult) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = weighted
        .cuttable
        .iter()
        .filter(|(u, v)| result.reachable.contains(u) && result.non_reachable.contains(v))
        .cloned()
        .collect();
    edges.sort();
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn weighted_from(pairs: &[(&str, &str, f64, bool)]) -> WeightedEdges {
        let mut capacities = Map::new();
        let mut cuttable = HashSet::new();
        for (u, v, cap, is_cuttable) in pairs {
            capacities.insert((u.to_string(), v.to_string()), *cap);
            if *is_cuttable {
                cuttable.insert((u.to_string(), v.to_string()));
            }
        }
        WeightedEdges {
            capacities,
            cuttable,
        }
    }

    #[test]
    fn test_single_cuttable_edge_separates_source_from_sink() {
        let w = weighted_from(&[("S", "V", 10.0, true), ("V", "T", 1e15, false)]);
        let result = min_cut(&w, &["S".to_string()], &["T".to_string()]);
        assert!(result.is_feasible());
        assert!(result.reachable.contains("S"));
        assert!(result.reachable.contains("V"));
        assert!(result.non_reachable.contains("T"));
        let edges = cut_edges(&w, &result);
        assert_eq!(edges, vec![("S".to_string(), "V".to_string())]);
    }

    #[test]
    fn test_picks_cheaper_of_two_parallel_paths() {
        let w = weighted_from(&[
            ("S", "T", 100.0, true),
            ("S", "X", 1.0, true),
            ("X", "T", 1e15, false),
        ]);
        let result = min_cut(&w, &["S".to_string()], &["T".to_string()]);
        let edges = cut_edges(&w, &result);
        assert_eq!(edges, vec![("S".to_string(), "X".to_string())]);
        assert!((result.max_flow - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_cuttable_path_is_infeasible() {
        let w = weighted_from(&[("S", "T", 1e15, false)]);
        let result = min_cut(&w, &["S".to_string()], &["T".to_string()]);
        assert!(!result.is_feasible());
        assert!(cut_edges(&w, &result).is_empty());
    }

    #[test]
    fn test_multiple_sources_and_sinks_share_one_global_cut() {
        let w = weighted_from(&[
            ("S1", "V", 5.0, true),
            ("S2", "V", 5.0, true),
            ("V", "T1", 1e15, false),
            ("V", "T2", 1e15, false),
        ]);
        let result = min_cut(
            &w,
            &["S1".to_string(), "S2".to_string()],
            &["T1".to_string(), "T2".to_string()],
        );
        let mut edges = cut_edges(&w, &result);
        edges.sort();
        assert_eq!(
            edges,
            vec![
                ("S1".to_string(), "V".to_string()),
                ("S2".to_string(), "V".to_string())
            ]
        );
    }
}
