//! Cut Weighter (C4): assigns per-edge min-cut capacity from op-cost, risk,
//! travel, elevation, outage, reset and call-back-time (spec §4.2).

use loto_graph::plan::PlannerConfig;
use loto_graph::{DomainGraph, Edge, Node};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Capacity-weighted view of a (split) domain graph: a collapsed capacity
/// per node pair (hardest constraint wins across parallel edges) plus the
/// set of node pairs that carry at least one cuttable parallel edge.
pub struct WeightedEdges {
    pub capacities: HashMap<(String, String), f64>,
    pub cuttable: HashSet<(String, String)>,
}

/// Effectively-infinite capacity for non-cuttable edges. A large finite
/// sentinel rather than `f64::INFINITY` so residual-capacity arithmetic in
/// the min-cut solver never produces `INFINITY - INFINITY = NaN`.
pub const INFINITE_CAPACITY: f64 = 1e15;

pub fn weight_edges(graph: &DomainGraph, config: &PlannerConfig) -> WeightedEdges {
    let mut capacities: HashMap<(String, String), f64> = HashMap::new();
    let mut cuttable: HashSet<(String, String)> = HashSet::new();

    for e in graph.graph.edge_references() {
        let u = &graph.graph[e.source()];
        let v = &graph.graph[e.target()];
        let key = (u.id.clone(), v.id.clone());
        let edge = e.weight();

        let cap = if edge.is_isolation_point {
            cuttable.insert(key.clone());
            capacity_for(u, v, edge, config.cbt, config)
        } else {
            INFINITE_CAPACITY
        };

        capacities
            .entry(key)
            .and_modify(|c| *c = c.min(cap))
            .or_insert(cap);
    }

    WeightedEdges {
        capacities,
        cuttable,
    }
}

fn capacity_for(u: &Node, v: &Node, edge: &Edge, cbt: f64, c: &PlannerConfig) -> f64 {
    let op_cost = first_nonzero(&[edge.op_cost_min, u.op_cost_min, v.op_cost_min]);
    let reset = first_nonzero(&[edge.reset_time_min, u.reset_time_min, v.reset_time_min]);

    let mut base = c.alpha * op_cost
        + c.beta * edge.risk_weight
        + c.gamma * edge.travel_time_min
        + c.delta * edge.elevation_penalty
        + c.epsilon * edge.outage_penalty;
    if base == 0.0 {
        base = 1.0;
    }
    let mult = 1.0 + cbt.min(c.cb_max) / c.cb_scale;
    base * mult + c.zeta * reset * (1.0 + cbt / c.rst_scale)
}

/// Mirrors the reference planner's `a or b or c or 0` fallback chain, where
/// Python's `or` treats `0.0` as falsy too — not just a missing value.
fn first_nonzero(vals: &[Option<f64>]) -> f64 {
    vals.iter()
        .flatten()
        .copied()
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}
