//! Simulation Engine: `apply` (C7a) and `run_stimuli` (C7b) — spec §4.5, §4.6.

use loto_graph::rule_pack::RulePack;
use loto_graph::sim::{SimReport, SimResultItem, StimulusName};
use loto_graph::{parse_component_id, DomainGraph, DomainGraphs, EdgeState, FailState, IsolationPlan, NodeState};
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Pure transform: removes every cut edge named by `plan`, then seeds
/// edge/node state from drain/vent `kind` and fail-state defaults. Never
/// mutates `graphs`; idempotent when applied to its own output (spec §4.5).
pub fn apply(plan: &IsolationPlan, graphs: &DomainGraphs) -> DomainGraphs {
    let mut result = graphs.clone();

    for action in &plan.actions {
        let Some((domain, u, v)) = parse_component_id(&action.component_id) else {
            continue;
        };
        if let Some(g) = result.get_mut(&domain) {
            g.remove_edges_between(&u, &v);
        }
    }

    for (_, g) in result.0.iter_mut() {
        seed_states(g);
    }

    result
}

fn seed_states(g: &mut DomainGraph) {
    for idx in g.graph.node_indices().collect::<Vec<_>>() {
        let n = &mut g.graph[idx];
        if n.is_drain_or_vent() {
            n.state = Some(NodeState::Open);
        } else if n.state.is_none() {
            n.state = match n.fail_state {
                Some(FailState::FailOpen) => Some(NodeState::Open),
                Some(FailState::FailClosed) => Some(NodeState::Closed),
                None => None,
            };
        }
    }
    for idx in g.graph.edge_indices().collect::<Vec<_>>() {
        let e = &mut g.graph[idx];
        if e.is_drain_or_vent() {
            e.state = Some(EdgeState::Open);
        } else if e.state.is_none() {
            e.state = match e.fail_state {
                Some(FailState::FailOpen) => Some(EdgeState::Open),
                Some(FailState::FailClosed) => Some(EdgeState::Closed),
                None => None,
            };
        }
    }
}

const K_PATHS: usize = 5;
const PER_PAIR_PATH_CAP: usize = 20;

/// Runs the fixed stimulus vocabulary sequentially against a working copy of
/// `graphs`; each stimulus observes the mutations of the ones before it
/// within this call. `rule_pack` is accepted for forward compatibility with
/// domain-specific stimulus behaviour but unused by the fixed handlers.
pub fn run_stimuli(
    graphs: &DomainGraphs,
    stimuli: &[StimulusName],
    _rule_pack: Option<&RulePack>,
    seed: Option<u64>,
) -> SimReport {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    debug!(seed = ?seed, "run_stimuli_seed");

    let mut working = graphs.clone();
    let mut report = SimReport::new(seed);

    for stim in stimuli {
        apply_stimulus(&mut working, *stim);

        let mut domains: Vec<&str> = working.domains().collect();
        domains.sort_unstable();

        let mut offending: Option<(String, Vec<Vec<String>>)> = None;
        for domain in domains {
            let g = working.get(domain).expect("domain listed by domains()");
            let paths = k_shortest_open_paths(g, K_PATHS, &mut rng);
            if !paths.is_empty() {
                offending = Some((domain.to_string(), paths));
                break;
            }
        }

        let item = match offending {
            Some((domain, paths)) => SimResultItem::bypass(*stim, domain, paths),
            None => SimResultItem::success(*stim),
        };
        report.results.push(item);
    }

    report
}

fn apply_stimulus(graphs: &mut DomainGraphs, stimulus: StimulusName) {
    match stimulus {
        StimulusName::RemoteOpen => open_by_control(graphs, "remote"),
        StimulusName::LocalOpen => open_by_control(graphs, "local"),
        StimulusName::AirReturn => open_by_kind(graphs, "air_return", EdgeState::Open, NodeState::Open),
        StimulusName::EsdReset => open_by_kind(graphs, "esd", EdgeState::Open, NodeState::Open),
        StimulusName::PumpStart => turn_pumps_on(graphs),
    }
}

/// `control` lives only on `Node` in the data model (spec §3); edges carry
/// no such field, so only nodes can match REMOTE_OPEN/LOCAL_OPEN.
fn open_by_control(graphs: &mut DomainGraphs, control: &str) {
    for (_, g) in graphs.0.iter_mut() {
        for idx in g.graph.node_indices().collect::<Vec<_>>() {
            let n = &mut g.graph[idx];
            let matches = match n.control {
                Some(loto_graph::Control::Remote) => control == "remote",
                Some(loto_graph::Control::Local) => control == "local",
                None => false,
            };
            if matches {
                n.state = Some(NodeState::Open);
            }
        }
    }
}

fn open_by_kind(graphs: &mut DomainGraphs, kind: &str, edge_state: EdgeState, node_state: NodeState) {
    for (_, g) in graphs.0.iter_mut() {
        for idx in g.graph.edge_indices().collect::<Vec<_>>() {
            let e = &mut g.graph[idx];
            if e.kind.as_deref() == Some(kind) {
                e.state = Some(edge_state);
            }
        }
        for idx in g.graph.node_indices().collect::<Vec<_>>() {
            let n = &mut g.graph[idx];
            if n.kind.as_deref() == Some(kind) {
                n.state = Some(node_state);
            }
        }
    }
}

fn turn_pumps_on(graphs: &mut DomainGraphs) {
    for (_, g) in graphs.0.iter_mut() {
        for idx in g.graph.node_indices().collect::<Vec<_>>() {
            let n = &mut g.graph[idx];
            if n.is_kind("pump") {
                n.state = Some(NodeState::On);
            }
        }
    }
}

fn open_adjacency(graph: &DomainGraph) -> HashMap<String, Vec<String>> {
    let mut adj: HashMap<String, Vec<String>> = HashMap::new();
    for e in graph.graph.edge_references() {
        if e.weight().is_open() {
            let u = graph.graph[e.source()].id.clone();
            let v = graph.graph[e.target()].id.clone();
            adj.entry(u).or_default().push(v);
        }
    }
    adj
}

/// Enumerates up to `k` shortest open simple paths from any source to any
/// asset-tagged node (hard-coded `tag == "asset"`, matching the reference
/// simulator — distinct from the planner's caller-supplied `asset_tag`).
/// Candidates are capped per (source, target) pair to keep enumeration
/// polynomial on dense graphs (spec §5 resource model); ties are broken by
/// a draw from the seeded RNG, same as the reference implementation's
/// `rng.random()` sort key.
fn k_shortest_open_paths(graph: &DomainGraph, k: usize, rng: &mut StdRng) -> Vec<Vec<String>> {
    let adj = open_adjacency(graph);
    let sources: Vec<String> = graph
        .graph
        .node_indices()
        .filter(|&i| graph.graph[i].is_source)
        .map(|i| graph.graph[i].id.clone())
        .collect();
    let targets: Vec<String> = graph
        .graph
        .node_indices()
        .filter(|&i| graph.graph[i].is_asset())
        .map(|i| graph.graph[i].id.clone())
        .collect();

    let mut candidates: Vec<Vec<String>> = Vec::new();
    for s in &sources {
        for t in &targets {
            if s == t {
                continue;
            }
            candidates.extend(enumerate_simple_paths(&adj, s, t, PER_PAIR_PATH_CAP));
        }
    }

    let mut keyed: Vec<(usize, f64, Vec<String>)> = candidates
        .into_iter()
        .map(|p| (p.len(), rng.gen::<f64>(), p))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.partial_cmp(&b.1).unwrap()));
    keyed.into_iter().take(k).map(|(_, _, p)| p).collect()
}

fn enumerate_simple_paths(
    adj: &HashMap<String, Vec<String>>,
    start: &str,
    goal: &str,
    cap: usize,
) -> Vec<Vec<String>> {
    let mut results = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut path = vec![start.to_string()];
    visited.insert(start.to_string());
    dfs_paths(adj, start, goal, &mut visited, &mut path, &mut results, cap);
    results
}

fn dfs_paths(
    adj: &HashMap<String, Vec<String>>,
    current: &str,
    goal: &str,
    visited: &mut HashSet<String>,
    path: &mut Vec<String>,
    results: &mut Vec<Vec<String>>,
    cap: usize,
) {
    if results.len() >= cap {
        return;
    }
    if current == goal {
        results.push(path.clone());
        return;
    }
    let Some(neighbors) = adj.get(current) else {
        return;
    };
    let mut sorted = neighbors.clone();
    sorted.sort_unstable();
    for n in sorted {
        if results.len() >= cap {
            break;
        }
        if visited.insert(n.clone()) {
            path.push(n.clone());
            dfs_paths(adj, &n, goal, visited, path, results, cap);
            path.pop();
            visited.remove(&n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loto_graph::{DomainGraphs, Edge, IsolationAction, Node};

    fn plant() -> DomainGraphs {
        let mut g = DomainGraph::new();
        let mut s = Node::new("S");
        s.is_source = true;
        let mut t = Node::new("T");
        t.tag = Some("asset".into());
        let mut drain = Node::new("DRN");
        drain.kind = Some("drain".into());
        g.add_node(s).unwrap();
        g.add_node(Node::new("V")).unwrap();
        g.add_node(t).unwrap();
        g.add_node(drain).unwrap();
        g.add_edge("S", "V", Edge::new()).unwrap();
        g.add_edge("V", "T", Edge::new()).unwrap();
        let mut e = Edge::new();
        e.kind = Some("drain".into());
        g.add_edge("V", "DRN", e).unwrap();
        let mut graphs = DomainGraphs::new();
        graphs.insert("steam", g);
        graphs
    }

    #[test]
    fn test_apply_removes_cut_edge() {
        let graphs = plant();
        let mut plan = IsolationPlan::empty("T");
        plan.actions.push(IsolationAction::lock("steam:S->V"));
        let applied = apply(&plan, &graphs);
        let g = applied.get("steam").unwrap();
        assert!(g
            .graph
            .edges_connecting(g.node_index("S").unwrap(), g.node_index("V").unwrap())
            .next()
            .is_none());
    }

    #[test]
    fn test_apply_does_not_mutate_original() {
        let graphs = plant();
        let mut plan = IsolationPlan::empty("T");
        plan.actions.push(IsolationAction::lock("steam:S->V"));
        apply(&plan, &graphs);
        let original = graphs.get("steam").unwrap();
        assert!(original
            .graph
            .edges_connecting(
                original.node_index("S").unwrap(),
                original.node_index("V").unwrap()
            )
            .next()
            .is_some());
    }

    #[test]
    fn test_apply_opens_drain_edges_and_nodes() {
        let graphs = plant();
        let plan = IsolationPlan::empty("T");
        let applied = apply(&plan, &graphs);
        let g = applied.get("steam").unwrap();
        assert_eq!(g.node("DRN").unwrap().state, Some(NodeState::Open));
        let e = g
            .graph
            .edges_connecting(g.node_index("V").unwrap(), g.node_index("DRN").unwrap())
            .next()
            .unwrap();
        assert_eq!(e.weight().state, Some(EdgeState::Open));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let graphs = plant();
        let mut plan = IsolationPlan::empty("T");
        plan.actions.push(IsolationAction::lock("steam:S->V"));
        let once = apply(&plan, &graphs);
        let twice = apply(&plan, &once);
        assert!(once.structurally_eq(&twice));
    }

    #[test]
    fn test_run_stimuli_no_bypass_when_fully_isolated() {
        let mut graphs = plant();
        let mut plan = IsolationPlan::empty("T");
        plan.actions.push(IsolationAction::lock("steam:S->V"));
        let applied = apply(&plan, &graphs);
        graphs = applied;
        let report = run_stimuli(&graphs, &[StimulusName::RemoteOpen], None, Some(42));
        assert!(report.results[0].success);
        assert_eq!(report.seed, Some(42));
    }

    #[test]
    fn test_run_stimuli_detects_bypass_path() {
        let graphs = plant();
        let plan = IsolationPlan::empty("T");
        let applied = apply(&plan, &graphs);
        let report = run_stimuli(&applied, &[StimulusName::RemoteOpen], None, Some(7));
        assert!(!report.results[0].success);
        assert_eq!(report.results[0].domain.as_deref(), Some("steam"));
        assert!(!report.results[0].paths.is_empty());
    }
}
