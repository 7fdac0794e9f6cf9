//! Top-level planner orchestration: wires the node splitter, cut weighter,
//! min-cut solver and verification generator into the single `plan()`
//! entry point (spec §4, §6).

use crate::cut_weighter::weight_edges;
use crate::ddbb::branch_verifications;
use crate::min_cut::{cut_edges, min_cut};
use crate::node_splitter::split_nodes;
use loto_graph::plan::{IsolationAction, IsolationPlan, PlannerConfig};
use loto_graph::rule_pack::RulePack;
use loto_graph::{component_id, DomainGraphs};
use tracing::{debug, warn};

/// Computes a minimal cut-set isolation plan isolating every source from
/// every node tagged `asset_tag`, across all domains. Unknown asset tags and
/// min-cut infeasibility both yield an empty plan for the affected domain
/// rather than an error (spec §4.9).
pub fn plan(
    graphs: &DomainGraphs,
    asset_tag: &str,
    rule_pack: &RulePack,
    config: &PlannerConfig,
) -> IsolationPlan {
    if let Ok(hash) = rule_pack.content_hash() {
        debug!(rule_pack_hash = %hash, asset_tag, "planning");
    }

    let mut result = IsolationPlan::empty(asset_tag);

    let mut domains: Vec<&str> = graphs.domains().collect();
    domains.sort_unstable();

    for domain in domains {
        let base_graph = graphs.get(domain).expect("domain listed by domains()");
        let work_graph = if config.node_split {
            match split_nodes(base_graph) {
                Ok(g) => g,
                Err(e) => {
                    warn!(domain, error = %e, "node splitting failed, skipping domain");
                    continue;
                }
            }
        } else {
            base_graph.clone()
        };

        let sources: Vec<String> = work_graph
            .graph
            .node_indices()
            .filter(|&i| work_graph.graph[i].is_source)
            .map(|i| work_graph.graph[i].id.clone())
            .collect();
        let targets: Vec<String> = work_graph
            .graph
            .node_indices()
            .filter(|&i| work_graph.graph[i].tag.as_deref() == Some(asset_tag))
            .map(|i| work_graph.graph[i].id.clone())
            .collect();

        if sources.is_empty() || targets.is_empty() {
            continue;
        }

        let weighted = weight_edges(&work_graph, config);
        let cut = min_cut(&weighted, &sources, &targets);
        if !cut.is_feasible() {
            warn!(domain, "min-cut infeasible: no finite cut separates sources from assets");
            continue;
        }

        let edges = cut_edges(&weighted, &cut);
        for (u, v) in &edges {
            let mut action = IsolationAction::lock(component_id(domain, u, v));
            action.duration_s = Some(0.0);
            result.actions.push(action);
        }

        result
            .verifications
            .extend(branch_verifications(domain, &work_graph, asset_tag, &edges));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use loto_graph::{DomainGraph, Edge, Node};

    fn empty_rule_pack() -> RulePack {
        RulePack {
            metadata: Default::default(),
            policy: Default::default(),
            governance: Default::default(),
            datasets: Default::default(),
            domain_rules: vec![],
            verification_rules: vec![],
            risk_policies: None,
        }
    }

    fn simple_plant() -> DomainGraphs {
        let mut g = DomainGraph::new();
        let mut s = Node::new("S");
        s.is_source = true;
        let mut v = Node::new("V");
        v.is_isolation_point = true;
        let mut t = Node::new("T");
        t.tag = Some("asset".into());
        g.add_node(s).unwrap();
        g.add_node(v).unwrap();
        g.add_node(t).unwrap();
        let mut e1 = Edge::new();
        e1.is_isolation_point = true;
        g.add_edge("S", "V", e1).unwrap();
        g.add_edge("V", "T", Edge::new()).unwrap();
        let mut graphs = DomainGraphs::new();
        graphs.insert("steam", g);
        graphs
    }

    #[test]
    fn test_plan_isolates_single_valve() {
        let graphs = simple_plant();
        let plan = plan(&graphs, "asset", &empty_rule_pack(), &PlannerConfig::default());
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].component_id, "steam:V_in->V_out");
        assert_eq!(plan.actions[0].duration_s, Some(0.0));
    }

    #[test]
    fn test_plan_emits_mandatory_verifications() {
        let graphs = simple_plant();
        let plan = plan(&graphs, "asset", &empty_rule_pack(), &PlannerConfig::default());
        assert!(plan.verifications.iter().any(|v| v.ends_with("PT=0")));
        assert!(plan.verifications.iter().any(|v| v.ends_with("no-movement")));
    }

    #[test]
    fn test_unknown_asset_tag_yields_empty_plan() {
        let graphs = simple_plant();
        let plan = plan(&graphs, "no-such-tag", &empty_rule_pack(), &PlannerConfig::default());
        assert!(plan.is_empty());
        assert!(plan.verifications.is_empty());
    }

    #[test]
    fn test_disabling_node_split_cuts_the_device_edge_directly() {
        let graphs = simple_plant();
        let mut config = PlannerConfig::default();
        config.node_split = false;
        let plan = plan(&graphs, "asset", &empty_rule_pack(), &config);
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].component_id, "steam:S->V");
    }
}
