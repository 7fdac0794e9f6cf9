//! Node Splitter (C3): converts isolatable device nodes into `_in`/`_out`
//! pairs joined by a single capacity edge, reducing a node min-cut problem to
//! an edge min-cut problem (spec §4.1).

use loto_graph::{DomainGraph, Edge, LotoResult, Node};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Splits every `is_isolation_point` node in `graph` into a `{id}_in` /
/// `{id}_out` pair. Non-isolation nodes are copied verbatim. All edges
/// originally incident to a split node are re-wired (inbound edges land on
/// `_in`, outbound edges originate at `_out`) and have `is_isolation_point`
/// forced to `false` — the cuttable representative is the in→out edge alone.
pub fn split_nodes(graph: &DomainGraph) -> LotoResult<DomainGraph> {
    let mut split = DomainGraph::new();

    for idx in graph.graph.node_indices() {
        let node = &graph.graph[idx];
        if node.is_isolation_point {
            let in_id = format!("{}_in", node.id);
            let out_id = format!("{}_out", node.id);

            let mut n_in = node.clone();
            n_in.id = in_id.clone();
            let mut n_out = node.clone();
            n_out.id = out_id.clone();
            split.add_node(n_in)?;
            split.add_node(n_out)?;

            let mut cap_edge = cut_attrs(graph, idx).unwrap_or_default();
            cap_edge.is_isolation_point = true;
            split.add_edge(&in_id, &out_id, cap_edge)?;
        } else {
            split.add_node(node.clone())?;
        }
    }

    for e in graph.graph.edge_references() {
        let u = &graph.graph[e.source()];
        let v = &graph.graph[e.target()];
        let new_u = rewired_id(u, Direction::Outgoing);
        let new_v = rewired_id(v, Direction::Incoming);
        let mut data = e.weight().clone();
        data.is_isolation_point = false;
        split.add_edge(&new_u, &new_v, data)?;
    }

    Ok(split)
}

fn rewired_id(node: &Node, direction: Direction) -> String {
    if !node.is_isolation_point {
        return node.id.clone();
    }
    match direction {
        Direction::Outgoing => format!("{}_out", node.id),
        Direction::Incoming => format!("{}_in", node.id),
    }
}

/// The device's cut attributes: the first incoming `is_isolation_point` edge,
/// falling back to the first outgoing one (spec §4.1, matching the reference
/// planner's node-splitting pass).
fn cut_attrs(graph: &DomainGraph, idx: petgraph::graph::NodeIndex) -> Option<Edge> {
    graph
        .graph
        .edges_directed(idx, Direction::Incoming)
        .find(|e| e.weight().is_isolation_point)
        .or_else(|| {
            graph
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .find(|e| e.weight().is_isolation_point)
        })
        .map(|e| e.weight().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loto_graph::DEFAULT_MEDIUM_WHITELIST;

    fn graph_with_valve() -> DomainGraph {
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
        e1.risk_weight = 3.0;
        g.add_edge("S", "V", e1).unwrap();
        g.add_edge("V", "T", Edge::new()).unwrap();
        g
    }

    #[test]
    fn test_split_produces_in_out_pair() {
        let g = graph_with_valve();
        let split = split_nodes(&g).unwrap();
        assert!(split.node("V_in").is_some());
        assert!(split.node("V_out").is_some());
        assert!(split.node("V").is_none());
    }

    #[test]
    fn test_split_capacity_edge_carries_device_attrs() {
        let g = graph_with_valve();
        let split = split_nodes(&g).unwrap();
        let idx_in = split.node_index("V_in").unwrap();
        let idx_out = split.node_index("V_out").unwrap();
        let edge = split
            .graph
            .edges_connecting(idx_in, idx_out)
            .next()
            .unwrap();
        assert!(edge.weight().is_isolation_point);
        assert_eq!(edge.weight().risk_weight, 3.0);
    }

    #[test]
    fn test_rewired_edges_are_not_individually_cuttable() {
        let g = graph_with_valve();
        let split = split_nodes(&g).unwrap();
        for e in split.graph.edge_references() {
            let u = &split.graph[e.source()];
            let v = &split.graph[e.target()];
            if u.id != "V_in" || v.id != "V_out" {
                assert!(!e.weight().is_isolation_point);
            }
        }
    }

    #[test]
    fn test_non_isolation_node_copied_verbatim() {
        let g = graph_with_valve();
        let split = split_nodes(&g).unwrap();
        assert!(split.node("S").unwrap().is_source);
        assert!(split.node("T").unwrap().is_asset());
        let diag = split.validate(DEFAULT_MEDIUM_WHITELIST);
        assert!(!diag.has_errors());
    }
}
