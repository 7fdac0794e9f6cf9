//! Core graph model for the LOTO planning engine: multi-domain, directed,
//! multi-edge graphs over plant piping/energy topology, plus the value types
//! (`RulePack`, `IsolationPlan`, `SimReport`, `ImpactResult`) that cross the
//! boundary between the planner, simulator and impact engine.
//!
//! This crate owns no I/O and performs no parsing of external files; that is
//! `loto-scenarios`'s job. It exposes the typed data model, diagnostics
//! collection, and the unified [`error::LotoError`].

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod impact;
pub mod plan;
pub mod rule_pack;
pub mod sim;
pub mod units;

pub use diagnostics::Diagnostics;
pub use error::{LotoError, LotoResult};

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NodeIndex = petgraph::graph::NodeIndex;
pub type EdgeIndex = petgraph::graph::EdgeIndex;

/// An energy carrier: `steam`, `water`, `process`, `electrical`,
/// `instrument_air`, `condensate`, ... One graph exists per domain.
pub type EnergyDomain = String;

/// Default medium whitelist (spec §3). Rule packs may supply their own.
pub const DEFAULT_MEDIUM_WHITELIST: &[&str] = &[
    "steam", "water", "air", "oil", "nitrogen", "gas", "electric", "hydraulic",
];

/// Fail-mode of a device absent explicit state: fail-open or fail-closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailState {
    #[serde(rename = "FO")]
    FailOpen,
    #[serde(rename = "FC")]
    FailClosed,
}

/// How a device is actuated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Remote,
    Local,
}

/// Edge state, set during apply/stimuli. Absent means "not yet decided".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeState {
    Open,
    Closed,
}

/// Node state. Nodes additionally support `on` (PUMP_START), unlike edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Open,
    Closed,
    On,
}

/// A vertex in a domain graph: a device, asset, source, or junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub is_source: bool,
    #[serde(default)]
    pub is_isolation_point: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub fail_state: Option<FailState>,
    #[serde(default)]
    pub control: Option<Control>,
    #[serde(default)]
    pub safe_sink: bool,
    #[serde(default)]
    pub op_cost_min: Option<f64>,
    #[serde(default)]
    pub reset_time_min: Option<f64>,
    #[serde(default)]
    pub state: Option<NodeState>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: None,
            is_source: false,
            is_isolation_point: false,
            kind: None,
            fail_state: None,
            control: None,
            safe_sink: false,
            op_cost_min: None,
            reset_time_min: None,
            state: None,
        }
    }

    pub fn is_asset(&self) -> bool {
        self.tag.as_deref() == Some("asset")
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }

    pub fn is_drain_or_vent(&self) -> bool {
        matches!(self.kind.as_deref(), Some("drain") | Some("vent"))
    }
}

/// A directed arc between two nodes: a pipe, wire, or device edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub is_isolation_point: bool,
    #[serde(default)]
    pub is_bleed: bool,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub state: Option<EdgeState>,
    /// `drain`/`vent` edges always open on apply, same as such nodes (spec
    /// §4.5). Not listed in the distilled edge schema but required by the
    /// apply algorithm, which applies the drain/vent/fail-state rules
    /// uniformly to edges and nodes.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub fail_state: Option<FailState>,
    #[serde(default)]
    pub op_cost_min: Option<f64>,
    #[serde(default)]
    pub reset_time_min: Option<f64>,
    #[serde(default)]
    pub risk_weight: f64,
    #[serde(default)]
    pub travel_time_min: f64,
    #[serde(default)]
    pub elevation_penalty: f64,
    #[serde(default)]
    pub outage_penalty: f64,
}

impl Default for Edge {
    fn default() -> Self {
        Self {
            is_isolation_point: false,
            is_bleed: false,
            medium: None,
            state: None,
            kind: None,
            fail_state: None,
            op_cost_min: None,
            reset_time_min: None,
            risk_weight: 0.0,
            travel_time_min: 0.0,
            elevation_penalty: 0.0,
            outage_penalty: 0.0,
        }
    }
}

impl Edge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open subgraph membership: an edge is open when its state is anything
    /// but explicitly closed (spec §4.6, §4.7 "edges whose state != closed").
    pub fn is_open(&self) -> bool {
        self.state != Some(EdgeState::Closed)
    }

    pub fn is_drain_or_vent(&self) -> bool {
        matches!(self.kind.as_deref(), Some("drain") | Some("vent"))
    }
}

/// A single energy domain's topology: a directed multigraph indexed by node id.
#[derive(Debug, Clone)]
pub struct DomainGraph {
    pub graph: DiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
}

impl Default for DomainGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> LotoResult<NodeIndex> {
        if self.index.contains_key(&node.id) {
            return Err(LotoError::Graph(format!("duplicate node id '{}'", node.id)));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(idx)
    }

    pub fn add_edge(&mut self, u: &str, v: &str, edge: Edge) -> LotoResult<EdgeIndex> {
        let ui = self
            .node_index(u)
            .ok_or_else(|| LotoError::Graph(format!("edge references unknown node '{u}'")))?;
        let vi = self
            .node_index(v)
            .ok_or_else(|| LotoError::Graph(format!("edge references unknown node '{v}'")))?;
        Ok(self.graph.add_edge(ui, vi, edge))
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|i| &self.graph[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = self.node_index(id)?;
        Some(&mut self.graph[idx])
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|s| s.as_str())
    }

    pub fn sources(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&i| self.graph[i].is_source)
    }

    pub fn assets(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&i| self.graph[i].is_asset())
    }

    /// Remove every parallel edge between `u` and `v`. A no-op if none exist
    /// (spec §4.5: "if an edge does not exist, skip silently").
    pub fn remove_edges_between(&mut self, u: &str, v: &str) {
        let (Some(ui), Some(vi)) = (self.node_index(u), self.node_index(v)) else {
            return;
        };
        loop {
            let next = self.graph.edges_connecting(ui, vi).next().map(|e| e.id());
            match next {
                Some(eid) => {
                    self.graph.remove_edge(eid);
                }
                None => break,
            }
        }
    }

    /// Non-fatal structural validation: unknown mediums, a node that is both
    /// a source and an isolation point, an asset node also marked a source.
    pub fn validate(&self, medium_whitelist: &[&str]) -> Diagnostics {
        let mut diag = Diagnostics::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if node.is_source && node.is_asset() {
                diag.add_error_with_entity(
                    "reference",
                    "node is both a source and an asset",
                    &node.id,
                );
            }
            if node.is_source && node.is_isolation_point {
                diag.add_error_with_entity(
                    "reference",
                    "node is both a source and an isolation point",
                    &node.id,
                );
            }
        }
        for e in self.graph.edge_references() {
            if let Some(medium) = &e.weight().medium {
                if !medium_whitelist.contains(&medium.as_str()) {
                    let u = &self.graph[e.source()].id;
                    let v = &self.graph[e.target()].id;
                    diag.add_warning_with_entity(
                        "medium",
                        &format!("unknown medium '{medium}'"),
                        &format!("{u}->{v}"),
                    );
                }
            }
        }
        diag
    }

    /// Order-independent structural equality: same node ids with equal
    /// attributes, same multiset of edges keyed by (source id, target id).
    /// Used to test apply's purity/idempotence without depending on internal
    /// adjacency-vector layout.
    pub fn structurally_eq(&self, other: &DomainGraph) -> bool {
        if self.graph.node_count() != other.graph.node_count()
            || self.graph.edge_count() != other.graph.edge_count()
        {
            return false;
        }
        let a_nodes: HashMap<&str, &Node> = self
            .graph
            .node_indices()
            .map(|i| (self.graph[i].id.as_str(), &self.graph[i]))
            .collect();
        let b_nodes: HashMap<&str, &Node> = other
            .graph
            .node_indices()
            .map(|i| (other.graph[i].id.as_str(), &other.graph[i]))
            .collect();
        if a_nodes != b_nodes {
            return false;
        }
        edge_multiset(self) == edge_multiset(other)
    }
}

fn edge_multiset(g: &DomainGraph) -> HashMap<(String, String), Vec<String>> {
    let mut out: HashMap<(String, String), Vec<String>> = HashMap::new();
    for e in g.graph.edge_references() {
        let key = (
            g.graph[e.source()].id.clone(),
            g.graph[e.target()].id.clone(),
        );
        out.entry(key).or_default().push(format!("{:?}", e.weight()));
    }
    for v in out.values_mut() {
        v.sort();
    }
    out
}

/// All domain graphs for a plant, keyed by [`EnergyDomain`].
#[derive(Debug, Clone, Default)]
pub struct DomainGraphs(pub HashMap<EnergyDomain, DomainGraph>);

impl DomainGraphs {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, domain: impl Into<String>, graph: DomainGraph) {
        self.0.insert(domain.into(), graph);
    }

    pub fn get(&self, domain: &str) -> Option<&DomainGraph> {
        self.0.get(domain)
    }

    pub fn get_mut(&mut self, domain: &str) -> Option<&mut DomainGraph> {
        self.0.get_mut(domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainGraph)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn structurally_eq(&self, other: &DomainGraphs) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0.iter().all(|(domain, g)| {
            other
                .0
                .get(domain)
                .map(|og| g.structurally_eq(og))
                .unwrap_or(false)
        })
    }
}

/// Builds a `"{domain}:{u}->{v}"` component-id (spec §6 grammar).
pub fn component_id(domain: &str, u: &str, v: &str) -> String {
    format!("{domain}:{u}->{v}")
}

/// Parses a `"{domain}:{u}->{v}"` component-id back into its parts.
pub fn parse_component_id(id: &str) -> Option<(String, String, String)> {
    let (domain, rest) = id.split_once(':')?;
    let (u, v) = rest.split_once("->")?;
    Some((domain.to_string(), u.to_string(), v.to_string()))
}
