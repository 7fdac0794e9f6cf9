use crate::cli::Commands;
use anyhow::{Context, Result};
use loto_algo::{ApprovalGate, GateState};
use loto_graph::impact::UnitData;
use loto_graph::plan::PlannerConfig;
use loto_graph::sim::StimulusName;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Side-car file for `evaluate`: unit ratings, area rollups and penalties
/// that have no home in the graph model itself (spec §4.7).
#[derive(Debug, Deserialize, Default)]
struct UnitsFile {
    #[serde(default)]
    asset_units: HashMap<String, String>,
    #[serde(default)]
    unit_data: HashMap<String, UnitData>,
    #[serde(default)]
    unit_areas: HashMap<String, String>,
    #[serde(default)]
    penalties: Option<HashMap<String, f64>>,
    #[serde(default)]
    asset_areas: Option<HashMap<String, String>>,
}

pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Plan {
            graphs,
            asset,
            rules,
            config,
            out,
        } => plan(&graphs, &asset, &rules, config.as_deref(), &out),
        Commands::Apply { plan, graphs, out } => apply(&plan, &graphs, &out),
        Commands::Simulate {
            graphs,
            stimuli,
            seed,
            out,
        } => simulate(&graphs, &stimuli, seed, &out),
        Commands::Evaluate { graphs, units, out } => evaluate(&graphs, &units, &out),
        Commands::Approve { gate, user } => approve(&gate, &user),
    }
}

fn plan(graphs_path: &Path, asset: &str, rules_path: &Path, config_path: Option<&Path>, out: &Path) -> Result<()> {
    let graphs = loto_scenarios::load_domain_graphs(graphs_path)
        .with_context(|| format!("loading graphs from {}", graphs_path.display()))?;
    let rule_pack = loto_scenarios::load_rule_pack(rules_path)
        .with_context(|| format!("loading rule pack from {}", rules_path.display()))?;
    let config = match config_path {
        Some(p) => loto_scenarios::load_planner_config(p)
            .with_context(|| format!("loading planner config from {}", p.display()))?,
        None => PlannerConfig::default(),
    };

    let result = loto_algo::plan(&graphs, asset, &rule_pack, &config);
    info!(asset, actions = result.actions.len(), "plan computed");
    write_json(out, &result)
}

fn apply(plan_path: &Path, graphs_path: &Path, out: &Path) -> Result<()> {
    let plan: loto_graph::plan::IsolationPlan = loto_scenarios::parse_file(plan_path)
        .with_context(|| format!("loading plan from {}", plan_path.display()))?;
    let graphs = loto_scenarios::load_domain_graphs(graphs_path)
        .with_context(|| format!("loading graphs from {}", graphs_path.display()))?;

    let applied = loto_algo::apply(&plan, &graphs);
    info!(plan_id = %plan.plan_id, "plan applied");
    write_json(out, &AppliedGraphsView::from(&applied))
}

fn simulate(graphs_path: &Path, stimuli: &[String], seed: Option<u64>, out: &Path) -> Result<()> {
    let graphs = loto_scenarios::load_domain_graphs(graphs_path)
        .with_context(|| format!("loading graphs from {}", graphs_path.display()))?;

    let parsed: Vec<StimulusName> = stimuli
        .iter()
        .filter_map(|s| {
            let parsed = StimulusName::parse(s);
            if parsed.is_none() {
                tracing::warn!(stimulus = %s, "unknown stimulus name, skipping");
            }
            parsed
        })
        .collect();

    let report = loto_algo::run_stimuli(&graphs, &parsed, None, seed);
    info!(count = report.results.len(), seed = ?seed, "stimuli run");
    write_json(out, &report)
}

fn evaluate(graphs_path: &Path, units_path: &Path, out: &Path) -> Result<()> {
    let graphs = loto_scenarios::load_domain_graphs(graphs_path)
        .with_context(|| format!("loading graphs from {}", graphs_path.display()))?;
    let units: UnitsFile = loto_scenarios::parse_file(units_path)
        .with_context(|| format!("loading units file from {}", units_path.display()))?;

    let result = loto_algo::evaluate(
        &graphs,
        &units.asset_units,
        &units.unit_data,
        &units.unit_areas,
        units.penalties.as_ref(),
        units.asset_areas.as_ref(),
    );
    info!(
        unavailable = result.unavailable_assets.len(),
        "impact evaluated"
    );
    write_json(out, &result)
}

fn approve(gate_path: &Path, user: &str) -> Result<()> {
    let mut gate: ApprovalGate = if gate_path.exists() {
        loto_scenarios::parse_file(gate_path).with_context(|| format!("loading gate from {}", gate_path.display()))?
    } else {
        ApprovalGate::new()
    };
    gate.approve(user);
    write_json(gate_path, &gate)?;
    match gate.state() {
        GateState::Ready => println!("gate ready: {} approver(s)", gate.approver_count()),
        GateState::Pending => println!("gate pending: {} approver(s)", gate.approver_count()),
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Serializable view of `DomainGraphs` for `apply`'s output (the in-memory
/// type is backed by `petgraph` and isn't `Serialize` itself).
#[derive(Debug, serde::Serialize)]
struct AppliedGraphsView(HashMap<String, AppliedDomainView>);

#[derive(Debug, serde::Serialize)]
struct AppliedDomainView {
    nodes: Vec<loto_graph::Node>,
    edges: Vec<AppliedEdgeView>,
}

#[derive(Debug, serde::Serialize)]
struct AppliedEdgeView {
    from: String,
    to: String,
    #[serde(flatten)]
    edge: loto_graph::Edge,
}

impl From<&loto_graph::DomainGraphs> for AppliedGraphsView {
    fn from(graphs: &loto_graph::DomainGraphs) -> Self {
        use petgraph::visit::EdgeRef;
        let mut out = HashMap::new();
        for (domain, g) in graphs.iter() {
            let nodes = g.graph.node_indices().map(|i| g.graph[i].clone()).collect();
            let edges = g
                .graph
                .edge_references()
                .map(|e| AppliedEdgeView {
                    from: g.graph[e.source()].id.clone(),
                    to: g.graph[e.target()].id.clone(),
                    edge: e.weight().clone(),
                })
                .collect();
            out.insert(domain.to_string(), AppliedDomainView { nodes, edges });
        }
        Self(out)
    }
}
