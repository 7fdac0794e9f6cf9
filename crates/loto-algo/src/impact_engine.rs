//! Impact Engine (C8): translates post-isolation asset unavailability into
//! MW derates for production units and their areas (spec §4.7).

use loto_graph::impact::{ImpactResult, RedundancyScheme, UnitData};
use loto_graph::units::Megawatts;
use loto_graph::{DomainGraph, DomainGraphs};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

pub fn evaluate(
    graphs: &DomainGraphs,
    asset_units: &HashMap<String, String>,
    unit_data: &HashMap<String, UnitData>,
    unit_areas: &HashMap<String, String>,
    penalties: Option<&HashMap<String, f64>>,
    asset_areas: Option<&HashMap<String, String>>,
) -> ImpactResult {
    let no_penalties = HashMap::new();
    let no_asset_areas = HashMap::new();
    let penalties = penalties.unwrap_or(&no_penalties);
    let asset_areas = asset_areas.unwrap_or(&no_asset_areas);

    let unavailable = unavailable_assets(graphs);

    let mut unit_unavail: HashMap<String, HashSet<String>> = HashMap::new();
    for asset in &unavailable {
        if let Some(unit) = asset_units.get(asset) {
            unit_unavail.entry(unit.clone()).or_default().insert(asset.clone());
        }
    }

    let mut unit_delta: HashMap<String, f64> = HashMap::new();
    for (unit, info) in unit_data {
        let offline = unit_unavail.get(unit).map(HashSet::len).unwrap_or(0);
        let mut delta = match info.scheme {
            RedundancyScheme::Spof => {
                if offline > 0 {
                    info.rated_mw
                } else {
                    0.0
                }
            }
            RedundancyScheme::NPlus1 => {
                let nplus = (info.nplus.max(1)) as f64;
                (offline as f64 * info.rated_mw / nplus).min(info.rated_mw)
            }
        };
        if let Some(assets) = unit_unavail.get(unit) {
            for asset in assets {
                delta += penalties.get(asset).copied().unwrap_or(0.0);
            }
        }
        if delta > 0.0 {
            unit_delta.insert(unit.clone(), delta);
        }
    }

    let mut area_delta: HashMap<String, f64> = HashMap::new();
    for (unit, delta) in &unit_delta {
        if let Some(area) = unit_areas.get(unit) {
            *area_delta.entry(area.clone()).or_insert(0.0) += delta;
        }
    }
    for asset in &unavailable {
        if !asset_units.contains_key(asset) {
            if let Some(area) = asset_areas.get(asset) {
                *area_delta.entry(area.clone()).or_insert(0.0) +=
                    penalties.get(asset).copied().unwrap_or(0.0);
            }
        }
    }

    let mut result = ImpactResult::new(unavailable);
    result.unit_mw_delta = unit_delta
        .into_iter()
        .map(|(k, v)| (k, Megawatts::new(v)))
        .collect();
    result.area_mw_delta = area_delta
        .into_iter()
        .map(|(k, v)| (k, Megawatts::new(v)))
        .collect();
    result
}

/// Assets unreachable from every source in their own domain's open
/// subgraph, unioned across domains.
fn unavailable_assets(graphs: &DomainGraphs) -> HashSet<String> {
    let mut unavailable = HashSet::new();
    for (_, g) in graphs.iter() {
        let reachable = open_reachable_from_sources(g);
        for idx in g.graph.node_indices() {
            let n = &g.graph[idx];
            if n.is_asset() && !reachable.contains(&n.id) {
                unavailable.insert(n.id.clone());
            }
        }
    }
    unavailable
}

fn open_reachable_from_sources(graph: &DomainGraph) -> HashSet<String> {
    let adj = open_adjacency(graph);
    let mut reachable = HashSet::new();
    for idx in graph.graph.node_indices() {
        let n = &graph.graph[idx];
        if n.is_source {
            reachable.insert(n.id.clone());
            let mut queue = VecDeque::new();
            queue.push_back(n.id.clone());
            while let Some(u) = queue.pop_front() {
                if let Some(neighbors) = adj.get(&u) {
                    for v in neighbors {
                        if reachable.insert(v.clone()) {
                            queue.push_back(v.clone());
                        }
                    }
                }
            }
        }
    }
    reachable
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
