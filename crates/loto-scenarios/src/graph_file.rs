//! Domain graph file loading: YAML/JSON on disk, deserialized into the
//! flat node/edge record shape a file format needs and converted into the
//! `petgraph`-backed `DomainGraph` the core crates operate on.

use crate::fileio::parse_file;
use anyhow::{Context, Result};
use loto_graph::{DomainGraph, DomainGraphs, Edge, Node};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One edge as it appears on disk: endpoints plus the flattened `Edge` body.
#[derive(Debug, Deserialize)]
struct EdgeRecord {
    from: String,
    to: String,
    #[serde(flatten)]
    edge: Edge,
}

/// A single domain's graph as it appears on disk.
#[derive(Debug, Deserialize)]
struct DomainGraphFile {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

impl DomainGraphFile {
    fn into_domain_graph(self) -> Result<DomainGraph> {
        let mut graph = DomainGraph::new();
        for node in self.nodes {
            let id = node.id.clone();
            graph
                .add_node(node)
                .with_context(|| format!("adding node '{id}'"))?;
        }
        for rec in self.edges {
            graph
                .add_edge(&rec.from, &rec.to, rec.edge)
                .with_context(|| format!("adding edge '{}'->'{}'", rec.from, rec.to))?;
        }
        Ok(graph)
    }
}

/// Loads every domain's graph from `path`.
///
/// `path` may be a single YAML/JSON file whose top level maps domain name to
/// a `{nodes, edges}` body, or a directory containing one such file per
/// domain (the file stem becomes the domain name) — matching the CLI's
/// `--graphs <dir-or-file>` surface.
pub fn load_domain_graphs(path: &Path) -> Result<DomainGraphs> {
    if path.is_dir() {
        load_domain_graphs_from_dir(path)
    } else {
        load_domain_graphs_from_file(path)
    }
}

fn load_domain_graphs_from_file(path: &Path) -> Result<DomainGraphs> {
    let file: HashMap<String, DomainGraphFile> = parse_file(path)
        .with_context(|| format!("loading domain graphs from {}", path.display()))?;
    let mut graphs = DomainGraphs::new();
    for (domain, body) in file {
        graphs.insert(domain, body.into_domain_graph()?);
    }
    Ok(graphs)
}

fn load_domain_graphs_from_dir(dir: &Path) -> Result<DomainGraphs> {
    let mut graphs = DomainGraphs::new();
    let entries = fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_supported_extension(&path) {
            continue;
        }
        let domain = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("cannot derive domain name from {}", path.display()))?
            .to_string();
        let body: DomainGraphFile = parse_file(&path)
            .with_context(|| format!("loading domain graph from {}", path.display()))?;
        graphs.insert(domain, body.into_domain_graph()?);
    }
    Ok(graphs)
}

fn is_supported_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}
