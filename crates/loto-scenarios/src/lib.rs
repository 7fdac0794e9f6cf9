//! File I/O for the LOTO planning core: YAML/JSON loading of domain graphs,
//! rule packs and planner config, mirroring `gat_scenarios::spec`'s
//! extension-dispatched loading. This is the only crate in the workspace
//! that touches the filesystem (spec §5) — `loto-graph`/`loto-algo` are pure
//! computation over already-loaded values.

mod config_file;
mod fileio;
mod graph_file;
mod rule_pack_file;

pub use config_file::load_planner_config;
pub use fileio::parse_file;
pub use graph_file::load_domain_graphs;
pub use rule_pack_file::load_rule_pack;
