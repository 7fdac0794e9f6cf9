//! Planning, simulation and impact algorithms for the LOTO core.
//!
//! This crate is pure computation over the [`loto_graph`] data model: no
//! I/O, no global state, fully reentrant (spec §5). Each top-level
//! operation — [`plan`], [`apply`], [`run_stimuli`], [`evaluate`] — is a
//! free function taking its inputs explicitly, matching the scenario
//! harness's call style.

pub mod cut_weighter;
pub mod ddbb;
pub mod gate;
pub mod impact_engine;
pub mod min_cut;
pub mod node_splitter;
pub mod planner;
pub mod sim_engine;

pub use gate::{ApprovalGate, GateState};
pub use planner::plan;
pub use sim_engine::{apply, run_stimuli};

pub use impact_engine::evaluate;
