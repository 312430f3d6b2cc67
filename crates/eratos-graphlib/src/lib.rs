#![forbid(unsafe_code)]

//! Graph container APIs used by `eratos-layered` and the eratos region layout.
//!
//! Nodes and edges are stored in insertion order so that every traversal exposed here is
//! deterministic. Node ids are plain strings (SDF `@id` values).

mod edge_key;
mod graph;
mod options;

pub mod alg;

pub use edge_key::EdgeKey;
pub use graph::Graph;
pub use options::GraphOptions;
