//! UI components.

pub mod linkage_graph;
