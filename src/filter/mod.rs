// src/filter/mod.rs
//
// Row filtering: registration of the active rows, singleton removal to a
// fixed point, and excess pruning through weight-2 connected components.

pub mod table;
pub mod scan;
pub mod singleton;
pub mod cost;
pub mod components;
pub mod prune;

pub use cost::{ComponentCost, ComponentStats, CostPolicy, MatrixStats};
pub use prune::{delete_heavier_rows, prune, PruneSummary};
pub use scan::{scan_relations, ScanSummary, Thresholds};
pub use components::connected_components;
pub use singleton::{onepass_singleton_removal, remove_singletons_to_fixed_point};
pub use table::RelationTable;
