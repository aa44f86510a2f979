// src/filter/prune.rs

use log::{debug, info};

use super::components::connected_components;
use super::cost::ComponentCost;
use super::singleton::remove_singletons_to_fixed_point;
use super::table::RelationTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneSummary {
    pub singleton_rows: usize,
    pub heavier_rows: usize,
    pub rounds: usize,
}

/// Brings the excess down towards `keep` by breaking connected components.
///
/// One row per component is deleted; the rest of the component falls to the
/// next singleton removal. Only half of the distance to `keep` is covered per
/// call, leaving later calls free to pick better components once singleton
/// removal has reshaped the matrix. Returns the number of rows deleted.
pub fn delete_heavier_rows(table: &mut RelationTable, keep: usize, cost: &dyn ComponentCost) -> usize {
    let keep = keep as i64;
    if table.excess() <= keep {
        return 0;
    }

    let (components, matrix) = connected_components(table);
    debug!(
        "Matrix has {} rows and weight {}, {} components",
        matrix.rows,
        matrix.weight,
        components.len()
    );

    let mut scored: Vec<(f64, usize)> = components
        .iter()
        .map(|component| (cost.cost(component, &matrix), component.representative))
        .collect();
    // stable: equal costs keep row order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let target = (table.excess() + keep) / 2;
    let mut deleted = 0;
    for &(_, row) in &scored {
        if table.excess() <= target {
            break;
        }
        table.delete_relation(row);
        deleted += 1;
    }
    deleted
}

/// Alternates excess pruning (final pass only, where the excess is exact) and
/// singleton removal until a full round deletes nothing.
pub fn prune(
    table: &mut RelationTable,
    keep: usize,
    final_pass: bool,
    cost: &dyn ComponentCost,
) -> PruneSummary {
    let mut summary = PruneSummary::default();
    loop {
        let old = table.nrel;
        summary.rounds += 1;
        if final_pass {
            let heavier = delete_heavier_rows(table, keep, cost);
            if heavier > 0 {
                summary.heavier_rows += heavier;
                info!(
                    "deleted heavier relations: {} {}",
                    table.nrel, table.nprimes
                );
            }
        }
        summary.singleton_rows += remove_singletons_to_fixed_point(table);
        info!(
            "   new_nrows={} new_ncols={} ({})",
            table.nrel,
            table.nprimes,
            table.excess()
        );
        if table.nrel == old {
            return summary;
        }
    }
}
