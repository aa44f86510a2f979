// src/filter/components.rs

use bitvec::prelude::*;

use crate::registry::SlotId;

use super::cost::{ComponentStats, MatrixStats};
use super::table::RelationTable;

/// For each slot referenced by exactly two live rows, the sum of their row
/// ids. Knowing one of the rows gives the other as `sum - row`, which spares
/// building an adjacency list.
pub struct WeightTwoPartners {
    sums: Vec<u64>,
}

impl WeightTwoPartners {
    /// Builds the sums and measures the active matrix on the same sweep.
    pub fn build(table: &RelationTable) -> (Self, MatrixStats) {
        let mut sums = vec![0u64; table.registry.len()];
        let mut rows = 0usize;
        let mut weight = 0usize;
        for row in table.used_rows() {
            let list = table.list(row);
            for &slot in list {
                if table.registry.read(SlotId(slot)) == 2 {
                    sums[slot as usize] += row as u64;
                }
            }
            rows += 1;
            weight += list.len();
        }
        debug_assert_eq!(rows, table.nrel);
        (
            WeightTwoPartners { sums },
            MatrixStats {
                rows: rows as f64,
                weight: weight as f64,
            },
        )
    }

    pub fn partner(&self, slot: u32, row: usize) -> usize {
        (self.sums[slot as usize] - row as u64) as usize
    }
}

/// Splits the used rows into connected components, two rows being linked
/// when they share a weight-2 ideal. Components come out ordered by their
/// smallest row id.
///
/// The walk keeps an explicit stack, so one huge component cannot overflow
/// the call stack.
pub fn connected_components(table: &RelationTable) -> (Vec<ComponentStats>, MatrixStats) {
    let (partners, matrix) = WeightTwoPartners::build(table);
    let mut visited = bitvec![0; table.nrelmax()];
    let mut stack: Vec<usize> = Vec::new();
    let mut components = Vec::new();

    for start in table.used_rows() {
        if visited[start] {
            continue;
        }
        visited.set(start, true);
        stack.push(start);
        let mut rows = 0usize;
        let mut weight = 0u64;

        while let Some(row) = stack.pop() {
            rows += 1;
            let list = table.list(row);
            weight += list.len() as u64;
            for &slot in list {
                if table.registry.read(SlotId(slot)) != 2 {
                    continue;
                }
                let other = partners.partner(slot, row);
                if other < visited.len() && !visited[other] && table.is_used(other) {
                    visited.set(other, true);
                    stack.push(other);
                }
            }
        }

        components.push(ComponentStats {
            representative: start,
            rows,
            weight,
        });
    }

    (components, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ideal::IdealKey;

    fn r(p: u64) -> IdealKey {
        IdealKey::rational(p)
    }

    #[test]
    fn test_partner_recovery() {
        let mut table = RelationTable::new(6, 16, 64);
        table.register_row(2, &[r(3)]).unwrap();
        table.register_row(5, &[r(3), r(7)]).unwrap();
        for row in [0, 1, 3, 4] {
            table.register_row(row, &[r(7)]).unwrap();
        }
        let (partners, matrix) = WeightTwoPartners::build(&table);
        let slot = table.registry.lookup(&r(3)).unwrap().0;
        assert_eq!(partners.partner(slot, 2), 5);
        assert_eq!(partners.partner(slot, 5), 2);
        assert_eq!(matrix.rows, 6.0);
        assert_eq!(matrix.weight, 7.0);
    }

    #[test]
    fn test_components_follow_weight_two_links_only() {
        // 0-1-2 chained through weight-2 ideals, 3 and 4 share an ideal of
        // weight 3 with row 2 (not a link), 5 alone.
        let mut table = RelationTable::new(6, 16, 64);
        table.register_row(0, &[r(2)]).unwrap();
        table.register_row(1, &[r(2), r(3)]).unwrap();
        table.register_row(2, &[r(3), r(5)]).unwrap();
        table.register_row(3, &[r(5)]).unwrap();
        table.register_row(4, &[r(5), r(11)]).unwrap();
        table.register_row(5, &[r(13)]).unwrap();

        let (components, _) = connected_components(&table);
        let summary: Vec<(usize, usize, u64)> = components
            .iter()
            .map(|c| (c.representative, c.rows, c.weight))
            .collect();
        assert_eq!(summary, vec![(0, 3, 5), (3, 1, 1), (4, 1, 2), (5, 1, 1)]);
    }

    #[test]
    fn test_long_cycle_does_not_recurse() {
        let n = 200_000;
        let mut table = RelationTable::new(n, n, 1 << 16);
        for row in 0..n {
            let next = (row + 1) % n;
            table
                .register_row(row, &[r(row as u64 + 2), r(next as u64 + 2)])
                .unwrap();
        }
        let (components, matrix) = connected_components(&table);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].rows, n);
        assert_eq!(matrix.weight, (2 * n) as f64);
    }
}
