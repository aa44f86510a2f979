// src/filter/scan.rs

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::{FilterError, Result};
use crate::relation::{RelationParser, RelationSource};

use super::table::RelationTable;

/// Rows between two progress messages.
pub const PROGRESS_INTERVAL: usize = 100_000;

/// Only ideals whose prime is at or above these bounds are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_rational: u64,
    pub min_algebraic: u64,
}

impl Thresholds {
    pub fn new(min_rational: u64, min_algebraic: u64) -> Self {
        Thresholds { min_rational, min_algebraic }
    }

    pub fn none() -> Self {
        Thresholds::new(0, 0)
    }

    /// With no bound every ideal is loaded, which is what makes a pass final.
    pub fn is_final(&self) -> bool {
        self.min_rational == 0 && self.min_algebraic == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub rows_scanned: usize,
    pub rows_registered: usize,
    pub free_relations: usize,
}

/// Reads the whole stream and builds the compact list of every used row.
///
/// Rows not marked used are skipped without parsing. The registry must be
/// empty, since counts are rebuilt from scratch; `nprimes` is recomputed.
pub fn scan_relations(
    table: &mut RelationTable,
    source: &dyn RelationSource,
    parser: &dyn RelationParser,
    thresholds: Thresholds,
) -> Result<ScanSummary> {
    debug_assert!(table.registry.is_empty());
    table.nprimes = 0;

    let nrelmax = table.nrelmax();
    let mut summary = ScanSummary {
        rows_scanned: 0,
        rows_registered: 0,
        free_relations: 0,
    };

    for (row, line) in source.lines()?.enumerate() {
        let line = line?;
        if row >= nrelmax {
            return Err(FilterError::RowCountMismatch {
                expected: nrelmax,
                scanned: row + 1,
            });
        }
        summary.rows_scanned = row + 1;
        if row % PROGRESS_INTERVAL == 0 && row > 0 {
            debug!(
                "   nrel = {} (memory {}Mb)",
                row,
                table.allocator.allocated_bytes() >> 20
            );
        }
        if !table.is_used(row) {
            continue;
        }

        let mut relation = parser.parse(&line).map_err(|reason| FilterError::MalformedRelation {
            row,
            line: line.clone(),
            reason,
        })?;
        if relation.is_free() {
            summary.free_relations += 1;
        } else {
            relation.reduce_exponents_mod2();
        }
        let ideals = relation.ideals_above(thresholds.min_rational, thresholds.min_algebraic);
        table.register_row(row, &ideals)?;
        summary.rows_registered += 1;
    }

    debug!("   Scanned {} relations", summary.rows_scanned);
    if summary.rows_scanned != nrelmax {
        return Err(FilterError::RowCountMismatch {
            expected: nrelmax,
            scanned: summary.rows_scanned,
        });
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ideal::IdealKey;
    use crate::relation::{CadoRelationParser, MemoryRelationSource};

    fn source() -> MemoryRelationSource {
        MemoryRelationSource::new([
            "1,1:2,2,65:7", // 2^2 cancels
            "2,1:65:7",
            "3,1:3:",
            "5,0::1,2",
        ])
    }

    #[test]
    fn test_scan_registers_odd_ideals() {
        let mut table = RelationTable::new(4, 16, 64);
        let summary =
            scan_relations(&mut table, &source(), &CadoRelationParser, Thresholds::none()).unwrap();
        assert_eq!(summary.rows_scanned, 4);
        assert_eq!(summary.rows_registered, 4);
        assert_eq!(summary.free_relations, 1);
        assert!(table.counts_consistent());
        assert_eq!(table.registry.lookup(&IdealKey::rational(2)), None);

        let slot = table.registry.lookup(&IdealKey::rational(0x65)).unwrap();
        assert_eq!(table.registry.read(slot), 2);
        assert_eq!(table.list(3).len(), 3);
        // (0x65) (7,1/1) (7,2/1) (3) (5) (5,1) (5,2)
        assert_eq!(table.nprimes, 7);
    }

    #[test]
    fn test_thresholds_restrict_registration() {
        let mut table = RelationTable::new(4, 16, 64);
        scan_relations(&mut table, &source(), &CadoRelationParser, Thresholds::new(100, 100)).unwrap();
        assert_eq!(table.nprimes, 1);
        assert!(table.list(2).is_empty());
        assert!(table.counts_consistent());
    }

    #[test]
    fn test_unused_rows_are_not_parsed() {
        let src = MemoryRelationSource::new(["1,1:3:", "garbage", "2,1:3:"]);
        let mut table = RelationTable::new(3, 16, 64);
        table.register_row(1, &[]).unwrap();
        table.delete_relation(1);
        table.release_lists();
        table.registry.reset_all();
        scan_relations(&mut table, &src, &CadoRelationParser, Thresholds::none()).unwrap();
        assert_eq!(table.nprimes, 1);
        assert_eq!(table.nrel, 2);
    }

    #[test]
    fn test_malformed_line_aborts() {
        let src = MemoryRelationSource::new(["1,1:3:", "garbage"]);
        let mut table = RelationTable::new(2, 16, 64);
        match scan_relations(&mut table, &src, &CadoRelationParser, Thresholds::none()) {
            Err(FilterError::MalformedRelation { row, .. }) => assert_eq!(row, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_zero_prime_is_malformed() {
        let src = MemoryRelationSource::new(["1,1:3:", "2,1:3:", "1,1::0"]);
        let mut table = RelationTable::new(3, 16, 64);
        match scan_relations(&mut table, &src, &CadoRelationParser, Thresholds::none()) {
            Err(FilterError::MalformedRelation { row, line, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(line, "1,1::0");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_row_count_must_match() {
        let mut short = RelationTable::new(5, 16, 64);
        assert!(matches!(
            scan_relations(&mut short, &source(), &CadoRelationParser, Thresholds::none()),
            Err(FilterError::RowCountMismatch { expected: 5, scanned: 4 })
        ));

        let mut long = RelationTable::new(3, 16, 64);
        assert!(matches!(
            scan_relations(&mut long, &source(), &CadoRelationParser, Thresholds::none()),
            Err(FilterError::RowCountMismatch { expected: 3, scanned: 4 })
        ));
    }
}
