// src/filter/singleton.rs

use log::debug;

use super::table::RelationTable;

/// One sweep over the used rows, deleting each row that holds an ideal
/// referenced by no other live row. Returns the number of rows deleted.
pub fn onepass_singleton_removal(table: &mut RelationTable) -> usize {
    let mut deleted = 0;
    for row in 0..table.nrelmax() {
        if table.is_used(row) && table.has_singleton(row) {
            table.delete_relation(row);
            deleted += 1;
        }
    }
    deleted
}

/// Sweeps until a sweep deletes nothing; a deletion can turn ideals of other
/// rows into singletons, so one sweep is not enough.
pub fn remove_singletons_to_fixed_point(table: &mut RelationTable) -> usize {
    let mut total = 0;
    loop {
        let deleted = onepass_singleton_removal(table);
        if deleted == 0 {
            return total;
        }
        total += deleted;
        debug!(
            "   singleton sweep: -{} rows, new_nrows={} new_ncols={} ({})",
            deleted,
            table.nrel,
            table.nprimes,
            table.excess()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ideal::IdealKey;

    fn r(p: u64) -> IdealKey {
        IdealKey::rational(p)
    }

    #[test]
    fn test_chain_needs_several_sweeps() {
        // chain 4-0-1-2-3 whose only singleton sits on row 3; a forward sweep
        // peels one row at a time from the back.
        let mut table = RelationTable::new(5, 16, 64);
        table.register_row(0, &[r(2), r(3)]).unwrap();
        table.register_row(1, &[r(3), r(5)]).unwrap();
        table.register_row(2, &[r(5), r(7)]).unwrap();
        table.register_row(3, &[r(7), r(11)]).unwrap();
        table.register_row(4, &[r(2)]).unwrap();
        assert_eq!(onepass_singleton_removal(&mut table), 1);
        assert!(!table.is_used(3));
        assert!(table.counts_consistent());

        let removed = remove_singletons_to_fixed_point(&mut table);
        assert_eq!(removed, 4);
        assert_eq!(table.nrel, 0);
        assert_eq!(table.nprimes, 0);
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let mut table = RelationTable::new(5, 16, 64);
        for row in 0..3 {
            table.register_row(row, &[r(101)]).unwrap();
        }
        table.register_row(3, &[r(101), r(103)]).unwrap();
        table.register_row(4, &[r(107)]).unwrap();

        assert_eq!(remove_singletons_to_fixed_point(&mut table), 2);
        assert_eq!(onepass_singleton_removal(&mut table), 0);
        assert_eq!(table.used_rows().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(table.counts_consistent());
    }

    #[test]
    fn test_empty_rows_survive_singleton_removal() {
        let mut table = RelationTable::new(1, 4, 8);
        table.register_row(0, &[]).unwrap();
        assert_eq!(remove_singletons_to_fixed_point(&mut table), 0);
        assert!(table.is_used(0));
    }
}
