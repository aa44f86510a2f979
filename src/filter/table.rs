// src/filter/table.rs

use bitvec::prelude::*;

use crate::core::error::Result;
use crate::core::ideal::IdealKey;
use crate::memory::{CompactAllocator, ListRef};
use crate::registry::{IdealRegistry, SlotId};

/// Everything the filter mutates: liveness of each row, the compact list of
/// registry slots of each live row, and the registry itself.
///
/// `nrel` and `nprimes` are kept in step with `used` and the registry counts
/// so the excess is always available without a scan.
#[derive(Debug)]
pub struct RelationTable {
    used: BitVec,
    compact: Vec<Option<ListRef>>,
    pub allocator: CompactAllocator,
    pub registry: IdealRegistry,
    /// Rows still marked used.
    pub nrel: usize,
    /// Slots with a count of at least one.
    pub nprimes: usize,
}

impl RelationTable {
    pub fn new(nrelmax: usize, registry_capacity: usize, block_capacity: usize) -> Self {
        RelationTable {
            used: bitvec![1; nrelmax],
            compact: vec![None; nrelmax],
            allocator: CompactAllocator::new(block_capacity),
            registry: IdealRegistry::with_capacity(registry_capacity),
            nrel: nrelmax,
            nprimes: 0,
        }
    }

    /// Number of rows the input is declared to hold.
    pub fn nrelmax(&self) -> usize {
        self.used.len()
    }

    pub fn is_used(&self, row: usize) -> bool {
        self.used[row]
    }

    pub fn used_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.used.iter_ones()
    }

    pub fn excess(&self) -> i64 {
        self.nrel as i64 - self.nprimes as i64
    }

    /// Slot ids of a row's compact list; empty for rows without one.
    pub fn list(&self, row: usize) -> &[u32] {
        match self.compact[row] {
            Some(handle) => self.allocator.list(handle),
            None => &[],
        }
    }

    /// Registers `ideals` for `row`: each slot gains one reference and the row
    /// gets a fresh compact list.
    ///
    /// Counts only change once the list is stored, so a failed allocation
    /// leaves them matching the stored lists.
    pub fn register_row(&mut self, row: usize, ideals: &[IdealKey]) -> Result<()> {
        let slots: Vec<u32> = ideals
            .iter()
            .map(|&key| self.registry.lookup_or_insert(key).0)
            .collect();
        self.compact[row] = Some(self.allocator.store_list(&slots)?);
        for &slot in &slots {
            if self.registry.increment(SlotId(slot)) == 1 {
                self.nprimes += 1;
            }
        }
        Ok(())
    }

    pub fn has_singleton(&self, row: usize) -> bool {
        self.list(row)
            .iter()
            .any(|&slot| self.registry.read(SlotId(slot)) == 1)
    }

    /// Kills a used row: every slot it references loses one reference.
    pub fn delete_relation(&mut self, row: usize) {
        debug_assert!(self.used[row], "row {} deleted twice", row);
        if let Some(handle) = self.compact[row].take() {
            for &slot in self.allocator.list(handle) {
                if self.registry.decrement(SlotId(slot)) == 0 {
                    self.nprimes -= 1;
                }
            }
        }
        self.used.set(row, false);
        self.nrel -= 1;
    }

    /// Drops every compact list at once. Row liveness is kept.
    pub fn release_lists(&mut self) {
        self.compact.iter_mut().for_each(|handle| *handle = None);
        self.allocator.release_all();
    }

    /// Recounts every slot from the compact lists of used rows and compares
    /// with the registry. Also checks `nrel` and `nprimes`.
    pub fn counts_consistent(&self) -> bool {
        let mut expected = vec![0i32; self.registry.len()];
        for row in self.used_rows() {
            for &slot in self.list(row) {
                expected[slot as usize] += 1;
            }
        }
        let counts_match = expected
            .iter()
            .enumerate()
            .all(|(slot, &n)| self.registry.read(SlotId(slot as u32)) == n);
        let live = expected.iter().filter(|&&n| n > 0).count();
        counts_match
            && live == self.nprimes
            && self.registry.live_count() == self.nprimes
            && self.used.count_ones() == self.nrel
    }
}
