// src/memory/compact_allocator.rs

//! Bump allocator for the per-row compact lists.
//!
//! Tens of millions of short `u32` arrays are far too many for one heap
//! allocation each, so rows carve their lists out of large fixed-capacity
//! blocks instead. Lists are never freed or resized one at a time: the whole
//! arena is released between passes with [`CompactAllocator::release_all`].

use crate::core::error::{FilterError, Result};

/// Terminates every compact list.
pub const SENTINEL: u32 = u32::MAX;

/// Default block capacity, in `u32` cells.
pub const DEFAULT_BLOCK_CAPACITY: usize = 1_000_000;

/// Handle to a list inside the arena. Only valid until the next `release_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRef {
    block: u32,
    offset: u32,
}

#[derive(Debug)]
pub struct CompactAllocator {
    blocks: Vec<Vec<u32>>,
    block_capacity: usize,
    /// Cells handed out from the current (last) block.
    used: usize,
}

impl CompactAllocator {
    pub fn new(block_capacity: usize) -> Self {
        CompactAllocator {
            blocks: Vec::new(),
            block_capacity: block_capacity.max(1),
            used: 0,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Reserves `n` zeroed cells and returns their handle.
    pub fn allocate(&mut self, n: usize) -> Result<ListRef> {
        if n > self.block_capacity {
            return Err(FilterError::AllocationTooLarge {
                requested: n,
                capacity: self.block_capacity,
            });
        }

        if self.blocks.is_empty() || self.used + n > self.block_capacity {
            // Give the unused tail of the current block back before moving on.
            if let Some(current) = self.blocks.last_mut() {
                current.shrink_to_fit();
            }
            self.blocks.push(Vec::with_capacity(self.block_capacity));
            self.used = 0;
        }

        let block_index = self.blocks.len() - 1;
        let block = &mut self.blocks[block_index];
        let offset = self.used;
        block.resize(offset + n, 0);
        self.used += n;

        Ok(ListRef {
            block: block_index as u32,
            offset: offset as u32,
        })
    }

    /// Allocates a list holding `slots` followed by the sentinel.
    pub fn store_list(&mut self, slots: &[u32]) -> Result<ListRef> {
        let handle = self.allocate(slots.len() + 1)?;
        let cells = self.slice_mut(handle, slots.len() + 1);
        cells[..slots.len()].copy_from_slice(slots);
        cells[slots.len()] = SENTINEL;
        Ok(handle)
    }

    pub fn slice_mut(&mut self, handle: ListRef, len: usize) -> &mut [u32] {
        let start = handle.offset as usize;
        &mut self.blocks[handle.block as usize][start..start + len]
    }

    /// The slot ids of a list, not including the sentinel.
    pub fn list(&self, handle: ListRef) -> &[u32] {
        let block = &self.blocks[handle.block as usize];
        let tail = &block[handle.offset as usize..];
        let len = tail.iter().position(|&cell| cell == SENTINEL).unwrap_or(tail.len());
        &tail[..len]
    }

    /// Frees every block at once; all outstanding handles become invalid.
    pub fn release_all(&mut self) {
        self.blocks.clear();
        self.blocks.shrink_to_fit();
        self.used = 0;
    }

    /// Bytes currently held by the arena.
    pub fn allocated_bytes(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.capacity() * std::mem::size_of::<u32>())
            .sum()
    }
}

impl Default for CompactAllocator {
    fn default() -> Self {
        CompactAllocator::new(DEFAULT_BLOCK_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_independent() {
        let mut alloc = CompactAllocator::new(16);
        let a = alloc.store_list(&[1, 2, 3]).unwrap();
        let b = alloc.store_list(&[9]).unwrap();
        let empty = alloc.store_list(&[]).unwrap();
        assert_eq!(alloc.list(a), &[1, 2, 3]);
        assert_eq!(alloc.list(b), &[9]);
        assert!(alloc.list(empty).is_empty());
        assert_eq!(alloc.block_count(), 1);
    }

    #[test]
    fn test_rollover_starts_new_block_and_shrinks_previous() {
        let mut alloc = CompactAllocator::new(8);
        let a = alloc.store_list(&[1, 2, 3, 4, 5]).unwrap(); // 6 cells
        let b = alloc.store_list(&[6, 7, 8]).unwrap(); // 4 cells, does not fit
        assert_eq!(alloc.block_count(), 2);
        assert!(alloc.blocks[0].capacity() < 8);
        assert_eq!(alloc.list(a), &[1, 2, 3, 4, 5]);
        assert_eq!(alloc.list(b), &[6, 7, 8]);
    }

    #[test]
    fn test_exact_fit_stays_in_block() {
        let mut alloc = CompactAllocator::new(4);
        alloc.store_list(&[1]).unwrap();
        alloc.store_list(&[2]).unwrap();
        assert_eq!(alloc.block_count(), 1);
        alloc.store_list(&[3]).unwrap();
        assert_eq!(alloc.block_count(), 2);
    }

    #[test]
    fn test_request_wider_than_block_fails() {
        let mut alloc = CompactAllocator::new(4);
        match alloc.allocate(5) {
            Err(FilterError::AllocationTooLarge { requested, capacity }) => {
                assert_eq!(requested, 5);
                assert_eq!(capacity, 4);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_release_all() {
        let mut alloc = CompactAllocator::new(32);
        for i in 0..20 {
            alloc.store_list(&[i, i + 1]).unwrap();
        }
        assert!(alloc.allocated_bytes() > 0);
        alloc.release_all();
        assert_eq!(alloc.block_count(), 0);
        assert_eq!(alloc.allocated_bytes(), 0);

        let h = alloc.store_list(&[42]).unwrap();
        assert_eq!(alloc.list(h), &[42]);
    }
}
