// src/registry/ideal_registry.rs

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::core::error::{FilterError, Result};
use crate::core::ideal::IdealKey;

/// Value stored for an ideal with no live reference once renumbered.
pub const ELIMINATED: i32 = -1;

/// Stable handle to an ideal, equal to its insertion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What the per-slot integers currently mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryPhase {
    /// Each value is the number of live rows referencing the ideal.
    Counting,
    /// Each value is a 1-based column index, or `ELIMINATED`.
    Renumbered,
}

/// Decoded view of a slot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValue {
    Count(u32),
    Column(u32),
    Eliminated,
}

/// Maps ideals to dense slots and keeps one signed integer per slot.
///
/// The integer is a live count while filtering and is overwritten in place by
/// the column index when [`renumber`](crate::output::renumber::renumber) runs.
/// The switch is tracked by `phase` and happens at most once per reset.
#[derive(Debug)]
pub struct IdealRegistry {
    keys: IndexSet<IdealKey, FxBuildHasher>,
    values: Vec<i32>,
    phase: RegistryPhase,
}

impl IdealRegistry {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        IdealRegistry {
            keys: IndexSet::with_capacity_and_hasher(capacity, FxBuildHasher::default()),
            values: Vec::with_capacity(capacity),
            phase: RegistryPhase::Counting,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn phase(&self) -> RegistryPhase {
        self.phase
    }

    /// Returns the slot of `key`, creating it with count 0 when absent.
    pub fn lookup_or_insert(&mut self, key: IdealKey) -> SlotId {
        let (index, inserted) = self.keys.insert_full(key);
        if inserted {
            self.values.push(0);
        }
        SlotId(index as u32)
    }

    pub fn lookup(&self, key: &IdealKey) -> Option<SlotId> {
        self.keys.get_index_of(key).map(|index| SlotId(index as u32))
    }

    pub fn key(&self, slot: SlotId) -> Option<&IdealKey> {
        self.keys.get_index(slot.index())
    }

    /// Adds one reference and returns the new count.
    pub fn increment(&mut self, slot: SlotId) -> i32 {
        debug_assert_eq!(self.phase, RegistryPhase::Counting);
        let value = &mut self.values[slot.index()];
        *value += 1;
        *value
    }

    /// Drops one reference and returns the new count.
    pub fn decrement(&mut self, slot: SlotId) -> i32 {
        debug_assert_eq!(self.phase, RegistryPhase::Counting);
        let value = &mut self.values[slot.index()];
        debug_assert!(*value > 0, "decrement of an unreferenced slot");
        *value -= 1;
        *value
    }

    pub fn read(&self, slot: SlotId) -> i32 {
        self.values[slot.index()]
    }

    pub fn write(&mut self, slot: SlotId, value: i32) {
        self.values[slot.index()] = value;
    }

    pub fn value(&self, slot: SlotId) -> SlotValue {
        let raw = self.read(slot);
        match (self.phase, raw) {
            (_, ELIMINATED) => SlotValue::Eliminated,
            (RegistryPhase::Counting, n) => SlotValue::Count(n.max(0) as u32),
            (RegistryPhase::Renumbered, 0) => SlotValue::Eliminated,
            (RegistryPhase::Renumbered, n) => SlotValue::Column(n as u32),
        }
    }

    /// Marks the count-to-index flip. Only valid once per reset.
    pub fn begin_renumbering(&mut self) -> Result<()> {
        if self.phase == RegistryPhase::Renumbered {
            return Err(FilterError::RegistryPhase("registry was already renumbered"));
        }
        self.phase = RegistryPhase::Renumbered;
        Ok(())
    }

    /// 0-based column of `key` after renumbering.
    pub fn column_of(&self, key: &IdealKey) -> Result<Option<u32>> {
        if self.phase != RegistryPhase::Renumbered {
            return Err(FilterError::RegistryPhase("column lookup before renumbering"));
        }
        Ok(self.lookup(key).and_then(|slot| match self.value(slot) {
            SlotValue::Column(index) => Some(index - 1),
            _ => None,
        }))
    }

    /// Forgets every ideal and returns to the counting phase.
    pub fn reset_all(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.phase = RegistryPhase::Counting;
    }

    /// Number of slots whose count is at least one.
    pub fn live_count(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0).count()
    }

    /// Slots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &IdealKey)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .map(|(index, key)| (SlotId(index as u32), key))
    }
}

impl Default for IdealRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough count of primes up to `bound`. The 0.85 factor accounts for large
/// prime combinations showing up before `B / ln B` is reached.
pub fn approx_phi(bound: u64) -> usize {
    if bound <= 1 {
        0
    } else {
        let b = bound as f64;
        (0.85 * b / b.ln()) as usize
    }
}

/// Registry size estimate from the large prime bounds (in bits) and the
/// thresholds of the first pass.
pub fn estimate_ideal_count(lpbr: u32, lpba: u32, min_rational: u64, min_algebraic: u64) -> usize {
    let side = |lpb: u32, min: u64| {
        let bound = 1u64.checked_shl(lpb).unwrap_or(u64::MAX);
        approx_phi(bound).saturating_sub(approx_phi(min))
    };
    side(lpbr, min_rational) + side(lpba, min_algebraic)
}
