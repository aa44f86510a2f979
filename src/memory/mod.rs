// src/memory/mod.rs

pub mod compact_allocator;

pub use compact_allocator::{CompactAllocator, ListRef, SENTINEL};
