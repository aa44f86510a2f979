// src/output/mod.rs

pub mod renumber;
pub mod matrix_writer;

pub use matrix_writer::{emit, EmitSummary};
pub use renumber::renumber;
