// src/lib.rs

pub mod core;
pub mod config;
pub mod memory;
pub mod registry;
pub mod relation;
pub mod filter;
pub mod output;

pub use crate::core::error::{FilterError, Result};
pub use crate::core::ideal::IdealKey;
pub use crate::core::purge::{Purge, PurgeReport};
