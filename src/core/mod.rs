// src/core/mod.rs

pub mod error;
pub mod ideal;
pub mod purge;
