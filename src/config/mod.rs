// src/config/mod.rs

pub mod purge_config;

// Re-export main types for convenience
pub use purge_config::PurgeConfig;
