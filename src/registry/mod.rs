// src/registry/mod.rs

pub mod ideal_registry;

pub use ideal_registry::{IdealRegistry, RegistryPhase, SlotId, SlotValue, ELIMINATED};
