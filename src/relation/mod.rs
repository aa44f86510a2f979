// src/relation/mod.rs

pub mod relation;
pub mod parser;
pub mod source;

pub use parser::{CadoRelationParser, RelationParser};
pub use relation::{AlgebraicPrime, RationalPrime, Relation};
pub use source::{FileRelationSource, MemoryRelationSource, RelationSource};
