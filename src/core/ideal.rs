// src/core/ideal.rs

use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};

/// Root value stored for rational-side ideals. No algebraic root can take
/// this value since roots are reduced modulo a prime that fits in 64 bits.
pub const RATIONAL_ROOT: u64 = u64::MAX - 1;

/// A prime ideal: `(p, r)` on the algebraic side, `(p, RATIONAL_ROOT)` on the
/// rational side. Both sides share one registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdealKey {
    pub p: u64,
    pub r: u64,
}

impl IdealKey {
    pub fn new(p: u64, r: u64) -> Self {
        IdealKey { p, r }
    }

    pub fn rational(p: u64) -> Self {
        IdealKey { p, r: RATIONAL_ROOT }
    }

    pub fn algebraic(p: u64, r: u64) -> Self {
        IdealKey { p, r }
    }

    pub fn is_rational(&self) -> bool {
        self.r == RATIONAL_ROOT
    }
}

impl Hash for IdealKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.p.hash(state);
        self.r.hash(state);
    }
}

impl Eq for IdealKey {}

impl PartialEq for IdealKey {
    fn eq(&self, other: &IdealKey) -> bool {
        self.p == other.p && self.r == other.r
    }
}

impl std::fmt::Display for IdealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_rational() {
            write!(f, "({:x},rat)", self.p)
        } else {
            write!(f, "({:x},{:x})", self.p, self.r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_and_algebraic_never_collide() {
        let rat = IdealKey::rational(7);
        let alg = IdealKey::algebraic(7, 3);
        assert!(rat.is_rational());
        assert!(!alg.is_rational());
        assert_ne!(rat, alg);
    }

    #[test]
    fn test_display() {
        assert_eq!(IdealKey::rational(0x1f).to_string(), "(1f,rat)");
        assert_eq!(IdealKey::algebraic(0x1f, 2).to_string(), "(1f,2)");
    }
}
