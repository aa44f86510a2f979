// src/relation/relation.rs

use crate::core::ideal::IdealKey;

/// A prime on the rational side and its exponent in the norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalPrime {
    pub p: u64,
    pub e: u32,
}

/// A degree-one algebraic ideal `(p, r)` and its exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgebraicPrime {
    pub p: u64,
    pub r: u64,
    pub e: u32,
}

/// One parsed input line.
///
/// For a free relation (`b == 0`) `a` is the prime, the rational side holds
/// that single prime and the algebraic side holds one `(a, root)` entry per
/// root of the polynomial modulo `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub a: i64,
    pub b: u64,
    pub rational: Vec<RationalPrime>,
    pub algebraic: Vec<AlgebraicPrime>,
}

impl Relation {
    pub fn is_free(&self) -> bool {
        self.b == 0
    }

    /// Drops primes with an even exponent: they cancel in the matrix over GF(2).
    pub fn reduce_exponents_mod2(&mut self) {
        self.rational.retain(|rp| rp.e % 2 == 1);
        self.algebraic.retain(|ap| ap.e % 2 == 1);
        for rp in &mut self.rational {
            rp.e = 1;
        }
        for ap in &mut self.algebraic {
            ap.e = 1;
        }
    }

    /// Ideals of this relation restricted to primes at or above the thresholds,
    /// rational ideals first. Expects exponents already reduced.
    pub fn ideals_above(&self, min_rational: u64, min_algebraic: u64) -> Vec<IdealKey> {
        if self.is_free() {
            let p = self.a.unsigned_abs();
            let mut ideals = Vec::with_capacity(1 + self.algebraic.len());
            if p >= min_rational {
                ideals.push(IdealKey::rational(p));
            }
            if p >= min_algebraic {
                ideals.extend(self.algebraic.iter().map(|ap| IdealKey::algebraic(p, ap.r)));
            }
            return ideals;
        }

        self.rational
            .iter()
            .filter(|rp| rp.p >= min_rational)
            .map(|rp| IdealKey::rational(rp.p))
            .chain(
                self.algebraic
                    .iter()
                    .filter(|ap| ap.p >= min_algebraic)
                    .map(|ap| IdealKey::algebraic(ap.p, ap.r)),
            )
            .collect()
    }

    /// Every ideal of the relation, as written to the matrix.
    pub fn ideals(&self) -> Vec<IdealKey> {
        self.ideals_above(0, 0)
    }
}
