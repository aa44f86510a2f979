// src/relation/parser.rs

//! Text format of relations.
//!
//! A line reads `a,b:p_1,p_2,...:q_1,q_2,...` where `a` is signed decimal,
//! `b` unsigned decimal and the primes are hexadecimal. A prime listed `k`
//! times has exponent `k`. When `b == 0` the line is a free relation: `a` is
//! the prime, the rational list is ignored and the algebraic list carries the
//! roots of the polynomial modulo `a`.

use num::Integer;

use crate::core::ideal::RATIONAL_ROOT;

use super::relation::{AlgebraicPrime, RationalPrime, Relation};

/// Turns one input line into a [`Relation`]. Errors are plain reasons; the
/// scanner attaches the row number.
pub trait RelationParser {
    fn parse(&self, line: &str) -> Result<Relation, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CadoRelationParser;

impl RelationParser for CadoRelationParser {
    fn parse(&self, line: &str) -> Result<Relation, String> {
        let line = line.trim_end();
        let mut parts = line.split(':');
        let (ab, rat, alg) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(ab), Some(rat), Some(alg), None) => (ab, rat, alg),
            _ => return Err("expected three ':'-separated fields".to_string()),
        };

        let (a, b) = ab
            .split_once(',')
            .ok_or_else(|| "missing ',' between a and b".to_string())?;
        let a: i64 = a.trim().parse().map_err(|e| format!("bad a: {}", e))?;
        let b: u64 = b.trim().parse().map_err(|e| format!("bad b: {}", e))?;

        if b == 0 {
            let p = a.unsigned_abs();
            check_prime(p).map_err(|reason| format!("free relation: {}", reason))?;
            let roots = parse_hex_list(alg)?;
            for (i, &r) in roots.iter().enumerate() {
                // p itself is the projective root
                if r > p {
                    return Err(format!("free relation root {:x} above prime {:x}", r, p));
                }
                if roots[..i].contains(&r) {
                    return Err(format!("free relation root {:x} listed twice", r));
                }
            }
            let algebraic = roots
                .into_iter()
                .map(|r| AlgebraicPrime { p, r, e: 1 })
                .collect();
            return Ok(Relation {
                a,
                b,
                rational: vec![RationalPrime { p, e: 1 }],
                algebraic,
            });
        }

        let rational = count_primes(parse_prime_list(rat)?)
            .into_iter()
            .map(|(p, e)| RationalPrime { p, e })
            .collect();
        let algebraic = count_primes(parse_prime_list(alg)?)
            .into_iter()
            .map(|(p, e)| AlgebraicPrime { p, r: find_root(a, b, p), e })
            .collect();

        Ok(Relation { a, b, rational, algebraic })
    }
}

fn parse_hex_list(field: &str) -> Result<Vec<u64>, String> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|tok| {
            u64::from_str_radix(tok.trim(), 16).map_err(|e| format!("bad prime {:?}: {}", tok, e))
        })
        .collect()
}

/// Primality is not checked, only that `p` can key an ideal: roots live in
/// `0..=p` and must stay clear of `RATIONAL_ROOT`.
fn check_prime(p: u64) -> Result<(), String> {
    if p < 2 || p >= RATIONAL_ROOT {
        return Err(format!("invalid prime {:x}", p));
    }
    Ok(())
}

fn parse_prime_list(field: &str) -> Result<Vec<u64>, String> {
    let primes = parse_hex_list(field)?;
    for &p in &primes {
        check_prime(p)?;
    }
    Ok(primes)
}

/// Merges repeated primes into `(p, exponent)`, keeping first-seen order.
fn count_primes(primes: Vec<u64>) -> Vec<(u64, u32)> {
    let mut counted: Vec<(u64, u32)> = Vec::with_capacity(primes.len());
    for p in primes {
        match counted.iter_mut().find(|(q, _)| *q == p) {
            Some((_, e)) => *e += 1,
            None => counted.push((p, 1)),
        }
    }
    counted
}

/// Root `a / b mod p` of the ideal above `p` containing `a - b*alpha`.
/// Returns `p` for the projective root when `p` divides `b`.
pub fn find_root(a: i64, b: u64, p: u64) -> u64 {
    let p128 = p as i128;
    let b_mod = (b as i128).mod_floor(&p128);
    if b_mod == 0 {
        return p;
    }
    let a_mod = (a as i128).mod_floor(&p128);
    let inv = b_mod.extended_gcd(&p128).x.mod_floor(&p128);
    ((a_mod as u128 * inv as u128) % p as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normal_relation() {
        let rel = CadoRelationParser.parse("-7,3:2,2,b:5,d,d,d\n").unwrap();
        assert_eq!(rel.a, -7);
        assert_eq!(rel.b, 3);
        assert_eq!(
            rel.rational,
            vec![RationalPrime { p: 2, e: 2 }, RationalPrime { p: 11, e: 1 }]
        );
        assert_eq!(rel.algebraic.len(), 2);
        assert_eq!(rel.algebraic[1].p, 13);
        assert_eq!(rel.algebraic[1].e, 3);
    }

    #[test]
    fn test_roots() {
        // -7 / 3 mod 5 = 3 * 2 mod 5 = 1
        assert_eq!(find_root(-7, 3, 5), 1);
        // 10 / 4 mod 13: 4^-1 = 10, 10 * 10 = 100 = 9 mod 13
        assert_eq!(find_root(10, 4, 13), 9);
        assert_eq!(find_root(10, 26, 13), 13);
        let p = 0xffff_ffff_ffff_ffc5u64; // largest 64-bit prime
        let r = find_root(-1, 2, p);
        assert_eq!(((r as u128 * 2) % p as u128) as u64, p - 1);
    }

    #[test]
    fn test_parse_free_relation() {
        let rel = CadoRelationParser.parse("17,0::3,e").unwrap();
        assert!(rel.is_free());
        assert_eq!(rel.rational, vec![RationalPrime { p: 17, e: 1 }]);
        assert_eq!(
            rel.algebraic,
            vec![
                AlgebraicPrime { p: 17, r: 3, e: 1 },
                AlgebraicPrime { p: 17, r: 14, e: 1 }
            ]
        );
    }

    #[test]
    fn test_empty_sides_are_allowed() {
        let rel = CadoRelationParser.parse("1,1::").unwrap();
        assert!(rel.rational.is_empty());
        assert!(rel.algebraic.is_empty());
    }

    #[test]
    fn test_malformed() {
        assert!(CadoRelationParser.parse("").is_err());
        assert!(CadoRelationParser.parse("# comment").is_err());
        assert!(CadoRelationParser.parse("1,2:3").is_err());
        assert!(CadoRelationParser.parse("1;2:3:5").is_err());
        assert!(CadoRelationParser.parse("1,2:zz:5").is_err());
        assert!(CadoRelationParser.parse("1,2:3:5:7").is_err());
        assert!(CadoRelationParser.parse("1,0::2").is_err());
    }

    #[test]
    fn test_primes_below_two_are_rejected() {
        // a zero modulus would otherwise reach the root computation
        assert!(CadoRelationParser.parse("1,1::0").is_err());
        assert!(CadoRelationParser.parse("1,1::1").is_err());
        assert!(CadoRelationParser.parse("1,1:0:").is_err());
        assert!(CadoRelationParser.parse("1,1:3,1:5").is_err());
        assert!(CadoRelationParser.parse("1,1:fffffffffffffffe:").is_err());
    }

    #[test]
    fn test_free_relation_roots_are_checked() {
        assert!(CadoRelationParser.parse("17,0::3,3").is_err());
        assert!(CadoRelationParser.parse("17,0::12").is_err());
        assert!(CadoRelationParser.parse("17,0::fffffffffffffffe").is_err());
        // projective root
        let rel = CadoRelationParser.parse("17,0::11").unwrap();
        assert_eq!(rel.algebraic, vec![AlgebraicPrime { p: 17, r: 17, e: 1 }]);
    }
}
