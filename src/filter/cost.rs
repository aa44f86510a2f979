// src/filter/cost.rs

//! Scoring of connected components for excess pruning.
//!
//! Removing a component of `n` rows and total weight `w` from a matrix of
//! `N` rows and weight `W` shrinks `N*W` by about `w*N + n*W`. Components with
//! the largest cost are sacrificed first. Which quantity to shrink fastest is
//! a tuning choice, so the cost is a trait with the usual candidates as
//! [`CostPolicy`] variants.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Size of the whole active matrix when components are scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixStats {
    pub rows: f64,
    pub weight: f64,
}

/// One connected component under the "shares a weight-2 ideal" relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStats {
    /// First row reached, deleted to break the component.
    pub representative: usize,
    pub rows: usize,
    pub weight: u64,
}

pub trait ComponentCost {
    fn cost(&self, component: &ComponentStats, matrix: &MatrixStats) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CostPolicy {
    /// n/N: shrink the row count fastest.
    #[default]
    RowFraction,
    /// w/W: shrink the total weight fastest.
    WeightFraction,
    /// w/W + n/N: shrink N*W.
    Blend,
}

impl ComponentCost for CostPolicy {
    fn cost(&self, component: &ComponentStats, matrix: &MatrixStats) -> f64 {
        let row_fraction = component.rows as f64 / matrix.rows;
        let weight_fraction = if matrix.weight > 0.0 {
            component.weight as f64 / matrix.weight
        } else {
            0.0
        };
        match self {
            CostPolicy::RowFraction => row_fraction,
            CostPolicy::WeightFraction => weight_fraction,
            CostPolicy::Blend => weight_fraction + row_fraction,
        }
    }
}

impl<F> ComponentCost for F
where
    F: Fn(&ComponentStats, &MatrixStats) -> f64,
{
    fn cost(&self, component: &ComponentStats, matrix: &MatrixStats) -> f64 {
        self(component, matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: MatrixStats = MatrixStats { rows: 100.0, weight: 1000.0 };

    fn component(rows: usize, weight: u64) -> ComponentStats {
        ComponentStats { representative: 0, rows, weight }
    }

    #[test]
    fn test_policies() {
        let c = component(10, 50);
        assert!((CostPolicy::RowFraction.cost(&c, &MATRIX) - 0.1).abs() < 1e-12);
        assert!((CostPolicy::WeightFraction.cost(&c, &MATRIX) - 0.05).abs() < 1e-12);
        assert!((CostPolicy::Blend.cost(&c, &MATRIX) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_weightless_matrix() {
        let empty = MatrixStats { rows: 4.0, weight: 0.0 };
        assert_eq!(CostPolicy::WeightFraction.cost(&component(1, 0), &empty), 0.0);
    }

    #[test]
    fn test_closures_are_policies() {
        let inverse = |c: &ComponentStats, _: &MatrixStats| -(c.rows as f64);
        assert_eq!(inverse.cost(&component(3, 0), &MATRIX), -3.0);
    }

    #[test]
    fn test_deserialize_names() {
        let policy: CostPolicy = serde_json::from_str("\"weight_fraction\"").unwrap();
        assert_eq!(policy, CostPolicy::WeightFraction);
    }
}
