// src/core/purge.rs

//! Multi-pass driver.
//!
//! The first pass only loads ideals above the factor base bounds, which keeps
//! the registry small while the bulk of redundant relations is thrown away.
//! The next pass loads every ideal of the surviving relations; that pass is
//! final and is the only one where the excess is exact, so excess pruning
//! and the excess checks happen there. Renumbering and the matrix output
//! follow.

use std::io::Write;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PurgeConfig;
use crate::core::error::{FilterError, Result};
use crate::filter::{prune, scan_relations, ComponentCost, RelationTable, Thresholds};
use crate::output::{emit, renumber};
use crate::relation::{RelationParser, RelationSource};

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub rows: usize,
    pub columns: usize,
    pub excess: i64,
    /// Nonzero entries of the matrix; 0 in raw mode.
    pub weight: u64,
    pub passes: usize,
    pub raw: bool,
}

impl PurgeReport {
    /// Summary lines printed on stdout for the calling scripts.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.raw {
            lines.push(format!(
                "WEIGHT: {} WEIGHT*NROWS={}",
                self.weight,
                scientific(self.weight as f64 * self.rows as f64)
            ));
        }
        lines.push(format!("EXCESS: {}", self.excess));
        lines
    }
}

/// `x` with two decimals and a signed, at least two-digit exponent, as the
/// merge scripts read it (`4.00e+02`).
fn scientific(x: f64) -> String {
    let formatted = format!("{:.2e}", x);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => formatted,
        },
        None => formatted,
    }
}

pub struct Purge<'a> {
    config: PurgeConfig,
    source: &'a dyn RelationSource,
    parser: &'a dyn RelationParser,
    cost: Box<dyn ComponentCost + 'a>,
    pub table: RelationTable,
    pub passes: usize,
    filtered: bool,
}

impl<'a> Purge<'a> {
    pub fn new(config: PurgeConfig, source: &'a dyn RelationSource, parser: &'a dyn RelationParser) -> Self {
        let capacity = config.registry_capacity();
        info!("Number of relations is {}", config.nrels);
        info!("initializing registry with capacity {}...", capacity);
        let table = RelationTable::new(config.nrels, capacity, config.block_capacity);
        let cost = Box::new(config.cost_policy);
        Purge {
            config,
            source,
            parser,
            cost,
            table,
            passes: 0,
            filtered: false,
        }
    }

    /// Replaces the configured scoring policy.
    pub fn with_cost<C: ComponentCost + 'a>(mut self, cost: C) -> Self {
        self.cost = Box::new(cost);
        self
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// Runs every pass up to and including the final one. Afterwards the
    /// registry holds the exact counts of the surviving rows.
    pub fn filter(&mut self) -> Result<()> {
        let mut thresholds = Thresholds::new(
            self.config.initial_min_rational(),
            self.config.initial_min_algebraic(),
        );
        info!(
            "Using minpr={} minpa={}",
            thresholds.min_rational, thresholds.min_algebraic
        );

        loop {
            let final_pass = thresholds.is_final();
            self.passes += 1;
            info!("Pass {}:", self.passes);

            let scan = scan_relations(&mut self.table, self.source, self.parser, thresholds)?;
            info!(
                "   nrels={}, nprimes={}; excess={} ({} free relations)",
                self.table.nrel,
                self.table.nprimes,
                self.table.excess(),
                scan.free_relations
            );

            if final_pass && self.table.nrel < self.table.nprimes + self.config.min_excess {
                return Err(FilterError::InsufficientInitialExcess {
                    nrels: self.table.nrel,
                    nprimes: self.table.nprimes,
                    required: self.config.min_excess,
                });
            }

            info!("   Starting singleton removal...");
            prune(&mut self.table, self.config.keep, final_pass, self.cost.as_ref());
            info!(
                "   nrel={}, nprimes={}; excess={}",
                self.table.nrel,
                self.table.nprimes,
                self.table.excess()
            );

            // A lower threshold only adds ideals, so a non-positive excess
            // here cannot recover on a later pass.
            if self.table.nrel <= self.table.nprimes {
                return Err(FilterError::NonPositiveExcess {
                    nrels: self.table.nrel,
                    nprimes: self.table.nprimes,
                });
            }

            self.table.release_lists();
            if final_pass {
                break;
            }
            thresholds = Thresholds::none();
            self.table.registry.reset_all();
        }

        self.filtered = true;
        Ok(())
    }

    /// Renumbers the surviving ideals and writes the output. Runs the passes
    /// first when `filter` was not called.
    pub fn write_output(
        &mut self,
        matrix_out: &mut dyn Write,
        column_map: Option<&mut dyn Write>,
    ) -> Result<PurgeReport> {
        if !self.filtered {
            self.filter()?;
        }

        info!("Renumbering primes...");
        let columns = renumber(&mut self.table.registry, column_map)?;

        info!("Storing remaining relations...");
        let emitted = emit(
            &self.table,
            self.source,
            self.parser,
            matrix_out,
            columns,
            self.config.raw,
        )?;
        matrix_out.flush()?;

        Ok(PurgeReport {
            rows: emitted.rows,
            columns,
            excess: emitted.rows as i64 - columns as i64,
            weight: emitted.weight,
            passes: self.passes,
            raw: self.config.raw,
        })
    }

    pub fn run(
        mut self,
        matrix_out: &mut dyn Write,
        column_map: Option<&mut dyn Write>,
    ) -> Result<PurgeReport> {
        self.filter()?;
        self.write_output(matrix_out, column_map)
    }
}
