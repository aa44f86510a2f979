// src/output/matrix_writer.rs

use std::io::Write;

use log::{debug, info};

use crate::core::error::{FilterError, Result};
use crate::filter::scan::PROGRESS_INTERVAL;
use crate::filter::RelationTable;
use crate::relation::{RelationParser, RelationSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitSummary {
    pub rows: usize,
    /// Total number of nonzero entries written.
    pub weight: u64,
}

/// Re-reads the relations and writes the surviving ones.
///
/// Matrix mode writes a `<nrows> <ncols>` header, then per row
/// `<row id> <k> <c_1> ... <c_k>` with 0-based hexadecimal columns. Raw mode
/// copies the surviving input lines unchanged. Stops after `nrows` rows.
/// The registry must already be renumbered in matrix mode.
pub fn emit(
    table: &RelationTable,
    source: &dyn RelationSource,
    parser: &dyn RelationParser,
    out: &mut dyn Write,
    ncols: usize,
    raw: bool,
) -> Result<EmitSummary> {
    let nrows = table.nrel;
    let mut summary = EmitSummary::default();
    if !raw {
        writeln!(out, "{} {}", nrows, ncols)?;
    }
    info!("Final pass:");

    for (row, line) in source.lines()?.enumerate() {
        if summary.rows >= nrows {
            break;
        }
        let line = line?;
        if row % PROGRESS_INTERVAL == 0 && row > 0 {
            debug!("   nrel = {}", row);
        }
        if row >= table.nrelmax() || !table.is_used(row) {
            continue;
        }

        if raw {
            writeln!(out, "{}", line)?;
        } else {
            let mut relation = parser.parse(&line).map_err(|reason| FilterError::MalformedRelation {
                row,
                line: line.clone(),
                reason,
            })?;
            if !relation.is_free() {
                relation.reduce_exponents_mod2();
            }
            let ideals = relation.ideals();
            write!(out, "{} {}", row, ideals.len())?;
            for key in &ideals {
                let column = table
                    .registry
                    .column_of(key)?
                    .ok_or(FilterError::UnknownIdeal { row, key: *key })?;
                write!(out, " {:x}", column)?;
            }
            writeln!(out)?;
            summary.weight += ideals.len() as u64;
        }
        summary.rows += 1;
    }

    if summary.rows != nrows {
        return Err(FilterError::RowCountMismatch {
            expected: nrows,
            scanned: summary.rows,
        });
    }
    Ok(summary)
}
