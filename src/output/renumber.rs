// src/output/renumber.rs

use std::io::Write;

use log::{info, warn};

use crate::core::error::Result;
use crate::registry::{IdealRegistry, SlotId, ELIMINATED};

/// Surviving singletons reported before going quiet.
const MAX_SINGLETON_WARNINGS: usize = 10;

/// Gives every referenced ideal a column, in registry insertion order.
///
/// Slot values flip from counts to 1-based column indices (or `ELIMINATED`
/// for unreferenced slots). When `column_map` is given, one line
/// `<index> <p hex> <r hex>` is written per column, index 0-based.
/// Returns the number of columns.
pub fn renumber(registry: &mut IdealRegistry, mut column_map: Option<&mut dyn Write>) -> Result<usize> {
    registry.begin_renumbering()?;
    let mut next: i32 = 1;
    let mut singletons = 0usize;

    for index in 0..registry.len() {
        let slot = SlotId(index as u32);
        let count = registry.read(slot);
        if count == 0 {
            registry.write(slot, ELIMINATED);
            continue;
        }

        let key = match registry.key(slot) {
            Some(key) => *key,
            None => continue,
        };
        // Ideals under the first-pass thresholds can legitimately stay single.
        if count == 1 {
            if singletons < MAX_SINGLETON_WARNINGS {
                if key.is_rational() {
                    warn!("singleton rational prime {}", key.p);
                } else {
                    warn!("singleton algebraic ideal ({},{})", key.p, key.r);
                }
            }
            singletons += 1;
        }

        registry.write(slot, next);
        if let Some(out) = column_map.as_mut() {
            writeln!(out, "{} {:x} {:x}", next - 1, key.p, key.r)?;
        }
        next += 1;
    }

    let columns = (next - 1) as usize;
    info!("Renumbered {} ideals into {} columns", registry.len(), columns);
    Ok(columns)
}
