// src/core/error.rs

use thiserror::Error;

use crate::core::ideal::IdealKey;

/// Every way a purge run can fail. None of these are recoverable: the caller
/// restarts the whole multi-pass run with more relations or looser bounds.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed relation at row {row}: {reason} (line: {line:?})")]
    MalformedRelation {
        row: usize,
        line: String,
        reason: String,
    },

    #[error("expected {expected} relations but scanned {scanned}; nrels must match the input")]
    RowCountMismatch { expected: usize, scanned: usize },

    #[error("initial excess is below requested {required} (nrels={nrels}, nprimes={nprimes})")]
    InsufficientInitialExcess {
        nrels: usize,
        nprimes: usize,
        required: usize,
    },

    #[error("excess is not positive after pruning (nrels={nrels}, nprimes={nprimes})")]
    NonPositiveExcess { nrels: usize, nprimes: usize },

    #[error("requested {requested} cells but a block only holds {capacity}; block capacity is too small")]
    AllocationTooLarge { requested: usize, capacity: usize },

    #[error("row {row} references ideal {key} which has no column")]
    UnknownIdeal { row: usize, key: IdealKey },

    #[error("registry used in the wrong phase: {0}")]
    RegistryPhase(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_counts() {
        let err = FilterError::RowCountMismatch { expected: 10, scanned: 9 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("9"));

        let err = FilterError::NonPositiveExcess { nrels: 3, nprimes: 4 };
        assert!(err.to_string().contains("nprimes=4"));
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> Result<std::fs::File> {
            Ok(std::fs::File::open("/definitely/not/here/rels")?)
        }
        assert!(matches!(open_missing(), Err(FilterError::Io(_))));
    }
}
