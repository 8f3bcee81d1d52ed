//! # Error Types for the FPU coprocessor

use crate::config::ConfigError;
use thiserror::Error;

/// A bounds-checked access landed outside fixed-capacity storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("index {index} out of range (capacity {capacity})")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub capacity: usize,
}

impl IndexOutOfRange {
    /// Check `index` against `capacity`
    #[inline]
    pub fn check(index: usize, capacity: usize) -> std::result::Result<(), Self> {
        if index < capacity {
            Ok(())
        } else {
            Err(Self { index, capacity })
        }
    }
}

#[derive(Debug, Error)]
pub enum FpuError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid operation identifier: {0:#04x}")]
    InvalidOperation(u8),

    #[error("Storage access out of range: {0}")]
    OutOfRange(#[from] IndexOutOfRange),

    #[error("Snapshot {what} has {found} entries, expected {expected}")]
    SnapshotMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, FpuError>;
