//! Runtime error types for the FPU coprocessor

use fpu_spec::{FpuError, IndexOutOfRange};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Coprocessor error: {0}")]
    Coprocessor(#[from] FpuError),

    #[error("Out of range: {0}")]
    OutOfRange(#[from] IndexOutOfRange),

    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
