//! # FPU Coprocessor Specification
//!
//! Core types for a memory-mapped floating-point coprocessor.
//!
//! ## Key Features
//! - Two independent register spaces: 256 × 32-bit and 256 × 64-bit words
//! - 1024-slot opcode store holding 4-byte opcode records
//! - 12 arithmetic operations over IEEE-754 single and double precision
//! - Byte-oriented bus transactions (8-bit address, 0/4/8-byte payload)
//!
//! Words are opaque bit patterns. They are viewed as `f32`/`f64` only through
//! explicit bit reinterpretation (`from_bits`/`to_bits`) at the point of use.

pub mod bus;
pub mod config;
pub mod error;
pub mod opcode;
pub mod operation;

pub use bus::{BusDirection, BusSignals, BusTransaction, TransactionShape};
pub use config::{ConfigError, CoprocessorConfig};
pub use error::{FpuError, IndexOutOfRange};
pub use opcode::{OpcodeKind, OpcodeRecord};
pub use operation::{OperationError, OperationId, OperationOutcome, OperationRequest, OperationResult};

/// Number of registers in the 32-bit space
pub const REGISTER_COUNT_32: usize = 256;

/// Number of registers in the 64-bit space
pub const REGISTER_COUNT_64: usize = 256;

/// Number of slots in the opcode store
pub const OPCODE_SLOTS: usize = 1024;

/// 32-bit register word (opaque bit pattern)
pub type Word32 = u32;

/// 64-bit register word (opaque bit pattern)
pub type Word64 = u64;

/// Register index. Wider than the bus address so out-of-range requests are representable.
pub type RegisterIndex = usize;
