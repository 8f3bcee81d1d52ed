//! # FPU Coprocessor Runtime
//!
//! Emulates a memory-mapped floating-point coprocessor. A bus master issues
//! byte-oriented read/write transactions against a bank of typed registers;
//! the coprocessor stores words, executes arithmetic on them, and answers
//! reads over the same bus.
//!
//! ## Features
//!
//! - **Register file**: 256 × 32-bit and 256 × 64-bit words, bounds-checked
//! - **Opcode store**: 1024 slots of 4-byte opcode records
//! - **12 operations**: single/double precision add, sub, mul, div, plus
//!   sin, cos, tan and sqrt in double precision
//! - **Bus protocol**: intent inferred from direction and payload length
//! - **Poll loop**: strictly one transaction at a time, busy asserted throughout
//!
//! ## Example
//!
//! ```rust
//! use fpu_runtime::{QueueBus, SystemContext};
//! use fpu_spec::BusTransaction;
//!
//! let bus = QueueBus::with_transactions([
//!     BusTransaction::write32(3, 1.0f32.to_bits()),
//!     BusTransaction::read(3),
//! ]);
//! let mut fpu = SystemContext::with_defaults(bus);
//! fpu.run_until_idle();
//! assert_eq!(fpu.bus().responses()[0].1, vec![0x00, 0x00, 0x80, 0x3F]);
//! ```

pub mod bus;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod opcode_store;
pub mod protocol;
pub mod registers;
pub mod snapshot;

pub use bus::{Bus, BusEvent, NullBus, QueueBus};
pub use context::{BusStats, SlotExecution, SystemContext};
pub use dispatch::OperationDispatcher;
pub use error::{Result, RuntimeError};
pub use opcode_store::OpcodeStore;
pub use protocol::{handle_transaction, DropReason, RegisterSpace, TransactionOutcome};
pub use registers::RegisterFile;
pub use snapshot::Snapshot;
