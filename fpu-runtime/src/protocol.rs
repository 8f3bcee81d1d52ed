//! Bus transaction protocol
//!
//! Maps one transaction onto the register file using only its direction and
//! payload length. Reads respond through the bus; writes are silent.
//! Opcode slots and 64-bit reads have no bus shape; transactions that would
//! need one are dropped as unsupported rather than guessed at.

use crate::bus::Bus;
use crate::registers::RegisterFile;
use fpu_spec::bus::TransactionShape;
use fpu_spec::{BusDirection, BusTransaction, IndexOutOfRange};
use std::fmt;

/// Which register space a write landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterSpace {
    Word32,
    Word64,
}

impl fmt::Display for RegisterSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterSpace::Word32 => write!(f, "r32"),
            RegisterSpace::Word64 => write!(f, "r64"),
        }
    }
}

/// Why a transaction produced no effect and no response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Address outside the register space
    RegisterOutOfRange(IndexOutOfRange),
    /// `{direction, payload length}` has no defined meaning
    UnsupportedShape { direction: BusDirection, length: usize },
}

impl DropReason {
    #[inline]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, DropReason::UnsupportedShape { .. })
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::RegisterOutOfRange(err) => write!(f, "register {}", err),
            DropReason::UnsupportedShape { direction, length } => {
                write!(f, "unsupported transaction shape: {} with {} byte payload", direction, length)
            }
        }
    }
}

/// How a transaction was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Written { space: RegisterSpace, address: u8 },
    Responded { address: u8, data: Vec<u8> },
    Dropped(DropReason),
}

impl TransactionOutcome {
    #[inline]
    pub fn is_dropped(&self) -> bool {
        matches!(self, TransactionOutcome::Dropped(_))
    }
}

/// Resolve one transaction against the register file.
///
/// A successful read is answered through `bus` before returning; nothing else
/// is sent on the bus.
pub fn handle_transaction<B: Bus + ?Sized>(
    registers: &mut RegisterFile,
    bus: &mut B,
    transaction: &BusTransaction,
) -> TransactionOutcome {
    let address = transaction.address;
    match transaction.shape() {
        TransactionShape::Write32(word) => match registers.write32(address as usize, word) {
            Ok(()) => TransactionOutcome::Written {
                space: RegisterSpace::Word32,
                address,
            },
            Err(err) => TransactionOutcome::Dropped(DropReason::RegisterOutOfRange(err)),
        },
        TransactionShape::Write64(word) => match registers.write64(address as usize, word) {
            Ok(()) => TransactionOutcome::Written {
                space: RegisterSpace::Word64,
                address,
            },
            Err(err) => TransactionOutcome::Dropped(DropReason::RegisterOutOfRange(err)),
        },
        TransactionShape::Read32 => match registers.read32(address as usize) {
            Some(word) => {
                let data = word.to_le_bytes().to_vec();
                bus.respond(transaction, &data);
                TransactionOutcome::Responded { address, data }
            }
            None => TransactionOutcome::Dropped(DropReason::RegisterOutOfRange(IndexOutOfRange {
                index: address as usize,
                capacity: fpu_spec::REGISTER_COUNT_32,
            })),
        },
        TransactionShape::Unsupported { direction, length } => {
            TransactionOutcome::Dropped(DropReason::UnsupportedShape { direction, length })
        }
    }
}
