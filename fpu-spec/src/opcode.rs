//! # Opcode Record Definitions
//!
//! An opcode record is a 4-byte tuple stored in the opcode store:
//!
//! ```text
//! Byte  Field
//! ─────────────────
//! 0     kind
//! 1     operand0
//! 2     operand1
//! 3     operand2
//! ```
//!
//! Kind values:
//! - 0x00: NOP
//! - 0x10-0x13: register transfer (LOAD32, LOAD64, STORE32, STORE64)
//! - 0x20: EXECUTE_OP (operands are destination, source0, source1)
//!
//! The store accepts raw bytes, so an unrecognized kind byte decodes as NOP
//! instead of being rejected.

use crate::operation::{OperationId, OperationRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opcode kind (first byte of an opcode record)
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpcodeKind {
    /// NOP: no effect
    #[default]
    Nop = 0x00,
    /// LOAD32: register transfer into the 32-bit space
    Load32 = 0x10,
    /// LOAD64: register transfer into the 64-bit space
    Load64 = 0x11,
    /// STORE32: register transfer out of the 32-bit space
    Store32 = 0x12,
    /// STORE64: register transfer out of the 64-bit space
    Store64 = 0x13,
    /// EXECUTE_OP: dst, src0, src1
    ExecuteOp = 0x20,
}

impl OpcodeKind {
    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(OpcodeKind::Nop),
            0x10 => Some(OpcodeKind::Load32),
            0x11 => Some(OpcodeKind::Load64),
            0x12 => Some(OpcodeKind::Store32),
            0x13 => Some(OpcodeKind::Store64),
            0x20 => Some(OpcodeKind::ExecuteOp),
            _ => None,
        }
    }

    /// Decode a raw kind byte, treating unknown values as NOP
    #[inline]
    pub fn from_u8_lossy(value: u8) -> Self {
        Self::from_u8(value).unwrap_or(OpcodeKind::Nop)
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpcodeKind::Nop => "nop",
            OpcodeKind::Load32 => "load32",
            OpcodeKind::Load64 => "load64",
            OpcodeKind::Store32 => "store32",
            OpcodeKind::Store64 => "store64",
            OpcodeKind::ExecuteOp => "exec",
        }
    }

    /// Look up a kind by mnemonic (case-insensitive)
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "nop" => Some(OpcodeKind::Nop),
            "load32" => Some(OpcodeKind::Load32),
            "load64" => Some(OpcodeKind::Load64),
            "store32" => Some(OpcodeKind::Store32),
            "store64" => Some(OpcodeKind::Store64),
            "exec" | "execute" => Some(OpcodeKind::ExecuteOp),
            _ => None,
        }
    }
}

impl fmt::Display for OpcodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Decoded opcode record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpcodeRecord {
    pub kind: OpcodeKind,
    pub operands: [u8; 3],
}

impl OpcodeRecord {
    /// Record size in bytes
    pub const SIZE: usize = 4;

    /// The cleared slot value
    pub const NOP: Self = Self {
        kind: OpcodeKind::Nop,
        operands: [0; 3],
    };

    pub const fn new(kind: OpcodeKind, operand0: u8, operand1: u8, operand2: u8) -> Self {
        Self {
            kind,
            operands: [operand0, operand1, operand2],
        }
    }

    /// EXECUTE_OP record: operands are (dst, src0, src1)
    pub const fn execute(dst: u8, src0: u8, src1: u8) -> Self {
        Self::new(OpcodeKind::ExecuteOp, dst, src0, src1)
    }

    /// Decode from raw bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            kind: OpcodeKind::from_u8_lossy(bytes[0]),
            operands: [bytes[1], bytes[2], bytes[3]],
        }
    }

    /// Encode to raw bytes
    pub fn to_bytes(self) -> [u8; 4] {
        [
            self.kind.to_u8(),
            self.operands[0],
            self.operands[1],
            self.operands[2],
        ]
    }

    #[inline]
    pub fn is_nop(&self) -> bool {
        self.kind == OpcodeKind::Nop
    }

    /// Build an operation request from an EXECUTE_OP record.
    ///
    /// The record carries registers only; the operation comes from the caller.
    /// Returns `None` for any other kind.
    pub fn operation_request(&self, op: OperationId) -> Option<OperationRequest> {
        match self.kind {
            OpcodeKind::ExecuteOp => Some(OperationRequest::new(
                op,
                self.operands[0] as usize,
                self.operands[1] as usize,
                self.operands[2] as usize,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for OpcodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {}, {}",
            self.kind, self.operands[0], self.operands[1], self.operands[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_values() {
        assert_eq!(OpcodeKind::Nop.to_u8(), 0x00);
        assert_eq!(OpcodeKind::Load32.to_u8(), 0x10);
        assert_eq!(OpcodeKind::Store64.to_u8(), 0x13);
        assert_eq!(OpcodeKind::ExecuteOp.to_u8(), 0x20);
    }

    #[test]
    fn test_unknown_kind_is_nop() {
        assert_eq!(OpcodeKind::from_u8(0x7F), None);
        assert_eq!(OpcodeKind::from_u8_lossy(0x7F), OpcodeKind::Nop);

        let record = OpcodeRecord::from_bytes([0xEE, 1, 2, 3]);
        assert!(record.is_nop());
        assert_eq!(record.operands, [1, 2, 3]);
    }

    #[test]
    fn test_record_bytes() {
        let record = OpcodeRecord::execute(4, 5, 6);
        assert_eq!(record.to_bytes(), [0x20, 4, 5, 6]);
        assert_eq!(OpcodeRecord::from_bytes([0x20, 4, 5, 6]), record);
    }

    #[test]
    fn test_default_is_nop() {
        assert_eq!(OpcodeRecord::default(), OpcodeRecord::NOP);
    }

    #[test]
    fn test_operation_request() {
        let record = OpcodeRecord::execute(2, 0, 1);
        let request = record.operation_request(OperationId::Add32).unwrap();
        assert_eq!(request.id, OperationId::Add32);
        assert_eq!(request.destination, 2);
        assert_eq!(request.source0, 0);
        assert_eq!(request.source1, 1);

        let load = OpcodeRecord::new(OpcodeKind::Load32, 2, 0, 1);
        assert!(load.operation_request(OperationId::Add32).is_none());
    }

    #[test]
    fn test_mnemonics() {
        for kind in [
            OpcodeKind::Nop,
            OpcodeKind::Load32,
            OpcodeKind::Load64,
            OpcodeKind::Store32,
            OpcodeKind::Store64,
            OpcodeKind::ExecuteOp,
        ] {
            assert_eq!(OpcodeKind::from_mnemonic(kind.mnemonic()), Some(kind));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(OpcodeRecord::execute(1, 2, 3).to_string(), "exec 1, 2, 3");
    }
}
