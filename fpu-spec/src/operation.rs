//! # Arithmetic Operation Definitions
//!
//! Twelve operations in two families:
//! - 0x00-0x03: single precision over the 32-bit space (ADD32, SUB32, MUL32, DIV32)
//! - 0x04-0x0B: double precision over the 64-bit space (ADD64, SUB64, MUL64, DIV64,
//!   SIN64, COS64, TAN64, SQRT64)
//!
//! The transcendental and root operations are unary; `source1` is ignored.

use crate::error::FpuError;
use crate::RegisterIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Operation identifier
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationId {
    /// ADD32: dst = src0 + src1 (f32)
    Add32 = 0x00,
    /// SUB32: dst = src0 - src1 (f32)
    Sub32 = 0x01,
    /// MUL32: dst = src0 * src1 (f32)
    Mul32 = 0x02,
    /// DIV32: dst = src0 / src1 (f32)
    Div32 = 0x03,
    /// ADD64: dst = src0 + src1 (f64)
    Add64 = 0x04,
    /// SUB64: dst = src0 - src1 (f64)
    Sub64 = 0x05,
    /// MUL64: dst = src0 * src1 (f64)
    Mul64 = 0x06,
    /// DIV64: dst = src0 / src1 (f64)
    Div64 = 0x07,
    /// SIN64: dst = sin(src0)
    Sine64 = 0x08,
    /// COS64: dst = cos(src0)
    Cosine64 = 0x09,
    /// TAN64: dst = tan(src0)
    Tangent64 = 0x0A,
    /// SQRT64: dst = sqrt(src0)
    SquareRoot64 = 0x0B,
}

impl OperationId {
    /// All operations in identifier order
    pub const ALL: [OperationId; 12] = [
        OperationId::Add32,
        OperationId::Sub32,
        OperationId::Mul32,
        OperationId::Div32,
        OperationId::Add64,
        OperationId::Sub64,
        OperationId::Mul64,
        OperationId::Div64,
        OperationId::Sine64,
        OperationId::Cosine64,
        OperationId::Tangent64,
        OperationId::SquareRoot64,
    ];

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Check if this operation works on the 32-bit register space
    #[inline]
    pub const fn is_single(self) -> bool {
        matches!(
            self,
            OperationId::Add32 | OperationId::Sub32 | OperationId::Mul32 | OperationId::Div32
        )
    }

    /// Check if this operation reads only `source0`
    #[inline]
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            OperationId::Sine64
                | OperationId::Cosine64
                | OperationId::Tangent64
                | OperationId::SquareRoot64
        )
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            OperationId::Add32 => "add32",
            OperationId::Sub32 => "sub32",
            OperationId::Mul32 => "mul32",
            OperationId::Div32 => "div32",
            OperationId::Add64 => "add64",
            OperationId::Sub64 => "sub64",
            OperationId::Mul64 => "mul64",
            OperationId::Div64 => "div64",
            OperationId::Sine64 => "sin64",
            OperationId::Cosine64 => "cos64",
            OperationId::Tangent64 => "tan64",
            OperationId::SquareRoot64 => "sqrt64",
        }
    }

    /// Look up an operation by mnemonic (case-insensitive)
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|op| op.mnemonic() == name)
    }
}

impl TryFrom<u8> for OperationId {
    type Error = FpuError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(FpuError::InvalidOperation(value))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Arithmetic command: one operation, one destination, up to two sources
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationRequest {
    pub id: OperationId,
    pub destination: RegisterIndex,
    pub source0: RegisterIndex,
    pub source1: RegisterIndex,
}

impl OperationRequest {
    pub const fn new(
        id: OperationId,
        destination: RegisterIndex,
        source0: RegisterIndex,
        source1: RegisterIndex,
    ) -> Self {
        Self {
            id,
            destination,
            source0,
            source1,
        }
    }

    /// Unary request; `source1` is set to zero and never read
    pub const fn unary(id: OperationId, destination: RegisterIndex, source: RegisterIndex) -> Self {
        Self::new(id, destination, source, 0)
    }
}

impl fmt::Display for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_unary() {
            write!(f, "{} {}, {}", self.id, self.destination, self.source0)
        } else {
            write!(
                f,
                "{} {}, {}, {}",
                self.id, self.destination, self.source0, self.source1
            )
        }
    }
}

/// Failure of a dispatched operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("source register out of range")]
    SourceOutOfRange,

    #[error("destination register out of range")]
    DestinationOutOfRange,

    #[error("unsupported operation")]
    UnsupportedOperation,
}

impl OperationError {
    /// Diagnostic message
    pub const fn message(self) -> &'static str {
        match self {
            OperationError::SourceOutOfRange => "source register out of range",
            OperationError::DestinationOutOfRange => "destination register out of range",
            OperationError::UnsupportedOperation => "unsupported operation",
        }
    }
}

/// Result of a dispatched operation. Never panics; failures are values.
pub type OperationResult = std::result::Result<(), OperationError>;

/// Success flag plus optional diagnostic, the flat view of an [`OperationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationOutcome {
    pub ok: bool,
    pub error: Option<&'static str>,
}

impl From<OperationResult> for OperationOutcome {
    fn from(result: OperationResult) -> Self {
        match result {
            Ok(()) => Self { ok: true, error: None },
            Err(err) => Self {
                ok: false,
                error: Some(err.message()),
            },
        }
    }
}
