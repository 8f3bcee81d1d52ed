//! # Bus Transaction Types
//!
//! The bus carries byte-oriented transactions. Intent is inferred from the
//! direction and payload length; there is no separate address-space field.
//!
//! ```text
//! Direction  Payload   Meaning
//! ──────────────────────────────────────────────
//! Write      4 bytes   register32[address] := u32 (LE)
//! Write      8 bytes   register64[address] := u64 (LE)
//! Read       0 bytes   respond with register32[address] as 4 LE bytes
//! ```
//!
//! Every other combination is a protocol violation.

use crate::{Word32, Word64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction direction, as seen by the bus master
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusDirection {
    Read,
    Write,
}

impl fmt::Display for BusDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusDirection::Read => write!(f, "read"),
            BusDirection::Write => write!(f, "write"),
        }
    }
}

/// Interpretation of a transaction, derived from `{direction, payload length}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionShape {
    Write32(Word32),
    Write64(Word64),
    Read32,
    Unsupported { direction: BusDirection, length: usize },
}

/// One request from the bus master
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusTransaction {
    pub direction: BusDirection,
    pub address: u8,
    pub payload: Vec<u8>,
}

impl BusTransaction {
    pub fn new(direction: BusDirection, address: u8, payload: Vec<u8>) -> Self {
        Self {
            direction,
            address,
            payload,
        }
    }

    /// Read request (empty payload)
    pub fn read(address: u8) -> Self {
        Self::new(BusDirection::Read, address, Vec::new())
    }

    /// 32-bit write, payload little-endian
    pub fn write32(address: u8, word: Word32) -> Self {
        Self::new(BusDirection::Write, address, word.to_le_bytes().to_vec())
    }

    /// 64-bit write, payload little-endian
    pub fn write64(address: u8, word: Word64) -> Self {
        Self::new(BusDirection::Write, address, word.to_le_bytes().to_vec())
    }

    /// Classify by direction and payload length
    pub fn shape(&self) -> TransactionShape {
        match (self.direction, self.payload.len()) {
            (BusDirection::Write, 4) => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&self.payload);
                TransactionShape::Write32(Word32::from_le_bytes(bytes))
            }
            (BusDirection::Write, 8) => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&self.payload);
                TransactionShape::Write64(Word64::from_le_bytes(bytes))
            }
            (BusDirection::Read, 0) => TransactionShape::Read32,
            (direction, length) => TransactionShape::Unsupported { direction, length },
        }
    }
}

impl fmt::Display for BusTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{:#04x} [", self.direction, self.address)?;
        for (i, byte) in self.payload.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "]")
    }
}

/// Physical handshake lines. `busy` is active low on the pin; `true` here means busy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSignals {
    pub enable: bool,
    pub write: bool,
    pub busy: bool,
}
