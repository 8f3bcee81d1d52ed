//! Coprocessor state snapshots
//!
//! A snapshot holds both register spaces and every opcode slot. It is encoded
//! with bincode.

use crate::error::Result;
use crate::opcode_store::OpcodeStore;
use crate::registers::RegisterFile;
use fpu_spec::{FpuError, OpcodeRecord, Word32, Word64, OPCODE_SLOTS, REGISTER_COUNT_32, REGISTER_COUNT_64};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub reg32: Vec<Word32>,
    pub reg64: Vec<Word64>,
    pub opcodes: Vec<OpcodeRecord>,
}

impl Snapshot {
    pub fn capture(registers: &RegisterFile, opcodes: &OpcodeStore) -> Self {
        Self {
            reg32: registers.words32().to_vec(),
            reg64: registers.words64().to_vec(),
            opcodes: opcodes.records().to_vec(),
        }
    }

    /// Check every section has exactly its storage capacity
    pub fn validate(&self) -> Result<()> {
        check_len("reg32", REGISTER_COUNT_32, self.reg32.len())?;
        check_len("reg64", REGISTER_COUNT_64, self.reg64.len())?;
        check_len("opcodes", OPCODE_SLOTS, self.opcodes.len())?;
        Ok(())
    }

    /// Write into live storage. Validates first; on error nothing is changed.
    pub fn apply(&self, registers: &mut RegisterFile, opcodes: &mut OpcodeStore) -> Result<()> {
        self.validate()?;
        registers.load32(&self.reg32);
        registers.load64(&self.reg64);
        opcodes.load(&self.opcodes);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(FpuError::SnapshotMismatch { what, expected, found }.into())
    }
}
