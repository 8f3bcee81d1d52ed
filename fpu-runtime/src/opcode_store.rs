//! Opcode store: 1024 fixed slots of opcode records

use fpu_spec::{IndexOutOfRange, OpcodeRecord, OPCODE_SLOTS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeStore {
    slots: [OpcodeRecord; OPCODE_SLOTS],
}

impl OpcodeStore {
    /// Create a store with every slot set to NOP
    pub fn new() -> Self {
        Self {
            slots: [OpcodeRecord::NOP; OPCODE_SLOTS],
        }
    }

    /// Overwrite a slot. Out-of-range indices are rejected, never clamped.
    pub fn write(&mut self, index: usize, record: OpcodeRecord) -> Result<(), IndexOutOfRange> {
        IndexOutOfRange::check(index, OPCODE_SLOTS)?;
        self.slots[index] = record;
        Ok(())
    }

    pub fn read(&self, index: usize) -> Option<OpcodeRecord> {
        self.slots.get(index).copied()
    }

    /// Reset every slot to NOP
    pub fn clear(&mut self) {
        self.slots.fill(OpcodeRecord::NOP);
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        OPCODE_SLOTS
    }

    pub fn records(&self) -> &[OpcodeRecord] {
        &self.slots
    }

    /// Slots holding something other than NOP, with their indices
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &OpcodeRecord)> {
        self.slots.iter().enumerate().filter(|(_, r)| !r.is_nop())
    }

    /// Replace every slot. `records` must hold exactly 1024 entries.
    pub(crate) fn load(&mut self, records: &[OpcodeRecord]) {
        self.slots.copy_from_slice(records);
    }
}

impl Default for OpcodeStore {
    fn default() -> Self {
        Self::new()
    }
}
