//! Register file
//!
//! Two independent fixed-size spaces: 256 × 32-bit and 256 × 64-bit words.
//! Index 5 in one space is unrelated to index 5 in the other. Words are opaque
//! bit patterns; float interpretation happens in the dispatcher.

use fpu_spec::{IndexOutOfRange, Word32, Word64, REGISTER_COUNT_32, REGISTER_COUNT_64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    reg32: [Word32; REGISTER_COUNT_32],
    reg64: [Word64; REGISTER_COUNT_64],
}

impl RegisterFile {
    /// Create a register file with every word cleared to zero
    pub fn new() -> Self {
        Self {
            reg32: [0; REGISTER_COUNT_32],
            reg64: [0; REGISTER_COUNT_64],
        }
    }

    /// Read a 32-bit word. Out-of-range indices read as absent.
    #[inline]
    pub fn read32(&self, index: usize) -> Option<Word32> {
        self.reg32.get(index).copied()
    }

    /// Read a 64-bit word. Out-of-range indices read as absent.
    #[inline]
    pub fn read64(&self, index: usize) -> Option<Word64> {
        self.reg64.get(index).copied()
    }

    /// Write a 32-bit word. Out-of-range writes change nothing.
    #[inline]
    pub fn write32(&mut self, index: usize, value: Word32) -> Result<(), IndexOutOfRange> {
        IndexOutOfRange::check(index, REGISTER_COUNT_32)?;
        self.reg32[index] = value;
        Ok(())
    }

    /// Write a 64-bit word. Out-of-range writes change nothing.
    #[inline]
    pub fn write64(&mut self, index: usize, value: Word64) -> Result<(), IndexOutOfRange> {
        IndexOutOfRange::check(index, REGISTER_COUNT_64)?;
        self.reg64[index] = value;
        Ok(())
    }

    /// Reset both spaces to zero
    pub fn clear(&mut self) {
        self.reg32.fill(0);
        self.reg64.fill(0);
    }

    pub fn words32(&self) -> &[Word32] {
        &self.reg32
    }

    pub fn words64(&self) -> &[Word64] {
        &self.reg64
    }

    /// Replace the 32-bit space. `words` must hold exactly 256 entries.
    pub(crate) fn load32(&mut self, words: &[Word32]) {
        self.reg32.copy_from_slice(words);
    }

    /// Replace the 64-bit space. `words` must hold exactly 256 entries.
    pub(crate) fn load64(&mut self, words: &[Word64]) {
        self.reg64.copy_from_slice(words);
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
