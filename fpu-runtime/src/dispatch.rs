//! Operation dispatch for the FPU coprocessor
//!
//! Each operation reads its sources, reinterprets the stored bit patterns as
//! IEEE-754 values, computes, and writes the result's bit pattern to exactly
//! one destination register. Division by zero and NaN are data, not errors.

use crate::registers::RegisterFile;
use fpu_spec::{OperationError, OperationId, OperationRequest, OperationResult, RegisterIndex};

/// Arithmetic unit bound to one register file for its lifetime
#[derive(Debug)]
pub struct OperationDispatcher<'a> {
    registers: &'a mut RegisterFile,
}

impl<'a> OperationDispatcher<'a> {
    pub fn new(registers: &'a mut RegisterFile) -> Self {
        Self { registers }
    }

    /// Execute single operation
    pub fn execute(&mut self, request: &OperationRequest) -> OperationResult {
        let result = match request.id {
            // ========== Single precision (32-bit space) ==========
            OperationId::Add32 => self.binary32(request, |a, b| a + b),
            OperationId::Sub32 => self.binary32(request, |a, b| a - b),
            OperationId::Mul32 => self.binary32(request, |a, b| a * b),
            OperationId::Div32 => self.binary32(request, |a, b| a / b),

            // ========== Double precision (64-bit space) ==========
            OperationId::Add64 => self.binary64(request, |a, b| a + b),
            OperationId::Sub64 => self.binary64(request, |a, b| a - b),
            OperationId::Mul64 => self.binary64(request, |a, b| a * b),
            OperationId::Div64 => self.binary64(request, |a, b| a / b),

            // Unary: source1 is never read
            OperationId::Sine64 => self.unary64(request, f64::sin),
            OperationId::Cosine64 => self.unary64(request, f64::cos),
            OperationId::Tangent64 => self.unary64(request, f64::tan),
            OperationId::SquareRoot64 => self.unary64(request, f64::sqrt),
        };

        match result {
            Ok(()) => tracing::trace!(op = %request, "operation complete"),
            Err(err) => tracing::debug!(op = %request, error = %err, "operation failed"),
        }
        result
    }

    /// Execute an operation given as a raw identifier byte.
    ///
    /// Identifiers outside the twelve known operations fail with
    /// [`OperationError::UnsupportedOperation`] and touch no register.
    pub fn execute_raw(
        &mut self,
        id: u8,
        destination: RegisterIndex,
        source0: RegisterIndex,
        source1: RegisterIndex,
    ) -> OperationResult {
        let id = OperationId::from_u8(id).ok_or(OperationError::UnsupportedOperation)?;
        self.execute(&OperationRequest::new(id, destination, source0, source1))
    }

    fn binary32(&mut self, request: &OperationRequest, op: impl FnOnce(f32, f32) -> f32) -> OperationResult {
        let a = self.load_f32(request.source0)?;
        let b = self.load_f32(request.source1)?;
        self.store_f32(request.destination, op(a, b))
    }

    fn binary64(&mut self, request: &OperationRequest, op: impl FnOnce(f64, f64) -> f64) -> OperationResult {
        let a = self.load_f64(request.source0)?;
        let b = self.load_f64(request.source1)?;
        self.store_f64(request.destination, op(a, b))
    }

    fn unary64(&mut self, request: &OperationRequest, op: impl FnOnce(f64) -> f64) -> OperationResult {
        let a = self.load_f64(request.source0)?;
        self.store_f64(request.destination, op(a))
    }

    #[inline]
    fn load_f32(&self, index: RegisterIndex) -> Result<f32, OperationError> {
        self.registers
            .read32(index)
            .map(f32::from_bits)
            .ok_or(OperationError::SourceOutOfRange)
    }

    #[inline]
    fn load_f64(&self, index: RegisterIndex) -> Result<f64, OperationError> {
        self.registers
            .read64(index)
            .map(f64::from_bits)
            .ok_or(OperationError::SourceOutOfRange)
    }

    #[inline]
    fn store_f32(&mut self, index: RegisterIndex, value: f32) -> OperationResult {
        self.registers
            .write32(index, value.to_bits())
            .map_err(|_| OperationError::DestinationOutOfRange)
    }

    #[inline]
    fn store_f64(&mut self, index: RegisterIndex, value: f64) -> OperationResult {
        self.registers
            .write64(index, value.to_bits())
            .map_err(|_| OperationError::DestinationOutOfRange)
    }
}
