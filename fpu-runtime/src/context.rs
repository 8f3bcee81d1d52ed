//! System context: one coprocessor instance and its poll loop

use crate::bus::Bus;
use crate::dispatch::OperationDispatcher;
use crate::error::Result;
use crate::opcode_store::OpcodeStore;
use crate::protocol::{handle_transaction, DropReason, TransactionOutcome};
use crate::registers::RegisterFile;
use crate::snapshot::Snapshot;
use fpu_spec::{
    BusTransaction, CoprocessorConfig, IndexOutOfRange, OpcodeKind, OperationId, OperationRequest,
    OperationResult, OPCODE_SLOTS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Counters for everything the poll loop and dispatcher resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Transactions taken from the bus
    pub polled: u64,
    /// Reads answered with data
    pub responded: u64,
    /// Register writes applied
    pub written: u64,
    /// Transactions that produced no effect and no response
    pub dropped: u64,
    /// Dropped for an unsupported shape (strict protocol only)
    pub violations: u64,
    /// Operations dispatched through the context
    pub operations: u64,
    /// Dispatched operations that failed
    pub failed_operations: u64,
}

/// What running an opcode slot did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotExecution {
    /// The slot held EXECUTE_OP and was dispatched
    Executed(OperationResult),
    /// The slot held a kind with no execution semantics
    Skipped(OpcodeKind),
}

/// Register file, opcode store, and the bus they answer on
#[derive(Debug)]
pub struct SystemContext<B: Bus> {
    registers: RegisterFile,
    opcodes: OpcodeStore,
    bus: B,
    config: CoprocessorConfig,
    stats: BusStats,
}

impl<B: Bus> SystemContext<B> {
    /// Create a coprocessor with cleared storage
    pub fn new(bus: B, config: CoprocessorConfig) -> Result<Self> {
        config.validate().map_err(fpu_spec::FpuError::from)?;
        Ok(Self {
            registers: RegisterFile::new(),
            opcodes: OpcodeStore::new(),
            bus,
            config,
            stats: BusStats::default(),
        })
    }

    pub fn with_defaults(bus: B) -> Self {
        Self {
            registers: RegisterFile::new(),
            opcodes: OpcodeStore::new(),
            bus,
            config: CoprocessorConfig::DEFAULT,
            stats: BusStats::default(),
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn opcodes(&self) -> &OpcodeStore {
        &self.opcodes
    }

    pub fn opcodes_mut(&mut self) -> &mut OpcodeStore {
        &mut self.opcodes
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    pub fn config(&self) -> &CoprocessorConfig {
        &self.config
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Dispatcher bound to this context's register file
    pub fn dispatcher(&mut self) -> OperationDispatcher<'_> {
        OperationDispatcher::new(&mut self.registers)
    }

    /// Dispatch one operation and count it
    pub fn execute(&mut self, request: &OperationRequest) -> OperationResult {
        let result = self.dispatcher().execute(request);
        self.stats.operations += 1;
        if let Err(err) = result {
            self.stats.failed_operations += 1;
            tracing::warn!(op = %request, error = %err, "operation failed");
        }
        result
    }

    /// Run the EXECUTE_OP record in `slot` as operation `op`.
    ///
    /// Records carry registers only, so the caller names the operation.
    /// Other kinds are skipped.
    pub fn execute_slot(&mut self, slot: usize, op: OperationId) -> Result<SlotExecution> {
        let record = self.opcodes.read(slot).ok_or(IndexOutOfRange {
            index: slot,
            capacity: OPCODE_SLOTS,
        })?;
        match record.operation_request(op) {
            Some(request) => Ok(SlotExecution::Executed(self.execute(&request))),
            None => {
                tracing::debug!(slot, kind = %record.kind, "slot not executable");
                Ok(SlotExecution::Skipped(record.kind))
            }
        }
    }

    /// Clear registers, opcode slots, and counters
    pub fn reset(&mut self) {
        self.registers.clear();
        self.opcodes.clear();
        self.stats = BusStats::default();
        tracing::info!("coprocessor reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.registers, &self.opcodes)
    }

    /// Load a snapshot. On error the current state is kept.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        snapshot.apply(&mut self.registers, &mut self.opcodes)
    }

    /// One loop iteration: poll, and if a transaction is pending, resolve it
    /// with busy asserted. Does not sleep.
    pub fn step(&mut self) -> Option<TransactionOutcome> {
        let transaction = self.bus.poll()?;
        self.stats.polled += 1;
        tracing::trace!(tx = %transaction, "transaction polled");

        self.bus.set_busy(true);
        let outcome = handle_transaction(&mut self.registers, &mut self.bus, &transaction);
        self.bus.set_busy(false);

        self.record(&transaction, &outcome);
        Some(outcome)
    }

    /// Resolve transactions until the bus has none pending or the budget is spent.
    /// Returns the number handled.
    pub fn run_until_idle(&mut self) -> u64 {
        let mut handled = 0;
        while !self.budget_spent(handled) {
            if self.step().is_none() {
                break;
            }
            handled += 1;
        }
        handled
    }

    /// Poll until `stop` is set or the budget is spent, yielding `poll_interval`
    /// between iterations. Returns the number of transactions handled.
    pub fn run(&mut self, stop: &AtomicBool) -> u64 {
        let mut handled = 0;
        tracing::info!(config = %self.config, "bus loop started");
        while !stop.load(Ordering::Relaxed) && !self.budget_spent(handled) {
            if self.step().is_some() {
                handled += 1;
            }
            if !self.config.poll_interval.is_zero() {
                thread::sleep(self.config.poll_interval);
            }
        }
        tracing::info!(handled, "bus loop stopped");
        handled
    }

    fn budget_spent(&self, handled: u64) -> bool {
        self.config
            .max_transactions_per_run
            .map_or(false, |limit| handled >= limit)
    }

    fn record(&mut self, transaction: &BusTransaction, outcome: &TransactionOutcome) {
        match outcome {
            TransactionOutcome::Written { space, address } => {
                self.stats.written += 1;
                tracing::debug!(%space, address, "register written");
            }
            TransactionOutcome::Responded { address, .. } => {
                self.stats.responded += 1;
                tracing::debug!(address, "register read");
            }
            TransactionOutcome::Dropped(reason) => {
                self.stats.dropped += 1;
                match reason {
                    DropReason::UnsupportedShape { .. } if self.config.strict_protocol => {
                        self.stats.violations += 1;
                        tracing::warn!(tx = %transaction, %reason, "transaction dropped");
                    }
                    _ => tracing::debug!(tx = %transaction, %reason, "transaction dropped"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusEvent, NullBus, QueueBus};
    use fpu_spec::{BusDirection, ConfigError, FpuError, OpcodeRecord, OperationError};
    use std::time::Duration;

    fn context(transactions: Vec<BusTransaction>) -> SystemContext<QueueBus> {
        SystemContext::with_defaults(QueueBus::with_transactions(transactions))
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = CoprocessorConfig {
            max_transactions_per_run: Some(0),
            ..CoprocessorConfig::DEFAULT
        };
        let err = SystemContext::new(NullBus, config).unwrap_err();
        assert!(matches!(
            err,
            crate::RuntimeError::Coprocessor(FpuError::InvalidConfig(ConfigError::ZeroTransactionBudget))
        ));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_step_traces_each_poll() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut ctx = context(vec![BusTransaction::write32(4, 1), BusTransaction::read(4)]);
        tracing::subscriber::with_default(subscriber, || {
            ctx.run_until_idle();
        });

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("transaction polled").count(), 2);
        assert!(text.contains("write @0x04 [01 00 00 00]"));
    }

    #[test]
    fn test_step_without_transaction() {
        let mut ctx = SystemContext::with_defaults(NullBus);
        assert!(ctx.step().is_none());
        assert_eq!(ctx.stats(), BusStats::default());
    }

    #[test]
    fn test_busy_brackets_each_transaction() {
        let mut ctx = context(vec![
            BusTransaction::write32(0, 42),
            BusTransaction::read(0),
            BusTransaction::new(BusDirection::Read, 0, vec![0; 8]),
        ]);
        assert_eq!(ctx.run_until_idle(), 3);

        let events = ctx.bus_mut().take_events();
        let mut busy = false;
        let mut polled = 0;
        for event in &events {
            match event {
                BusEvent::Polled(_) => {
                    assert!(!busy, "polled while busy");
                    polled += 1;
                }
                BusEvent::Busy(state) => {
                    assert_ne!(*state, busy);
                    busy = *state;
                }
                BusEvent::Responded { .. } => assert!(busy, "responded while idle"),
            }
        }
        assert!(!busy);
        assert_eq!(polled, 3);
        assert!(!ctx.bus().signals().busy);
    }

    #[test]
    fn test_stats() {
        let mut ctx = context(vec![
            BusTransaction::write32(1, 1),
            BusTransaction::write64(1, 2),
            BusTransaction::read(1),
            BusTransaction::new(BusDirection::Write, 1, vec![0; 3]),
        ]);
        ctx.run_until_idle();
        assert_eq!(
            ctx.stats(),
            BusStats {
                polled: 4,
                responded: 1,
                written: 2,
                dropped: 1,
                violations: 1,
                operations: 0,
                failed_operations: 0,
            }
        );
    }

    #[test]
    fn test_lenient_protocol_does_not_count_violations() {
        let config = CoprocessorConfig {
            strict_protocol: false,
            ..CoprocessorConfig::DEFAULT
        };
        let bus = QueueBus::with_transactions([BusTransaction::new(BusDirection::Read, 0, vec![1])]);
        let mut ctx = SystemContext::new(bus, config).unwrap();
        ctx.run_until_idle();
        assert_eq!(ctx.stats().dropped, 1);
        assert_eq!(ctx.stats().violations, 0);
    }

    #[test]
    fn test_budget_limits_run_until_idle() {
        let config = CoprocessorConfig {
            max_transactions_per_run: Some(2),
            ..CoprocessorConfig::DEFAULT
        };
        let bus = QueueBus::with_transactions((0..5).map(BusTransaction::read));
        let mut ctx = SystemContext::new(bus, config).unwrap();
        assert_eq!(ctx.run_until_idle(), 2);
        assert_eq!(ctx.bus().pending(), 3);
    }

    #[test]
    fn test_run_stops_on_budget() {
        let config = CoprocessorConfig {
            poll_interval: Duration::ZERO,
            max_transactions_per_run: Some(3),
            ..CoprocessorConfig::DEFAULT
        };
        let bus = QueueBus::with_transactions((0..3).map(BusTransaction::read));
        let mut ctx = SystemContext::new(bus, config).unwrap();
        let stop = AtomicBool::new(false);
        assert_eq!(ctx.run(&stop), 3);
    }

    #[test]
    fn test_run_stops_on_flag() {
        let mut ctx = context(vec![BusTransaction::read(0)]);
        let stop = AtomicBool::new(true);
        assert_eq!(ctx.run(&stop), 0);
        assert_eq!(ctx.bus().pending(), 1);
    }

    #[test]
    fn test_execute_counts() {
        let mut ctx = SystemContext::with_defaults(NullBus);
        ctx.registers_mut().write32(0, 1.5f32.to_bits()).unwrap();
        ctx.registers_mut().write32(1, 2.5f32.to_bits()).unwrap();

        let ok = ctx.execute(&OperationRequest::new(OperationId::Add32, 2, 0, 1));
        assert_eq!(ok, Ok(()));
        let bad = ctx.execute(&OperationRequest::new(OperationId::Add32, 2, 0, 256));
        assert_eq!(bad, Err(OperationError::SourceOutOfRange));

        assert_eq!(ctx.registers().read32(2), Some(4.0f32.to_bits()));
        assert_eq!(ctx.stats().operations, 2);
        assert_eq!(ctx.stats().failed_operations, 1);
    }

    #[test]
    fn test_execute_slot() {
        let mut ctx = SystemContext::with_defaults(NullBus);
        ctx.registers_mut().write64(1, 2.0f64.to_bits()).unwrap();
        ctx.registers_mut().write64(2, 8.0f64.to_bits()).unwrap();
        ctx.opcodes_mut().write(7, OpcodeRecord::execute(3, 1, 2)).unwrap();

        let result = ctx.execute_slot(7, OperationId::Mul64).unwrap();
        assert_eq!(result, SlotExecution::Executed(Ok(())));
        assert_eq!(ctx.registers().read64(3), Some(16.0f64.to_bits()));

        let skipped = ctx.execute_slot(8, OperationId::Mul64).unwrap();
        assert_eq!(skipped, SlotExecution::Skipped(OpcodeKind::Nop));

        assert!(ctx.execute_slot(1024, OperationId::Mul64).is_err());
    }

    #[test]
    fn test_reset() {
        let mut ctx = context(vec![BusTransaction::write32(9, 9)]);
        ctx.run_until_idle();
        ctx.opcodes_mut().write(0, OpcodeRecord::execute(1, 1, 1)).unwrap();

        ctx.reset();
        assert_eq!(ctx.registers(), &RegisterFile::new());
        assert_eq!(ctx.opcodes(), &OpcodeStore::new());
        assert_eq!(ctx.stats(), BusStats::default());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut ctx = context(vec![BusTransaction::write64(4, 0xABCD)]);
        ctx.run_until_idle();
        let snapshot = ctx.snapshot();

        let mut other = SystemContext::with_defaults(NullBus);
        other.restore(&snapshot).unwrap();
        assert_eq!(other.registers().read64(4), Some(0xABCD));
    }
}
