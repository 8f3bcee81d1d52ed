//! Script runner: feeds a parsed script through a coprocessor on a queue bus

use crate::parser::{Command, Script};
use fpu_runtime::{QueueBus, RuntimeError, SlotExecution, SystemContext, TransactionOutcome};
use fpu_spec::{BusTransaction, IndexOutOfRange, OpcodeRecord, OperationId, OperationRequest, OperationResult};
use std::fmt;

/// What one script command did
#[derive(Debug)]
pub enum Report {
    Bus {
        transaction: BusTransaction,
        outcome: TransactionOutcome,
    },
    Opcode {
        slot: usize,
        record: OpcodeRecord,
        result: Result<(), IndexOutOfRange>,
    },
    Operation {
        request: OperationRequest,
        result: OperationResult,
        /// Destination contents after a successful operation
        value: Option<f64>,
    },
    Slot {
        slot: usize,
        op: OperationId,
        result: Result<SlotExecution, RuntimeError>,
    },
    Reset,
}

impl Report {
    /// Whether the command failed or its transaction was dropped
    pub fn is_failure(&self) -> bool {
        match self {
            Report::Bus { outcome, .. } => outcome.is_dropped(),
            Report::Opcode { result, .. } => result.is_err(),
            Report::Operation { result, .. } => result.is_err(),
            Report::Slot { result, .. } => !matches!(result, Ok(SlotExecution::Executed(Ok(())))),
            Report::Reset => false,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Bus { transaction, outcome } => {
                write!(f, "{} -> ", transaction)?;
                match outcome {
                    TransactionOutcome::Written { space, address } => write!(f, "{}[{}]", space, address),
                    TransactionOutcome::Responded { data, .. } => {
                        for (i, byte) in data.iter().enumerate() {
                            if i > 0 {
                                write!(f, " ")?;
                            }
                            write!(f, "{:02x}", byte)?;
                        }
                        if let Ok(bytes) = <[u8; 4]>::try_from(data.as_slice()) {
                            write!(f, " ({})", f32::from_bits(u32::from_le_bytes(bytes)))?;
                        }
                        Ok(())
                    }
                    TransactionOutcome::Dropped(reason) => write!(f, "dropped: {}", reason),
                }
            }
            Report::Opcode { slot, record, result } => match result {
                Ok(()) => write!(f, "opcode[{}] <- {}", slot, record),
                Err(err) => write!(f, "opcode[{}] rejected: {}", slot, err),
            },
            Report::Operation { request, result, value } => match (result, value) {
                (Ok(()), Some(value)) => write!(f, "{} -> {}", request, value),
                (Ok(()), None) => write!(f, "{} -> ok", request),
                (Err(err), _) => write!(f, "{} -> error: {}", request, err),
            },
            Report::Slot { slot, op, result } => match result {
                Ok(SlotExecution::Executed(Ok(()))) => write!(f, "slot {} as {} -> ok", slot, op),
                Ok(SlotExecution::Executed(Err(err))) => {
                    write!(f, "slot {} as {} -> error: {}", slot, op, err)
                }
                Ok(SlotExecution::Skipped(kind)) => write!(f, "slot {} as {} -> skipped {}", slot, op, kind),
                Err(err) => write!(f, "slot {} as {} -> error: {}", slot, op, err),
            },
            Report::Reset => write!(f, "reset"),
        }
    }
}

/// A report with the script line that produced it
#[derive(Debug)]
pub struct ReportLine {
    pub line: usize,
    pub report: Report,
}

/// Run every command in order.
///
/// Bus commands are queued and resolved through the poll path, so busy
/// signalling and statistics behave exactly as for a live master.
/// Transactions already pending on the bus are resolved first.
pub fn run_script(script: &Script, ctx: &mut SystemContext<QueueBus>) -> Vec<ReportLine> {
    let mut reports = Vec::with_capacity(script.len());
    for line in &script.lines {
        let report = match &line.command {
            Command::Transaction(transaction) => {
                ctx.bus_mut().push(transaction.clone());
                let mut outcome = None;
                while ctx.bus().pending() > 0 {
                    outcome = ctx.step();
                }
                match outcome {
                    Some(outcome) => Report::Bus {
                        transaction: transaction.clone(),
                        outcome,
                    },
                    None => continue,
                }
            }
            Command::Opcode { slot, record } => Report::Opcode {
                slot: *slot,
                record: *record,
                result: ctx.opcodes_mut().write(*slot, *record),
            },
            Command::Execute(request) => {
                let result = ctx.execute(request);
                let value = result.ok().and_then(|()| destination_value(ctx, request));
                Report::Operation {
                    request: *request,
                    result,
                    value,
                }
            }
            Command::ExecuteSlot { slot, op } => Report::Slot {
                slot: *slot,
                op: *op,
                result: ctx.execute_slot(*slot, *op),
            },
            Command::Reset => {
                ctx.reset();
                Report::Reset
            }
        };
        tracing::debug!(line = line.line, %report, "script command");
        reports.push(ReportLine {
            line: line.line,
            report,
        });
    }
    reports
}

/// Read back the destination of `request` from the register space it targets
fn destination_value(ctx: &SystemContext<QueueBus>, request: &OperationRequest) -> Option<f64> {
    let registers = ctx.registers();
    if request.id.is_single() {
        registers
            .read32(request.destination)
            .map(|bits| f64::from(f32::from_bits(bits)))
    } else {
        registers.read64(request.destination).map(f64::from_bits)
    }
}
