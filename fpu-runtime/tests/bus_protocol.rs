//! Integration tests for the bus transaction protocol and poll loop
//!
//! Transactions are injected through `QueueBus` and resolved by
//! `SystemContext`, one at a time.

use fpu_runtime::{BusEvent, DropReason, QueueBus, RegisterSpace, SystemContext, TransactionOutcome};
use fpu_spec::{BusDirection, BusTransaction, OperationId, OperationRequest};

fn run(transactions: Vec<BusTransaction>) -> (SystemContext<QueueBus>, Vec<TransactionOutcome>) {
    let mut ctx = SystemContext::with_defaults(QueueBus::with_transactions(transactions));
    let mut outcomes = Vec::new();
    while let Some(outcome) = ctx.step() {
        outcomes.push(outcome);
    }
    (ctx, outcomes)
}

// ============================================================================
// Register Access
// ============================================================================

#[test]
fn test_write_then_read_float_one() {
    let (ctx, outcomes) = run(vec![
        BusTransaction::new(BusDirection::Write, 3, vec![0x00, 0x00, 0x80, 0x3F]),
        BusTransaction::read(3),
    ]);

    assert_eq!(ctx.registers().read32(3), Some(1.0f32.to_bits()));
    assert_eq!(
        outcomes,
        vec![
            TransactionOutcome::Written { space: RegisterSpace::Word32, address: 3 },
            TransactionOutcome::Responded { address: 3, data: vec![0x00, 0x00, 0x80, 0x3F] },
        ]
    );
    let responses = ctx.bus().responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].0, BusTransaction::read(3));
    assert_eq!(responses[0].1, vec![0x00, 0x00, 0x80, 0x3F]);
}

#[test]
fn test_read_of_cleared_register_is_zero() {
    let (ctx, _) = run(vec![BusTransaction::read(200)]);
    assert_eq!(ctx.bus().responses()[0].1, vec![0, 0, 0, 0]);
}

#[test]
fn test_write64_does_not_alias_word32() {
    let (ctx, _) = run(vec![
        BusTransaction::write64(10, u64::MAX),
        BusTransaction::read(10),
    ]);
    assert_eq!(ctx.registers().read64(10), Some(u64::MAX));
    assert_eq!(ctx.bus().responses()[0].1, vec![0, 0, 0, 0]);
}

// ============================================================================
// Malformed Transactions
// ============================================================================

#[test]
fn test_malformed_transactions_do_not_touch_state() {
    let (ctx, outcomes) = run(vec![
        BusTransaction::new(BusDirection::Write, 0, vec![0xFF; 2]),
        BusTransaction::new(BusDirection::Write, 0, vec![0xFF; 16]),
        BusTransaction::new(BusDirection::Read, 0, vec![0xFF; 4]),
    ]);

    assert!(outcomes.iter().all(TransactionOutcome::is_dropped));
    assert!(matches!(
        outcomes[1],
        TransactionOutcome::Dropped(DropReason::UnsupportedShape { direction: BusDirection::Write, length: 16 })
    ));
    assert_eq!(ctx.registers().read32(0), Some(0));
    assert_eq!(ctx.registers().read64(0), Some(0));
    assert!(ctx.bus().responses().is_empty());
    assert_eq!(ctx.stats().violations, 3);
}

#[test]
fn test_malformed_transaction_still_toggles_busy() {
    let (ctx, _) = run(vec![BusTransaction::new(BusDirection::Read, 1, vec![0; 8])]);
    assert_eq!(
        ctx.bus().events(),
        &[
            BusEvent::Polled(BusTransaction::new(BusDirection::Read, 1, vec![0; 8])),
            BusEvent::Busy(true),
            BusEvent::Busy(false),
        ]
    );
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_queued_transactions_resolve_in_order() {
    let mut transactions = Vec::new();
    for value in 0..8u32 {
        transactions.push(BusTransaction::write32(1, value));
        transactions.push(BusTransaction::read(1));
    }
    let (ctx, _) = run(transactions);

    // Each read observes the write issued just before it
    let observed: Vec<u32> = ctx
        .bus()
        .responses()
        .iter()
        .map(|(_, data)| u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
        .collect();
    assert_eq!(observed, (0..8).collect::<Vec<_>>());
}

#[test]
fn test_one_transaction_per_step() {
    let mut ctx = SystemContext::with_defaults(QueueBus::with_transactions([
        BusTransaction::write32(0, 1),
        BusTransaction::write32(0, 2),
    ]));
    ctx.step();
    assert_eq!(ctx.registers().read32(0), Some(1));
    assert_eq!(ctx.bus().pending(), 1);
    ctx.step();
    assert_eq!(ctx.registers().read32(0), Some(2));
    assert!(ctx.step().is_none());
}

#[test]
fn test_busy_is_false_outside_transactions() {
    let mut ctx = SystemContext::with_defaults(QueueBus::with_transactions([BusTransaction::read(0)]));
    assert!(!ctx.bus().signals().busy);
    ctx.step();
    assert!(!ctx.bus().signals().busy);
    ctx.step();
    assert!(!ctx.bus().signals().busy);
}

// ============================================================================
// Bus + Dispatcher
// ============================================================================

#[test]
fn test_compute_over_bus() {
    let mut ctx = SystemContext::with_defaults(QueueBus::with_transactions([
        BusTransaction::write32(0, 1.5f32.to_bits()),
        BusTransaction::write32(1, 2.5f32.to_bits()),
    ]));
    ctx.run_until_idle();

    ctx.execute(&OperationRequest::new(OperationId::Add32, 2, 0, 1)).unwrap();

    ctx.bus_mut().push(BusTransaction::read(2));
    ctx.run_until_idle();
    assert_eq!(ctx.bus().responses()[0].1, 4.0f32.to_le_bytes().to_vec());
}
