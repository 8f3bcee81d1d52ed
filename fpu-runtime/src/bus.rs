//! Bus collaborators
//!
//! The coprocessor needs three touchpoints from the hardware bus layer: a
//! transaction source, a response sink, and the busy line. Any transport with
//! this shape is interchangeable.

use fpu_spec::{BusDirection, BusSignals, BusTransaction};
use std::collections::VecDeque;

pub trait Bus {
    /// Next pending transaction, if any
    fn poll(&mut self) -> Option<BusTransaction>;

    /// Send response bytes for `transaction` back to the master
    fn respond(&mut self, transaction: &BusTransaction, data: &[u8]);

    /// Drive the busy handshake line
    fn set_busy(&mut self, busy: bool);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn poll(&mut self) -> Option<BusTransaction> {
        (**self).poll()
    }

    fn respond(&mut self, transaction: &BusTransaction, data: &[u8]) {
        (**self).respond(transaction, data)
    }

    fn set_busy(&mut self, busy: bool) {
        (**self).set_busy(busy)
    }
}

/// A bus with nothing attached. Never yields a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBus;

impl Bus for NullBus {
    fn poll(&mut self) -> Option<BusTransaction> {
        None
    }

    fn respond(&mut self, _transaction: &BusTransaction, _data: &[u8]) {}

    fn set_busy(&mut self, _busy: bool) {}
}

/// Observable bus activity, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Polled(BusTransaction),
    Busy(bool),
    Responded { address: u8, data: Vec<u8> },
}

/// Simulated bus backed by a FIFO of injected transactions
#[derive(Debug, Clone, Default)]
pub struct QueueBus {
    pending: VecDeque<BusTransaction>,
    responses: Vec<(BusTransaction, Vec<u8>)>,
    signals: BusSignals,
    events: Vec<BusEvent>,
}

impl QueueBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = BusTransaction>) -> Self {
        QueueBus {
            pending: transactions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queue a transaction behind any already pending
    pub fn push(&mut self, transaction: BusTransaction) {
        self.pending.push_back(transaction);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn signals(&self) -> BusSignals {
        self.signals
    }

    pub fn responses(&self) -> &[(BusTransaction, Vec<u8>)] {
        &self.responses
    }

    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    pub fn take_responses(&mut self) -> Vec<(BusTransaction, Vec<u8>)> {
        std::mem::take(&mut self.responses)
    }

    pub fn take_events(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Bus for QueueBus {
    fn poll(&mut self) -> Option<BusTransaction> {
        let transaction = self.pending.pop_front()?;
        self.signals.enable = true;
        self.signals.write = transaction.direction == BusDirection::Write;
        self.events.push(BusEvent::Polled(transaction.clone()));
        Some(transaction)
    }

    fn respond(&mut self, transaction: &BusTransaction, data: &[u8]) {
        self.events.push(BusEvent::Responded {
            address: transaction.address,
            data: data.to_vec(),
        });
        self.responses.push((transaction.clone(), data.to_vec()));
    }

    fn set_busy(&mut self, busy: bool) {
        self.signals.busy = busy;
        if !busy {
            self.signals.enable = false;
            self.signals.write = false;
        }
        self.events.push(BusEvent::Busy(busy));
    }
}
