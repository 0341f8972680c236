//! Ordered, append-only log of domain events for external observers.

use stakemod_types::{LoggedEvent, ModerationEvent, TxId};

/// Every event emitted by successful calls, in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the events of one call.
    pub fn append(&mut self, tx: TxId, events: &[ModerationEvent]) {
        for event in events {
            let seq = self.entries.len() as u64;
            self.entries.push(LoggedEvent {
                seq,
                tx,
                event: event.clone(),
            });
        }
    }

    #[must_use]
    pub fn events(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Events emitted by `tx`, in order.
    pub fn for_tx(&self, tx: TxId) -> impl Iterator<Item = &ModerationEvent> {
        self.entries
            .iter()
            .filter(move |e| e.tx == tx)
            .map(|e| &e.event)
    }

    #[must_use]
    pub fn last(&self) -> Option<&LoggedEvent> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
