use mixer_cl::{DenominationTier, NoteCommitment, NullifierHash};
use serde::{Deserialize, Serialize};

/// What the mixer publishes so anyone can rebuild the ledgers and produce witnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Deposit {
        commitment: NoteCommitment,
        tier: DenominationTier,
    },
    Withdraw {
        nullifier_hash: NullifierHash,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deposit,
    Withdraw,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Deposit { .. } => EventKind::Deposit,
            Event::Withdraw { .. } => EventKind::Withdraw,
        }
    }
}

/// Append-only log, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn fetch(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.kind() == kind)
            .copied()
            .collect()
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
