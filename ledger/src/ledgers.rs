//! Local replicas of the two maps whose roots the mixer holds.
//!
//! Replicas are rebuilt from the event log and only ever used to produce
//! witnesses; the roots held by [`crate::MixerState`] are authoritative.

use mixer_cl::{
    ds::sparse_merkle::{self, SparseMerkleMap, Value},
    DenominationTier, NoteCommitment, NullifierHash, Witness,
};

use crate::events::Event;

/// commitment ledger value of a commitment that was never deposited
pub const NOT_DEPOSITED: Value = 0;

pub const UNSPENT: Value = 0;
pub const SPENT: Value = 1;

/// commitment -> denomination tag (0 when absent)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitmentLedger {
    map: SparseMerkleMap,
}

impl CommitmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut ledger = Self::new();
        for event in events {
            ledger.apply(event);
        }
        ledger
    }

    /// Replays a deposit event; other events are ignored.
    pub fn apply(&mut self, event: &Event) {
        if let Event::Deposit { commitment, tier } = event {
            self.insert(*commitment, *tier);
        }
    }

    pub fn insert(&mut self, commitment: NoteCommitment, tier: DenominationTier) {
        self.map.set(commitment.0, tier.tag());
    }

    pub fn tier(&self, commitment: &NoteCommitment) -> Option<DenominationTier> {
        DenominationTier::try_from(self.map.get(commitment.as_bytes())).ok()
    }

    pub fn witness(&self, commitment: &NoteCommitment) -> Witness {
        self.map.witness(commitment.as_bytes())
    }

    pub fn root(&self) -> [u8; 32] {
        self.map.root()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// nullifier hash -> spent flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullifierLedger {
    map: SparseMerkleMap,
}

impl NullifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut ledger = Self::new();
        for event in events {
            ledger.apply(event);
        }
        ledger
    }

    /// Replays a withdraw event; other events are ignored.
    pub fn apply(&mut self, event: &Event) {
        if let Event::Withdraw { nullifier_hash } = event {
            self.mark_spent(*nullifier_hash);
        }
    }

    pub fn mark_spent(&mut self, nullifier_hash: NullifierHash) {
        self.map.set(nullifier_hash.0, SPENT);
    }

    pub fn is_spent(&self, nullifier_hash: &NullifierHash) -> bool {
        self.map.get(nullifier_hash.as_bytes()) == SPENT
    }

    pub fn witness(&self, nullifier_hash: &NullifierHash) -> Witness {
        self.map.witness(nullifier_hash.as_bytes())
    }

    pub fn root(&self) -> [u8; 32] {
        self.map.root()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Root shared by both ledgers before anything happened.
pub fn empty_root() -> [u8; 32] {
    sparse_merkle::empty_root()
}

#[cfg(test)]
mod test {
    use super::*;
    use mixer_cl::{DepositNote, Lock};

    #[test]
    fn test_replay_ignores_other_event_kinds() {
        let mut rng = rand::thread_rng();
        let note = DepositNote::new(0, DenominationTier::Two, Lock::Unlocked, &mut rng);

        let events = [
            Event::Deposit {
                commitment: note.commit(),
                tier: note.tier,
            },
            Event::Withdraw {
                nullifier_hash: note.nullifier_hash(),
            },
        ];

        let commitments = CommitmentLedger::from_events(&events);
        assert_eq!(commitments.len(), 1);
        assert_eq!(commitments.tier(&note.commit()), Some(DenominationTier::Two));

        let nullifiers = NullifierLedger::from_events(&events);
        assert_eq!(nullifiers.len(), 1);
        assert!(nullifiers.is_spent(&note.nullifier_hash()));
    }

    #[test]
    fn test_empty_ledgers_share_root() {
        assert_eq!(CommitmentLedger::new().root(), empty_root());
        assert_eq!(NullifierLedger::new().root(), empty_root());
        assert!(CommitmentLedger::new().is_empty());
    }
}
