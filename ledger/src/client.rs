//! What a depositor or withdrawer runs on their own machine: keep replicas of
//! both ledgers in step with the event log and build calls from them.

use mixer_cl::{DenominationTier, DepositNote, Lock, Nonce};
use rand_core::RngCore;
use tracing::debug;

use crate::{
    call::{DepositCall, WithdrawCall},
    events::EventLog,
    ledgers::{CommitmentLedger, NullifierLedger},
    state::MixerState,
};

#[derive(Debug, Clone, Default)]
pub struct LocalLedgers {
    pub commitments: CommitmentLedger,
    pub nullifiers: NullifierLedger,
    /// number of events already replayed
    synced: usize,
}

impl LocalLedgers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(log: &EventLog) -> Self {
        let mut ledgers = Self::new();
        ledgers.sync(log);
        ledgers
    }

    /// Replays the events emitted since the last sync.
    pub fn sync(&mut self, log: &EventLog) {
        let fresh = log.all().get(self.synced..).unwrap_or_default();
        for event in fresh {
            self.commitments.apply(event);
            self.nullifiers.apply(event);
        }
        self.synced += fresh.len();
        debug!(
            replayed = fresh.len(),
            total = self.synced,
            "local ledgers synced"
        );
    }

    pub fn matches(&self, state: &MixerState) -> bool {
        self.commitments.root() == state.commitment_root()
            && self.nullifiers.root() == state.nullifier_root()
    }
}

/// Draws a fresh note for `nonce` (the depositor's current account nonce) and
/// the deposit call for it.
pub fn prepare_deposit(
    rng: impl RngCore,
    nonce: Nonce,
    tier: DenominationTier,
    lock: Lock,
    commitments: &CommitmentLedger,
) -> (DepositNote, DepositCall) {
    let note = DepositNote::new(nonce, tier, lock, rng);
    let commitment = note.commit();

    let call = DepositCall {
        commitment,
        witness: commitments.witness(&commitment),
        denomination: tier.tag(),
    };

    (note, call)
}

pub fn prepare_withdraw(note: &DepositNote, ledgers: &LocalLedgers) -> WithdrawCall {
    WithdrawCall {
        nullifier: note.nullifier,
        nullifier_witness: ledgers.nullifiers.witness(&note.nullifier_hash()),
        commitment_witness: ledgers.commitments.witness(&note.commit()),
        nonce: note.nonce,
        denomination: note.tier.tag(),
        lock_field: note.lock.field(),
    }
}
