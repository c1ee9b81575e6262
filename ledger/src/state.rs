use mixer_cl::{note, AccountId, DenominationTier, Lock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    call::{DepositCall, WithdrawCall},
    error::{Error, Result},
    events::Event,
    ledgers::{self, NOT_DEPOSITED, SPENT, UNSPENT},
};

/// The only durable state of the mixer: the roots of the two ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerState {
    commitment_root: [u8; 32],
    nullifier_root: [u8; 32],
}

/// A validated transition, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: MixerState,
    pub tier: DenominationTier,
    pub event: Event,
}

impl Default for MixerState {
    fn default() -> Self {
        Self::init()
    }
}

impl MixerState {
    /// State over two empty ledgers.
    pub fn init() -> Self {
        Self {
            commitment_root: ledgers::empty_root(),
            nullifier_root: ledgers::empty_root(),
        }
    }

    pub fn commitment_root(&self) -> [u8; 32] {
        self.commitment_root
    }

    pub fn nullifier_root(&self) -> [u8; 32] {
        self.nullifier_root
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.commitment_root);
        bytes[32..].copy_from_slice(&self.nullifier_root);
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut commitment_root = [0u8; 32];
        let mut nullifier_root = [0u8; 32];
        commitment_root.copy_from_slice(&bytes[..32]);
        nullifier_root.copy_from_slice(&bytes[32..]);
        Self {
            commitment_root,
            nullifier_root,
        }
    }

    /// Validates a deposit against the current commitment root.
    ///
    /// The witness must prove the commitment absent; the same witness then
    /// yields the root with the commitment set to the tier tag.
    pub fn deposit(&self, call: &DepositCall) -> Result<Transition> {
        let tier = DenominationTier::try_from(call.denomination)?;
        let key = call.commitment.as_bytes();

        let root_before = call.witness.compute_root(key, NOT_DEPOSITED);
        debug!(
            root = %hex::encode(root_before),
            held = %hex::encode(self.commitment_root),
            "deposit absence check"
        );
        if root_before != self.commitment_root {
            return Err(Error::CommitmentAlreadyDeposited);
        }

        let root_after = call.witness.compute_root(key, tier.tag());

        Ok(Transition {
            state: Self {
                commitment_root: root_after,
                ..*self
            },
            tier,
            event: Event::Deposit {
                commitment: call.commitment,
                tier,
            },
        })
    }

    /// Validates a withdrawal by `caller` against both roots.
    ///
    /// Checks run in order: tier, recipient lock, nullifier unspent, then
    /// membership of the recomputed commitment at the claimed tier. Only the
    /// nullifier root changes.
    pub fn withdraw(&self, caller: &AccountId, call: &WithdrawCall) -> Result<Transition> {
        let tier = DenominationTier::try_from(call.denomination)?;

        if let Lock::Recipient(expected) = Lock::from_field(call.lock_field) {
            if expected != *caller {
                return Err(Error::RecipientMismatch {
                    expected,
                    caller: *caller,
                });
            }
        }

        let nullifier_hash = call.nullifier.hash();
        let nf_key = nullifier_hash.as_bytes();
        if call.nullifier_witness.compute_root(nf_key, UNSPENT) != self.nullifier_root {
            return Err(Error::NullifierSpent);
        }

        let expected_commitment =
            note::commit(call.nonce, &call.nullifier, tier, &call.lock_field);
        let commitment_root = call
            .commitment_witness
            .compute_root(expected_commitment.as_bytes(), tier.tag());
        debug!(
            commitment = %hex::encode(expected_commitment.0),
            root = %hex::encode(commitment_root),
            held = %hex::encode(self.commitment_root),
            "withdraw membership check"
        );
        if commitment_root != self.commitment_root {
            return Err(Error::CommitmentNotFound);
        }

        Ok(Transition {
            state: Self {
                nullifier_root: call.nullifier_witness.compute_root(nf_key, SPENT),
                ..*self
            },
            tier,
            event: Event::Withdraw { nullifier_hash },
        })
    }
}
