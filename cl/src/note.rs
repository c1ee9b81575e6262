use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    account::{AccountId, Nonce},
    nullifier::{NullifierHash, NullifierSecret},
    tier::{DenominationTier, InvalidDenomination},
    Digest, Hash,
};

/// Public identity of a deposit, the key of the commitment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteCommitment(pub [u8; 32]);

impl NoteCommitment {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Optional recipient restriction baked into a note at deposit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lock {
    Unlocked,
    Recipient(AccountId),
}

impl Lock {
    /// Encoding committed to: the recipient id, or all zeros when unlocked.
    pub fn field(&self) -> [u8; 32] {
        match self {
            Lock::Unlocked => [0u8; 32],
            Lock::Recipient(id) => id.0,
        }
    }

    pub fn from_field(field: [u8; 32]) -> Self {
        if field == [0u8; 32] {
            Lock::Unlocked
        } else {
            Lock::Recipient(AccountId(field))
        }
    }
}

impl From<Option<AccountId>> for Lock {
    fn from(recipient: Option<AccountId>) -> Self {
        recipient.map_or(Lock::Unlocked, Lock::Recipient)
    }
}

pub fn commit(
    nonce: Nonce,
    nullifier: &NullifierSecret,
    tier: DenominationTier,
    lock_field: &[u8; 32],
) -> NoteCommitment {
    let mut hasher = Hash::new();
    hasher.update(b"NOMIX_NOTE_COMMIT");
    hasher.update(nonce.to_le_bytes());
    hasher.update(nullifier.as_bytes());
    hasher.update([tier.tag() as u8]);
    hasher.update(lock_field);

    NoteCommitment(hasher.finalize().into())
}

/// The secret capability to redeem one deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositNote {
    pub nonce: Nonce,
    pub nullifier: NullifierSecret,
    pub tier: DenominationTier,
    pub lock: Lock,
}

impl DepositNote {
    pub fn new(nonce: Nonce, tier: DenominationTier, lock: Lock, rng: impl RngCore) -> Self {
        Self {
            nonce,
            nullifier: NullifierSecret::random(rng),
            tier,
            lock,
        }
    }

    pub fn commit(&self) -> NoteCommitment {
        commit(self.nonce, &self.nullifier, self.tier, &self.lock.field())
    }

    pub fn nullifier_hash(&self) -> NullifierHash {
        self.nullifier.hash()
    }

    /// `base64("<nonce>-<commitment>-<nullifier>-<tier>-<lock>")`, digests in hex.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}-{}-{}-{}-{}",
            self.nonce,
            hex::encode(self.commit().0),
            hex::encode(self.nullifier.0),
            self.tier.tag(),
            hex::encode(self.lock.field()),
        );
        STANDARD.encode(raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("note is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("note is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("note must have 5 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid integer field: {0}")]
    Integer(#[from] std::num::ParseIntError),
    #[error("invalid digest field: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Denomination(#[from] InvalidDenomination),
    #[error("note commitment does not match its contents")]
    CommitmentMismatch,
}

fn parse_digest(field: &str) -> Result<[u8; 32], NoteError> {
    let mut digest = [0u8; 32];
    hex::decode_to_slice(field, &mut digest)?;
    Ok(digest)
}

impl FromStr for DepositNote {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = String::from_utf8(STANDARD.decode(s.trim())?)?;
        let fields: Vec<&str> = raw.split('-').collect();
        let [nonce, commitment, nullifier, tier, lock] = fields[..] else {
            return Err(NoteError::FieldCount(fields.len()));
        };

        let note = DepositNote {
            nonce: nonce.parse()?,
            nullifier: NullifierSecret(parse_digest(nullifier)?),
            tier: DenominationTier::try_from(tier.parse::<u64>()?)?,
            lock: Lock::from_field(parse_digest(lock)?),
        };

        if note.commit() != NoteCommitment(parse_digest(commitment)?) {
            return Err(NoteError::CommitmentMismatch);
        }

        Ok(note)
    }
}

impl std::fmt::Display for DepositNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}
