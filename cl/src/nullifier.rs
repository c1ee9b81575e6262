use crate::{Digest, Hash};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

/// The secret half of a deposit note. Only revealed when the note is withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierSecret(pub [u8; 32]);

/// Public key of the nullifier ledger, marked spent on withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NullifierHash(pub [u8; 32]);

impl NullifierSecret {
    pub fn random(mut rng: impl RngCore) -> Self {
        let mut sk = [0u8; 32];
        rng.fill_bytes(&mut sk);
        Self(sk)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn hash(&self) -> NullifierHash {
        let mut hasher = Hash::new();
        hasher.update(b"NOMIX_NULLIFIER");
        hasher.update(self.0);
        NullifierHash(hasher.finalize().into())
    }
}

impl NullifierHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
