use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

/// Per-account sequence number, bumped by every action the account signs off on.
pub type Nonce = u32;

/// Identity of an account: its ed25519 verifying key.
///
/// The same bytes are used as a transfer endpoint and as the value compared
/// against a note's lock field, so all zeros is reserved for "unlocked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; PUBLIC_KEY_LENGTH]);

pub fn new_account(mut rng: impl CryptoRngCore) -> SigningKey {
    SigningKey::generate(&mut rng)
}

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).ok()
    }
}

impl From<VerifyingKey> for AccountId {
    fn from(vk: VerifyingKey) -> Self {
        Self(vk.to_bytes())
    }
}

impl From<&SigningKey> for AccountId {
    fn from(sk: &SigningKey) -> Self {
        sk.verifying_key().into()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}
