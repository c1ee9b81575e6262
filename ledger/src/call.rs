use ed25519_dalek::{ed25519::SignatureBytes, Signature, Signer, SigningKey};
use mixer_cl::{AccountId, Nonce, NoteCommitment, NullifierSecret, Witness};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Arguments of a deposit: the commitment, an absence witness for it in the
/// commitment ledger, and the raw denomination (validated by the mixer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCall {
    pub commitment: NoteCommitment,
    pub witness: Witness,
    pub denomination: u64,
}

/// Arguments of a withdrawal. Everything needed to recompute the commitment is
/// revealed here; only the nullifier hash ends up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawCall {
    pub nullifier: NullifierSecret,
    pub nullifier_witness: Witness,
    pub commitment_witness: Witness,
    pub nonce: Nonce,
    pub denomination: u64,
    /// all zeros when the note is unlocked
    pub lock_field: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Deposit(DepositCall),
    Withdraw(WithdrawCall),
}

impl Call {
    /// Message signed by the caller.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            Call::Deposit(d) => {
                bytes.extend(b"NOMIX_DEPOSIT");
                bytes.extend(d.commitment.as_bytes());
                bytes.extend(d.denomination.to_le_bytes());
                extend_witness(&mut bytes, &d.witness);
            }
            Call::Withdraw(w) => {
                bytes.extend(b"NOMIX_WITHDRAW");
                bytes.extend(w.nullifier.as_bytes());
                bytes.extend(w.nonce.to_le_bytes());
                bytes.extend(w.denomination.to_le_bytes());
                bytes.extend(w.lock_field);
                extend_witness(&mut bytes, &w.nullifier_witness);
                extend_witness(&mut bytes, &w.commitment_witness);
            }
        }
        bytes
    }
}

fn extend_witness(bytes: &mut Vec<u8>, witness: &Witness) {
    bytes.extend((witness.siblings().len() as u32).to_le_bytes());
    for sibling in witness.siblings() {
        bytes.extend(sibling);
    }
}

/// A call together with proof that `caller` issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub call: Call,
    pub caller: AccountId,
    #[serde(with = "serde_arrays")]
    pub sig: SignatureBytes,
}

impl SignedCall {
    pub fn sign(call: Call, signing_key: &SigningKey) -> Self {
        let sig = signing_key.sign(&call.to_bytes()).to_bytes();
        Self {
            call,
            caller: AccountId::from(signing_key),
            sig,
        }
    }

    /// Checks the signature and returns the authenticated caller.
    pub fn verify(&self) -> Result<AccountId> {
        let vk = self.caller.verifying_key().ok_or(Error::InvalidSignature)?;
        let sig = Signature::from_bytes(&self.sig);
        vk.verify_strict(&self.call.to_bytes(), &sig)
            .map_err(|_| Error::InvalidSignature)?;
        Ok(self.caller)
    }
}
