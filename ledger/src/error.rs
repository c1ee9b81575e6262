use mixer_cl::{AccountId, InvalidDenomination};

use crate::bank::TransferError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every variant rejects the whole transition: neither root moves and no funds are transferred.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidDenomination(#[from] InvalidDenomination),
    #[error("already deposited commitment (or stale commitment witness)")]
    CommitmentAlreadyDeposited,
    #[error("already withdrawn nullifier (or stale nullifier witness)")]
    NullifierSpent,
    #[error("commitment not found")]
    CommitmentNotFound,
    #[error("recipient mismatch: note is locked to {expected}, caller is {caller}")]
    RecipientMismatch {
        expected: AccountId,
        caller: AccountId,
    },
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("invalid call signature")]
    InvalidSignature,
    #[error("the pool account cannot deposit into or withdraw from itself")]
    PoolCaller,
}
