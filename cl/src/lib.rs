pub mod account;
pub mod ds;
pub mod note;
pub mod nullifier;
pub mod tier;

pub type Hash = sha2::Sha256;
pub use sha2::Digest;

pub use account::{new_account, AccountId, Nonce};
pub use ds::sparse_merkle::{SparseMerkleMap, Witness};
pub use note::{DepositNote, Lock, NoteCommitment, NoteError};
pub use nullifier::{NullifierHash, NullifierSecret};
pub use tier::{DenominationTier, InvalidDenomination};
