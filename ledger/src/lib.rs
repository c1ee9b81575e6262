pub mod bank;
pub mod call;
pub mod client;
pub mod error;
pub mod events;
pub mod ledgers;
pub mod mixer;
pub mod state;

pub use bank::{Bank, InMemoryBank, TransferError};
pub use call::{Call, DepositCall, SignedCall, WithdrawCall};
pub use client::{prepare_deposit, prepare_withdraw, LocalLedgers};
pub use error::{Error, Result};
pub use events::{Event, EventKind, EventLog};
pub use ledgers::{CommitmentLedger, NullifierLedger};
pub use mixer::Mixer;
pub use state::MixerState;
