use std::collections::BTreeMap;

use mixer_cl::{AccountId, Nonce};
use serde::{Deserialize, Serialize};

/// The account layer that custodies funds. The mixer only ever asks it to move
/// a tier amount between the caller and the pool.
pub trait Bank {
    fn balance(&self, account: &AccountId) -> u64;

    /// Sequence number the account's next action will be issued under.
    fn nonce(&self, account: &AccountId) -> Nonce;

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u64)
        -> Result<(), TransferError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient funds in account {account}: balance {balance}, needed {amount}")]
    InsufficientFunds {
        account: AccountId,
        balance: u64,
        amount: u64,
    },
    #[error("overflow in account balance of {0}")]
    Overflow(AccountId),
    #[error("nonce of account {0} is exhausted")]
    NonceExhausted(AccountId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryBank {
    balances: BTreeMap<AccountId, u64>,
    nonces: BTreeMap<AccountId, Nonce>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_balances(balances: BTreeMap<AccountId, u64>) -> Self {
        Self {
            balances,
            nonces: BTreeMap::new(),
        }
    }

    pub fn total_balance(&self) -> u64 {
        self.balances.values().sum()
    }
}

impl Bank for InMemoryBank {
    fn balance(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn nonce(&self, account: &AccountId) -> Nonce {
        self.nonces.get(account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), TransferError> {
        let from_balance = self.balance(from);
        let Some(new_from_balance) = from_balance.checked_sub(amount) else {
            return Err(TransferError::InsufficientFunds {
                account: *from,
                balance: from_balance,
                amount,
            });
        };
        let next_nonce = self
            .nonce(from)
            .checked_add(1)
            .ok_or(TransferError::NonceExhausted(*from))?;

        if from != to {
            let new_to_balance = self
                .balance(to)
                .checked_add(amount)
                .ok_or(TransferError::Overflow(*to))?;
            self.balances.insert(*from, new_from_balance);
            self.balances.insert(*to, new_to_balance);
        }
        self.nonces.insert(*from, next_nonce);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_transfer_moves_funds_and_bumps_nonce() {
        let (alice, bob) = (AccountId([1; 32]), AccountId([2; 32]));
        let mut bank = InMemoryBank::new_with_balances(BTreeMap::from_iter([(alice, 100)]));

        bank.transfer(&alice, &bob, 30).unwrap();

        assert_eq!(bank.balance(&alice), 70);
        assert_eq!(bank.balance(&bob), 30);
        assert_eq!(bank.nonce(&alice), 1);
        assert_eq!(bank.nonce(&bob), 0);
        assert_eq!(bank.total_balance(), 100);
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let (alice, bob) = (AccountId([1; 32]), AccountId([2; 32]));
        let mut bank = InMemoryBank::new_with_balances(BTreeMap::from_iter([(alice, 10)]));
        let before = bank.clone();

        assert_eq!(
            bank.transfer(&alice, &bob, 11),
            Err(TransferError::InsufficientFunds {
                account: alice,
                balance: 10,
                amount: 11
            })
        );
        assert_eq!(bank, before);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let (alice, bob) = (AccountId([1; 32]), AccountId([2; 32]));
        let mut bank =
            InMemoryBank::new_with_balances(BTreeMap::from_iter([(alice, 10), (bob, u64::MAX)]));

        assert_eq!(
            bank.transfer(&alice, &bob, 1),
            Err(TransferError::Overflow(bob))
        );
        assert_eq!(bank.balance(&alice), 10);
    }
}
