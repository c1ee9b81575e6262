use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;
use mixer_cl::{new_account, AccountId, DenominationTier, DepositNote, Lock};
use mixer_ledger::{
    prepare_deposit, prepare_withdraw, Bank, Call, InMemoryBank, LocalLedgers, Mixer, MixerState,
    SignedCall,
};
use rand_core::CryptoRngCore;
use tracing::{info, info_span, warn};

use crate::config::{ScenarioConfig, Step};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("step {step} failed: {source}")]
    UnexpectedFailure {
        step: usize,
        source: mixer_ledger::Error,
    },
    #[error("step {step} was expected to fail but succeeded")]
    UnexpectedSuccess { step: usize },
    #[error("step {step}: local ledgers no longer match the mixer roots")]
    ReplicaDiverged { step: usize },
    #[error("step {step}: `{label}` is not declared")]
    Undeclared { step: usize, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub state: MixerState,
    pub pool_balance: u64,
    pub balances: BTreeMap<String, u64>,
    /// notes of accepted deposits by label, in their shareable encoding
    pub notes: BTreeMap<String, String>,
    pub expected_failures: usize,
}

pub struct Scenario {
    mixer: Mixer<InMemoryBank>,
    keys: BTreeMap<String, SigningKey>,
    notes: BTreeMap<String, DepositNote>,
    ledgers: LocalLedgers,
}

impl Scenario {
    pub fn new(config: &ScenarioConfig, mut rng: impl CryptoRngCore) -> Self {
        let pool = AccountId::from(&new_account(&mut rng));

        let keys: BTreeMap<_, _> = config
            .accounts
            .iter()
            .map(|a| (a.name.clone(), new_account(&mut rng)))
            .collect();
        let balances = config
            .accounts
            .iter()
            .map(|a| (AccountId::from(&keys[&a.name]), a.balance))
            .collect();

        let mixer = Mixer::new(pool, InMemoryBank::new_with_balances(balances));
        let ledgers = LocalLedgers::from_events(mixer.events());

        Self {
            mixer,
            keys,
            notes: BTreeMap::new(),
            ledgers,
        }
    }

    pub fn mixer(&self) -> &Mixer<InMemoryBank> {
        &self.mixer
    }

    pub fn account(&self, name: &str) -> Option<AccountId> {
        self.keys.get(name).map(AccountId::from)
    }

    /// Runs the steps in order. Every call goes through a signed submission and
    /// is built from the local ledgers, which are resynced after each step.
    pub fn run(
        &mut self,
        steps: &[Step],
        mut rng: impl CryptoRngCore,
    ) -> Result<Report, ScenarioError> {
        let mut expected_failures = 0;

        for (i, step) in steps.iter().enumerate() {
            let n = i + 1;
            let _span = info_span!("step", n).entered();

            let (signed, issued) = self.build_call(n, step, &mut rng)?;
            match (self.mixer.submit(&signed), step.expect_failure()) {
                (Ok(tier), false) => {
                    info!(%tier, "step succeeded");
                    if let Some((label, note)) = issued {
                        self.notes.insert(label, note);
                    }
                }
                (Err(err), true) => {
                    info!(%err, "step failed as expected");
                    expected_failures += 1;
                }
                (Ok(_), true) => return Err(ScenarioError::UnexpectedSuccess { step: n }),
                (Err(source), false) => {
                    return Err(ScenarioError::UnexpectedFailure { step: n, source })
                }
            }

            self.ledgers.sync(self.mixer.events());
            if !self.ledgers.matches(&self.mixer.state()) {
                return Err(ScenarioError::ReplicaDiverged { step: n });
            }
        }

        Ok(self.report(expected_failures))
    }

    /// Signs the call for `action`. A deposit also hands back its note, which
    /// only becomes usable once the deposit is accepted.
    fn build_call(
        &self,
        step: usize,
        action: &Step,
        rng: impl CryptoRngCore,
    ) -> Result<(SignedCall, Option<(String, DepositNote)>), ScenarioError> {
        match action {
            Step::Deposit {
                from,
                tier,
                lock,
                note,
                ..
            } => {
                let sk = self.key(step, from)?;
                let lock = match lock {
                    Some(recipient) => Lock::Recipient(AccountId::from(self.key(step, recipient)?)),
                    None => Lock::Unlocked,
                };
                // an out-of-range tier is still submitted so the mixer rejects it
                let denomination = *tier;
                let tier = DenominationTier::try_from(denomination).unwrap_or(DenominationTier::One);

                let (issued, mut call) = prepare_deposit(
                    rng,
                    self.mixer.bank().nonce(&AccountId::from(sk)),
                    tier,
                    lock,
                    &self.ledgers.commitments,
                );
                call.denomination = denomination;

                let signed = SignedCall::sign(Call::Deposit(call), sk);
                Ok((signed, Some((note.clone(), issued))))
            }
            Step::Withdraw { caller, note, .. } => {
                let sk = self.key(step, caller)?;
                let Some(issued) = self.notes.get(note) else {
                    warn!(note, "withdraw refers to a note that was never accepted");
                    return Err(ScenarioError::Undeclared {
                        step,
                        label: note.clone(),
                    });
                };
                let call = prepare_withdraw(issued, &self.ledgers);
                Ok((SignedCall::sign(Call::Withdraw(call), sk), None))
            }
        }
    }

    fn key(&self, step: usize, name: &str) -> Result<&SigningKey, ScenarioError> {
        self.keys.get(name).ok_or_else(|| ScenarioError::Undeclared {
            step,
            label: name.to_string(),
        })
    }

    fn report(&self, expected_failures: usize) -> Report {
        Report {
            state: self.mixer.state(),
            pool_balance: self.mixer.pool_balance(),
            balances: self
                .keys
                .iter()
                .map(|(name, sk)| (name.clone(), self.mixer.bank().balance(&AccountId::from(sk))))
                .collect(),
            notes: self
                .notes
                .iter()
                .map(|(label, note)| (label.clone(), note.encode()))
                .collect(),
            expected_failures,
        }
    }
}
