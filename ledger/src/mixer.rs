use mixer_cl::{AccountId, DenominationTier};
use tracing::{info, warn};

use crate::{
    bank::Bank,
    call::{Call, DepositCall, SignedCall, WithdrawCall},
    error::{Error, Result},
    events::{Event, EventLog},
    state::{MixerState, Transition},
};

/// The mixer: two roots, the pool account they guard, and the collaborators
/// that move funds and publish events.
///
/// Transitions are applied one at a time against the current roots. A call
/// built from a stale replica fails its witness check and has to be rebuilt
/// by the caller; nothing is retried here.
#[derive(Debug, Clone)]
pub struct Mixer<B> {
    state: MixerState,
    pool: AccountId,
    bank: B,
    events: EventLog,
}

impl<B: Bank> Mixer<B> {
    pub fn new(pool: AccountId, bank: B) -> Self {
        Self::from_state(MixerState::init(), pool, bank, EventLog::new())
    }

    /// Resume from persisted roots and the event history that produced them.
    pub fn from_state(state: MixerState, pool: AccountId, bank: B, events: EventLog) -> Self {
        Self {
            state,
            pool,
            bank,
            events,
        }
    }

    pub fn state(&self) -> MixerState {
        self.state
    }

    pub fn pool(&self) -> AccountId {
        self.pool
    }

    pub fn pool_balance(&self) -> u64 {
        self.bank.balance(&self.pool)
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn deposit(&mut self, caller: &AccountId, call: &DepositCall) -> Result<DenominationTier> {
        self.check_caller(caller)?;
        let transition = self
            .state
            .deposit(call)
            .inspect_err(|err| warn!(%caller, %err, "deposit rejected"))?;

        self.bank
            .transfer(caller, &self.pool, transition.tier.amount())
            .inspect_err(|err| warn!(%caller, %err, "deposit transfer failed"))?;

        Ok(self.commit(caller, transition))
    }

    pub fn withdraw(&mut self, caller: &AccountId, call: &WithdrawCall) -> Result<DenominationTier> {
        self.check_caller(caller)?;
        let transition = self
            .state
            .withdraw(caller, call)
            .inspect_err(|err| warn!(%caller, %err, "withdraw rejected"))?;

        self.bank
            .transfer(&self.pool, caller, transition.tier.amount())
            .inspect_err(|err| warn!(%caller, %err, "withdraw transfer failed"))?;

        Ok(self.commit(caller, transition))
    }

    /// Authenticates the caller from the signature, then applies the call.
    pub fn submit(&mut self, signed: &SignedCall) -> Result<DenominationTier> {
        let caller = signed
            .verify()
            .inspect_err(|err| warn!(caller = %signed.caller, %err, "call rejected"))?;

        match &signed.call {
            Call::Deposit(d) => self.deposit(&caller, d),
            Call::Withdraw(w) => self.withdraw(&caller, w),
        }
    }

    /// A transfer from the pool to itself moves nothing, so the pool may not
    /// stand on either side of a deposit or withdrawal.
    fn check_caller(&self, caller: &AccountId) -> Result<()> {
        if *caller == self.pool {
            warn!(%caller, "pool account rejected as caller");
            return Err(Error::PoolCaller);
        }
        Ok(())
    }

        fn commit(&mut self, caller: &AccountId, transition: Transition) -> DenominationTier {
        self.state = transition.state;
        self.events.emit(transition.event);

        match transition.event {
            Event::Deposit { commitment, tier } => info!(
                %caller,
                %tier,
                commitment = %hex::encode(commitment.0),
                root = %hex::encode(self.state.commitment_root()),
                "deposit committed"
            ),
            Event::Withdraw { nullifier_hash } => info!(
                %caller,
                tier = %transition.tier,
                nullifier_hash = %hex::encode(nullifier_hash.0),
                root = %hex::encode(self.state.nullifier_root()),
                "withdraw committed"
            ),
        }

        transition.tier
    }
}
