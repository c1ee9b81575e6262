use serde::{Deserialize, Serialize};

pub const TIER_1_AMOUNT: u64 = 100_000;
pub const TIER_2_AMOUNT: u64 = 500_000;
pub const TIER_3_AMOUNT: u64 = 1_000_000;

/// One of the three fixed amounts the pool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum DenominationTier {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("denomination must be 1, 2 or 3, got {0}")]
pub struct InvalidDenomination(pub u64);

impl DenominationTier {
    pub const ALL: [DenominationTier; 3] = [Self::One, Self::Two, Self::Three];

    /// Value stored in the commitment ledger for a deposit at this tier.
    pub fn tag(self) -> u64 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    pub fn amount(self) -> u64 {
        match self {
            Self::One => TIER_1_AMOUNT,
            Self::Two => TIER_2_AMOUNT,
            Self::Three => TIER_3_AMOUNT,
        }
    }
}

impl TryFrom<u64> for DenominationTier {
    type Error = InvalidDenomination;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(InvalidDenomination(other)),
        }
    }
}

impl From<DenominationTier> for u64 {
    fn from(tier: DenominationTier) -> u64 {
        tier.tag()
    }
}

impl std::fmt::Display for DenominationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
