use std::collections::BTreeSet;
use std::path::Path;

use mixer_cl::{DenominationTier, InvalidDenomination};
use serde::{Deserialize, Serialize};

/// A scripted run: funded accounts and the ordered calls they make.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Display name of the pool account. The pool gets a fresh key nobody
    /// holds, so steps can never act as it; the label only has to stay clear
    /// of account names.
    #[serde(default = "default_pool")]
    pub pool: String,
    pub accounts: Vec<AccountParams>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountParams {
    pub name: String,
    #[serde(default)]
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Deposit {
        from: String,
        tier: u64,
        /// account the note is locked to
        lock: Option<String>,
        /// label later withdrawals refer to
        note: String,
        #[serde(default)]
        expect_failure: bool,
    },
    Withdraw {
        caller: String,
        note: String,
        #[serde(default)]
        expect_failure: bool,
    },
}

impl Step {
    pub fn expect_failure(&self) -> bool {
        match self {
            Step::Deposit { expect_failure, .. } | Step::Withdraw { expect_failure, .. } => {
                *expect_failure
            }
        }
    }
}

fn default_pool() -> String {
    "pool".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("account `{0}` is declared twice")]
    DuplicateAccount(String),

    #[error("step {step}: unknown account `{name}`")]
    UnknownAccount { step: usize, name: String },

    #[error("step {step}: note `{note}` was already issued")]
    DuplicateNote { step: usize, note: String },

    #[error("step {step}: note `{note}` is never deposited before this step")]
    UnknownNote { step: usize, note: String },

    #[error("step {step}: {source}")]
    Denomination {
        step: usize,
        source: InvalidDenomination,
    },
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every label a step uses is declared before it is used.
    ///
    /// Steps are numbered from 1 in error messages.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut accounts = BTreeSet::new();
        for account in &self.accounts {
            if account.name == self.pool || !accounts.insert(account.name.as_str()) {
                return Err(ConfigError::DuplicateAccount(account.name.clone()));
            }
        }

        let known = |step: usize, name: &str| {
            if accounts.contains(name) {
                Ok(())
            } else {
                Err(ConfigError::UnknownAccount {
                    step,
                    name: name.to_string(),
                })
            }
        };

        let mut notes = BTreeSet::new();
        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            match step {
                Step::Deposit {
                    from,
                    tier,
                    lock,
                    note,
                    ..
                } => {
                    known(n, from)?;
                    if let Some(recipient) = lock {
                        known(n, recipient)?;
                    }
                    DenominationTier::try_from(*tier)
                        .map_err(|source| ConfigError::Denomination { step: n, source })?;
                    if !notes.insert(note.as_str()) {
                        return Err(ConfigError::DuplicateNote {
                            step: n,
                            note: note.clone(),
                        });
                    }
                }
                Step::Withdraw { caller, note, .. } => {
                    known(n, caller)?;
                    if !notes.contains(note.as_str()) {
                        return Err(ConfigError::UnknownNote {
                            step: n,
                            note: note.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
