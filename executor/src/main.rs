use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mixer_cl::{AccountId, DenominationTier, DepositNote, Lock};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod scenario;

use config::ScenarioConfig;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Fixed-denomination mixer executor")]
struct Args {
    #[clap(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scripted sequence of deposits and withdrawals against a fresh mixer
    Scenario {
        #[clap(long)]
        config: PathBuf,
    },
    /// Draw a fresh deposit note and print its shareable encoding
    NewNote {
        #[clap(long, default_value = "1")]
        tier: u64,
        /// account nonce the deposit will be made under
        #[clap(long, default_value = "0")]
        nonce: u32,
        /// hex encoded account the note is locked to
        #[clap(long)]
        lock: Option<String>,
    },
    /// Decode a note and check it against its embedded commitment
    InspectNote { note: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt::fmt().with_env_filter(filter).with_target(false).init();

    match args.command {
        Command::Scenario { config } => run_scenario(config),
        Command::NewNote { tier, nonce, lock } => new_note(tier, nonce, lock),
        Command::InspectNote { note } => inspect_note(&note),
    }
}

fn run_scenario(path: PathBuf) -> anyhow::Result<()> {
    let config = ScenarioConfig::from_file(&path)?;
    info!(
        path = %path.display(),
        accounts = config.accounts.len(),
        steps = config.steps.len(),
        "loaded scenario"
    );

    let mut rng = rand::thread_rng();
    let mut scenario = Scenario::new(&config, &mut rng);
    info!(label = %config.pool, pool = %scenario.mixer().pool(), "mixer initialized");
    for account in &config.accounts {
        if let Some(id) = scenario.account(&account.name) {
            info!(name = %account.name, %id, balance = account.balance, "account");
        }
    }

    let report = scenario.run(&config.steps, &mut rng)?;

    println!("commitment root: {}", hex::encode(report.state.commitment_root()));
    println!("nullifier root:  {}", hex::encode(report.state.nullifier_root()));
    println!("pool balance:    {} ({})", report.pool_balance, config.pool);
    println!("expected failures: {}", report.expected_failures);
    for (name, balance) in &report.balances {
        println!("  {name}: {balance}");
    }
    for (label, note) in &report.notes {
        println!("  note {label}: {note}");
    }

    Ok(())
}

fn new_note(tier: u64, nonce: u32, lock: Option<String>) -> anyhow::Result<()> {
    let tier = DenominationTier::try_from(tier)?;
    let lock = match lock {
        Some(hex_id) => {
            let mut id = [0u8; 32];
            hex::decode_to_slice(hex_id, &mut id)?;
            Lock::Recipient(AccountId(id))
        }
        None => Lock::Unlocked,
    };

    let note = DepositNote::new(nonce, tier, lock, rand::thread_rng());
    info!(
        %tier,
        commitment = %hex::encode(note.commit().0),
        "note drawn"
    );
    println!("{note}");
    Ok(())
}

fn inspect_note(encoded: &str) -> anyhow::Result<()> {
    let note: DepositNote = encoded.parse()?;

    println!("nonce:          {}", note.nonce);
    println!("tier:           {} ({})", note.tier.tag(), note.tier.amount());
    println!("commitment:     {}", hex::encode(note.commit().0));
    println!("nullifier hash: {}", hex::encode(note.nullifier_hash().0));
    match note.lock {
        Lock::Unlocked => println!("lock:           none"),
        Lock::Recipient(id) => println!("lock:           {}", hex::encode(id.0)),
    }
    Ok(())
}
