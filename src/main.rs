//! Quorumsig CLI Application
//!
//! A command-line interface for the threshold multisig approval engine.

use clap::{Parser, Subcommand};
use quorumsig::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorumsig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A threshold multi-signature approval engine", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".quorumsig_data")]
    data_dir: PathBuf,

    /// Emit query results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new multisig wallet
    Init {
        /// Authorized owner (repeat for each owner)
        #[arg(short, long = "owner", required = true)]
        owners: Vec<String>,

        /// Confirmations required before execution (M in M-of-N)
        #[arg(short, long)]
        threshold: usize,
    },

    /// Submit a new proposal
    Submit {
        /// Proposing owner
        #[arg(short, long)]
        proposer: String,

        /// Effect recipient
        #[arg(short, long)]
        target: String,

        /// Amount carried by the effect
        #[arg(short, long, default_value = "0")]
        value: u64,

        /// Effect-specific instructions (hex-encoded)
        #[arg(long)]
        payload: Option<String>,
    },

    /// Confirm a proposal
    Confirm {
        /// Confirming owner
        #[arg(short, long)]
        owner: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Revoke a previous confirmation
    Revoke {
        /// Revoking owner
        #[arg(short, long)]
        owner: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Execute a proposal that has reached quorum
    Execute {
        /// Calling owner
        #[arg(short, long)]
        caller: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Show the owner registry
    Owners,

    /// Show the quorum threshold
    Threshold,

    /// Show a single proposal
    Proposal {
        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// List all proposals
    Proposals {
        /// Only show proposals that have not been executed
        #[arg(long)]
        pending: bool,
    },

    /// Show confirmations for a proposal
    Confirmations {
        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Check whether an owner has confirmed a proposal
    IsConfirmed {
        /// Proposal id
        #[arg(short, long)]
        id: u64,

        /// Owner to check
        #[arg(short, long)]
        owner: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need existing state)
    if let Commands::Init { owners, threshold } = &cli.command {
        return cli::cmd_init(&cli.data_dir, owners.clone(), *threshold);
    }

    // All other commands operate on an initialized wallet
    let mut app = AppState::load(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Submit {
            proposer,
            target,
            value,
            payload,
        } => {
            cli::cmd_submit(&mut app, &proposer, &target, value, payload.as_deref())?;
        }

        Commands::Confirm { owner, id } => {
            cli::cmd_confirm(&mut app, &owner, id)?;
        }

        Commands::Revoke { owner, id } => {
            cli::cmd_revoke(&mut app, &owner, id)?;
        }

        Commands::Execute { caller, id } => {
            cli::cmd_execute(&mut app, &caller, id)?;
        }

        Commands::Owners => {
            cli::cmd_owners(&app, cli.json)?;
        }

        Commands::Threshold => {
            cli::cmd_threshold(&app, cli.json)?;
        }

        Commands::Proposal { id } => {
            cli::cmd_proposal(&app, id, cli.json)?;
        }

        Commands::Proposals { pending } => {
            cli::cmd_proposals(&app, pending, cli.json)?;
        }

        Commands::Confirmations { id } => {
            cli::cmd_confirmations(&app, id, cli.json)?;
        }

        Commands::IsConfirmed { id, owner } => {
            cli::cmd_is_confirmed(&app, id, &owner, cli.json)?;
        }
    }

    Ok(())
}
