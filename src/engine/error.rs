//! Error types for the approval engine

use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Not an owner: {0}")]
    NotAnOwner(String),
    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),
    #[error("Proposal {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Owner {owner} already confirmed proposal {id}")]
    AlreadyConfirmed { id: u64, owner: String },
    #[error("Owner {owner} has not confirmed proposal {id}")]
    NotYetConfirmed { id: u64, owner: String },
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error("Execution effect failed: {0}")]
    EffectFailed(#[from] crate::effect::EffectError),
}
