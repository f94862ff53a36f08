//! Quorumsig: a threshold multi-signature approval engine in Rust
//!
//! This crate provides the approval state machine that gates an external
//! action behind votes from a fixed set of authorized principals:
//! - Immutable owner registry with an M-of-N quorum threshold
//! - Append-only proposal store with monotonic, never-reused ids
//! - Confirmation ledger with per-(proposal, owner) uniqueness
//! - Execution gate with exactly-once, rollback-on-failure semantics
//! - Injected execution effects (the mechanism that carries out an
//!   approved action lives outside this crate)
//! - JSON persistence with atomic writes and rotating backups
//!
//! # Example
//!
//! ```rust
//! use quorumsig::engine::MultisigState;
//! use quorumsig::effect::RecordingEffect;
//!
//! // Create a 2-of-3 wallet
//! let mut state = MultisigState::with_owners(
//!     vec!["alice".into(), "bob".into(), "carol".into()],
//!     2,
//! ).unwrap();
//!
//! // Propose a transfer
//! let id = state.submit("alice", "treasury", 100, vec![]).unwrap();
//!
//! // Collect confirmations
//! state.confirm("alice", id).unwrap();
//! state.confirm("bob", id).unwrap();
//!
//! // Execute once quorum is reached
//! let mut effect = RecordingEffect::new();
//! state.execute("alice", id, &mut effect).unwrap();
//! assert!(state.get_proposal(id).unwrap().executed);
//! ```

pub mod cli;
pub mod effect;
pub mod engine;
pub mod storage;

// Re-export commonly used types
pub use effect::{EffectError, ExecutionEffect, LogEffect, RecordingEffect};
pub use engine::{
    Confirmation, ConfirmationLedger, MultisigError, MultisigState, OwnerRegistry, Proposal,
    ProposalStore, SharedState,
};
pub use storage::{Storage, StorageConfig, StorageError};
