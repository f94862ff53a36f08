//! Threshold approval engine
//!
//! The core state machine: an immutable owner registry, an append-only
//! proposal store, a confirmation ledger with per-(proposal, owner)
//! uniqueness, and an execution gate that invokes the external effect
//! exactly once per proposal.
//!
//! # Example
//!
//! ```
//! use quorumsig::engine::MultisigState;
//! use quorumsig::effect::RecordingEffect;
//!
//! let mut state = MultisigState::with_owners(
//!     vec!["alice".into(), "bob".into(), "carol".into()],
//!     2,
//! ).unwrap();
//!
//! // Propose, gather confirmations, execute
//! let id = state.submit("alice", "treasury", 100, vec![]).unwrap();
//! state.confirm("alice", id).unwrap();
//! state.confirm("bob", id).unwrap();
//!
//! let mut effect = RecordingEffect::new();
//! state.execute("alice", id, &mut effect).unwrap();
//! assert!(state.get_proposal(id).unwrap().executed);
//! ```

pub mod error;
pub mod ledger;
pub mod proposal;
pub mod registry;
pub mod shared;
pub mod state;

pub use error::MultisigError;
pub use ledger::{Confirmation, ConfirmationLedger};
pub use proposal::{Proposal, ProposalStore};
pub use registry::OwnerRegistry;
pub use shared::SharedState;
pub use state::MultisigState;
