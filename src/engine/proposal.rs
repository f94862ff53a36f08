//! Proposals and the append-only proposal store
//!
//! Proposals are kept forever as an audit log; ids are assigned in
//! strictly increasing order starting at 0 and never reused.

use crate::engine::error::MultisigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A proposed operation awaiting approval
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique sequential id
    pub id: u64,
    /// Identifier of the effect recipient
    pub target: String,
    /// Amount carried by the effect (may be zero)
    pub value: u64,
    /// Opaque effect-specific instructions
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    /// Whether the proposal has been executed (monotonic false -> true)
    pub executed: bool,
    /// Owner who submitted the proposal
    pub created_by: String,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    /// Human-readable status
    pub fn status(&self) -> &'static str {
        if self.executed {
            "executed"
        } else {
            "pending"
        }
    }
}

/// Append-only store of proposals, keyed by sequential id
///
/// Invariant: `proposals[i].id == i` for every index, so the next id is
/// always `proposals.len()`.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
}

impl ProposalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            proposals: Vec::new(),
        }
    }

    /// Append a new proposal and return its id
    pub fn add(&mut self, created_by: String, target: String, value: u64, payload: Vec<u8>) -> u64 {
        let id = self.proposals.len() as u64;

        self.proposals.push(Proposal {
            id,
            target,
            value,
            payload,
            executed: false,
            created_by,
            created_at: Utc::now(),
        });

        id
    }

    /// Get a proposal by id
    pub fn get(&self, id: u64) -> Result<&Proposal, MultisigError> {
        self.proposals
            .get(id as usize)
            .ok_or(MultisigError::ProposalNotFound(id))
    }

    /// Get a mutable reference to a proposal
    pub fn get_mut(&mut self, id: u64) -> Result<&mut Proposal, MultisigError> {
        self.proposals
            .get_mut(id as usize)
            .ok_or(MultisigError::ProposalNotFound(id))
    }

    /// Number of proposals ever submitted
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Iterate over all proposals in submission order
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Proposals that have not been executed yet
    pub fn pending(&self) -> Vec<&Proposal> {
        self.proposals.iter().filter(|p| !p.executed).collect()
    }
}
