//! Confirmation ledger
//!
//! Records which owners have confirmed which proposals. At most one
//! confirmation may exist per (proposal, owner) pair at any time.

use crate::engine::error::MultisigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single owner's recorded approval of one proposal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Confirmation {
    /// Owner who confirmed
    pub owner: String,
    /// When the confirmation was recorded
    pub confirmed_at: DateTime<Utc>,
}

/// Per-proposal confirmation bookkeeping
///
/// Owner-membership and executed-state preconditions are enforced by the
/// surrounding state aggregate; the ledger itself only guarantees
/// uniqueness per (proposal, owner) pair.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ConfirmationLedger {
    /// Confirmations by proposal id
    entries: HashMap<u64, Vec<Confirmation>>,
}

impl ConfirmationLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record a confirmation and return the new count for the proposal
    ///
    /// # Errors
    /// Returns `AlreadyConfirmed` if the owner already holds a
    /// confirmation on this proposal.
    pub fn add(&mut self, id: u64, owner: &str) -> Result<usize, MultisigError> {
        let confirmations = self.entries.entry(id).or_default();

        if confirmations.iter().any(|c| c.owner == owner) {
            return Err(MultisigError::AlreadyConfirmed {
                id,
                owner: owner.to_string(),
            });
        }

        confirmations.push(Confirmation {
            owner: owner.to_string(),
            confirmed_at: Utc::now(),
        });

        Ok(confirmations.len())
    }

    /// Remove an owner's confirmation and return the new count
    ///
    /// # Errors
    /// Returns `NotYetConfirmed` if the owner holds no confirmation on
    /// this proposal.
    pub fn remove(&mut self, id: u64, owner: &str) -> Result<usize, MultisigError> {
        let confirmations = self.entries.entry(id).or_default();

        let index = confirmations
            .iter()
            .position(|c| c.owner == owner)
            .ok_or_else(|| MultisigError::NotYetConfirmed {
                id,
                owner: owner.to_string(),
            })?;

        confirmations.remove(index);
        Ok(confirmations.len())
    }

    /// Number of confirmations recorded for a proposal
    pub fn count(&self, id: u64) -> usize {
        self.entries.get(&id).map(|c| c.len()).unwrap_or(0)
    }

    /// Check if an owner has confirmed a proposal
    pub fn is_confirmed(&self, id: u64, owner: &str) -> bool {
        self.entries
            .get(&id)
            .map(|c| c.iter().any(|conf| conf.owner == owner))
            .unwrap_or(false)
    }

    /// Owners who have confirmed a proposal, in confirmation order
    pub fn confirmers(&self, id: u64) -> Vec<&str> {
        self.entries
            .get(&id)
            .map(|c| c.iter().map(|conf| conf.owner.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut ledger = ConfirmationLedger::new();

        assert_eq!(ledger.count(0), 0);
        assert_eq!(ledger.add(0, "alice").unwrap(), 1);
        assert_eq!(ledger.add(0, "bob").unwrap(), 2);
        assert_eq!(ledger.count(0), 2);

        // Independent proposals have independent counts
        assert_eq!(ledger.add(1, "alice").unwrap(), 1);
        assert_eq!(ledger.count(0), 2);
    }

    #[test]
    fn test_duplicate_confirmation_rejected() {
        let mut ledger = ConfirmationLedger::new();

        ledger.add(0, "alice").unwrap();
        let result = ledger.add(0, "alice");
        assert!(matches!(
            result,
            Err(MultisigError::AlreadyConfirmed { id: 0, .. })
        ));

        // Count unchanged by the rejected attempt
        assert_eq!(ledger.count(0), 1);
    }

    #[test]
    fn test_remove() {
        let mut ledger = ConfirmationLedger::new();

        ledger.add(0, "alice").unwrap();
        ledger.add(0, "bob").unwrap();

        assert_eq!(ledger.remove(0, "alice").unwrap(), 1);
        assert!(!ledger.is_confirmed(0, "alice"));
        assert!(ledger.is_confirmed(0, "bob"));

        // Removing a confirmation that does not exist
        assert!(matches!(
            ledger.remove(0, "alice"),
            Err(MultisigError::NotYetConfirmed { id: 0, .. })
        ));
    }

    #[test]
    fn test_revoke_reconfirm_roundtrip() {
        let mut ledger = ConfirmationLedger::new();

        let after_first = ledger.add(0, "alice").unwrap();
        ledger.remove(0, "alice").unwrap();
        let after_second = ledger.add(0, "alice").unwrap();

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_confirmers() {
        let mut ledger = ConfirmationLedger::new();

        ledger.add(0, "bob").unwrap();
        ledger.add(0, "alice").unwrap();

        assert_eq!(ledger.confirmers(0), vec!["bob", "alice"]);
        assert!(ledger.confirmers(7).is_empty());
    }
}
