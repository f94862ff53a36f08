//! The approval state aggregate and execution gate
//!
//! `MultisigState` holds the owner registry, proposal store, and
//! confirmation ledger behind one mutation surface, so every operation is
//! a single critical section from the caller's point of view.

use crate::effect::ExecutionEffect;
use crate::engine::error::MultisigError;
use crate::engine::ledger::ConfirmationLedger;
use crate::engine::proposal::{Proposal, ProposalStore};
use crate::engine::registry::OwnerRegistry;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Complete approval state for one multisig wallet
///
/// All mutating operations take `&mut self`, so a shared instance has a
/// single writer at a time by construction. Errors other than
/// `EffectFailed` are raised before any state is touched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigState {
    registry: OwnerRegistry,
    proposals: ProposalStore,
    ledger: ConfirmationLedger,
}

impl MultisigState {
    /// Create a new state with the given owner registry
    pub fn new(registry: OwnerRegistry) -> Self {
        Self {
            registry,
            proposals: ProposalStore::new(),
            ledger: ConfirmationLedger::new(),
        }
    }

    /// Construct directly from owners and threshold
    pub fn with_owners(owners: Vec<String>, threshold: usize) -> Result<Self, MultisigError> {
        Ok(Self::new(OwnerRegistry::new(owners, threshold)?))
    }

    /// Submit a new proposal, returning its id
    pub fn submit(
        &mut self,
        proposer: &str,
        target: &str,
        value: u64,
        payload: Vec<u8>,
    ) -> Result<u64, MultisigError> {
        self.registry.require_owner(proposer)?;

        let id = self
            .proposals
            .add(proposer.to_string(), target.to_string(), value, payload);

        info!(
            "proposal {} submitted by {} (target={}, value={})",
            id, proposer, target, value
        );

        Ok(id)
    }

    /// Record an owner's confirmation, returning the new count
    ///
    /// Reaching the threshold does not trigger execution; `execute` is a
    /// separate, explicit call.
    pub fn confirm(&mut self, owner: &str, id: u64) -> Result<usize, MultisigError> {
        self.registry.require_owner(owner)?;

        let proposal = self.proposals.get(id)?;
        if proposal.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }

        let count = self.ledger.add(id, owner)?;

        debug!(
            "proposal {} confirmed by {} ({}/{})",
            id,
            owner,
            count,
            self.registry.threshold()
        );

        Ok(count)
    }

    /// Withdraw an owner's confirmation, returning the new count
    pub fn revoke(&mut self, owner: &str, id: u64) -> Result<usize, MultisigError> {
        self.registry.require_owner(owner)?;

        let proposal = self.proposals.get(id)?;
        if proposal.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }

        let count = self.ledger.remove(id, owner)?;

        debug!("proposal {} confirmation revoked by {}", id, owner);

        Ok(count)
    }

    /// Execute a proposal that has reached quorum
    ///
    /// The `executed` flag is set provisionally before the effect is
    /// invoked and rolled back if the effect fails, all within one
    /// critical section. A re-entrant `execute` on the same id issued by
    /// the effect itself observes the provisional flag and is rejected
    /// with `AlreadyExecuted`; a failed effect leaves the proposal exactly
    /// as it was before the call, so it can be retried.
    pub fn execute(
        &mut self,
        caller: &str,
        id: u64,
        effect: &mut dyn ExecutionEffect,
    ) -> Result<(), MultisigError> {
        self.registry.require_owner(caller)?;

        let have = self.ledger.count(id);
        let need = self.registry.threshold();

        let proposal = self.proposals.get_mut(id)?;
        if proposal.executed {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if have < need {
            return Err(MultisigError::InsufficientConfirmations { have, need });
        }

        // Provisional flag, committed only if the effect succeeds
        proposal.executed = true;

        if let Err(e) = effect.apply(&proposal.target, proposal.value, &proposal.payload) {
            proposal.executed = false;
            warn!("proposal {} execution failed, rolled back: {}", id, e);
            return Err(MultisigError::EffectFailed(e));
        }

        info!("proposal {} executed by {} ({} confirmations)", id, caller, have);

        Ok(())
    }

    /// Get a proposal by id
    pub fn get_proposal(&self, id: u64) -> Result<&Proposal, MultisigError> {
        self.proposals.get(id)
    }

    /// Check if an owner has confirmed a proposal
    pub fn is_confirmed(&self, id: u64, owner: &str) -> bool {
        self.ledger.is_confirmed(id, owner)
    }

    /// Number of confirmations on a proposal
    pub fn confirmation_count(&self, id: u64) -> usize {
        self.ledger.count(id)
    }

    /// Owners who have confirmed a proposal
    pub fn confirmers(&self, id: u64) -> Vec<&str> {
        self.ledger.confirmers(id)
    }

    /// The owner registry
    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// The authorized owners
    pub fn owners(&self) -> &[String] {
        self.registry.owners()
    }

    /// The quorum threshold
    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    /// All proposals in submission order
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Total number of proposals ever submitted
    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    /// Proposals not yet executed
    pub fn pending_proposals(&self) -> Vec<&Proposal> {
        self.proposals.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectError, RecordingEffect};

    fn test_state(threshold: usize) -> MultisigState {
        MultisigState::with_owners(
            vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_submit_and_query_roundtrip() {
        let mut state = test_state(2);

        let id = state.submit("alice", "treasury", 10, vec![0x01]).unwrap();
        assert_eq!(id, 0);

        let proposal = state.get_proposal(id).unwrap();
        assert_eq!(proposal.target, "treasury");
        assert_eq!(proposal.value, 10);
        assert_eq!(proposal.payload, vec![0x01]);
        assert!(!proposal.executed);
        assert_eq!(proposal.created_by, "alice");
        assert_eq!(state.confirmation_count(id), 0);
    }

    #[test]
    fn test_non_owner_rejected_without_mutation() {
        let mut state = test_state(2);
        let id = state.submit("alice", "treasury", 10, vec![]).unwrap();

        assert!(matches!(
            state.submit("mallory", "treasury", 10, vec![]),
            Err(MultisigError::NotAnOwner(_))
        ));
        assert!(matches!(
            state.confirm("mallory", id),
            Err(MultisigError::NotAnOwner(_))
        ));
        assert!(matches!(
            state.revoke("mallory", id),
            Err(MultisigError::NotAnOwner(_))
        ));
        let mut effect = RecordingEffect::new();
        assert!(matches!(
            state.execute("mallory", id, &mut effect),
            Err(MultisigError::NotAnOwner(_))
        ));

        // Nothing was recorded or altered
        assert_eq!(state.proposal_count(), 1);
        assert_eq!(state.confirmation_count(id), 0);
        assert_eq!(effect.invocations().len(), 0);
    }

    #[test]
    fn test_confirm_idempotency_guard() {
        let mut state = test_state(2);
        let id = state.submit("alice", "treasury", 10, vec![]).unwrap();

        assert_eq!(state.confirm("alice", id).unwrap(), 1);
        assert!(matches!(
            state.confirm("alice", id),
            Err(MultisigError::AlreadyConfirmed { .. })
        ));
        assert_eq!(state.confirmation_count(id), 1);
    }

    #[test]
    fn test_revoke_reconfirm_roundtrip() {
        let mut state = test_state(2);
        let id = state.submit("alice", "treasury", 10, vec![]).unwrap();

        let first = state.confirm("alice", id).unwrap();
        state.revoke("alice", id).unwrap();
        let second = state.confirm("alice", id).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_revoke_without_confirmation() {
        let mut state = test_state(2);
        let id = state.submit("alice", "treasury", 10, vec![]).unwrap();

        assert!(matches!(
            state.revoke("bob", id),
            Err(MultisigError::NotYetConfirmed { .. })
        ));
    }

    #[test]
    fn test_execute_below_quorum() {
        let mut state = test_state(2);
        let id = state.submit("alice", "treasury", 10, vec![]).unwrap();
        state.confirm("alice", id).unwrap();

        let mut effect = RecordingEffect::new();
        let result = state.execute("alice", id, &mut effect);

        assert!(matches!(
            result,
            Err(MultisigError::InsufficientConfirmations { have: 1, need: 2 })
        ));
        assert_eq!(effect.invocations().len(), 0);
        assert!(!state.get_proposal(id).unwrap().executed);
    }

    #[test]
    fn test_two_of_three_happy_path() {
        // owners=[alice,bob,carol], threshold=2
        let mut state = test_state(2);

        let id = state.submit("alice", "X", 10, vec![]).unwrap();
        assert_eq!(id, 0);

        state.confirm("alice", id).unwrap();
        assert_eq!(state.confirm("bob", id).unwrap(), 2);

        let mut effect = RecordingEffect::new();
        state.execute("alice", id, &mut effect).unwrap();

        // Effect invoked exactly once with the proposal contents
        assert_eq!(
            effect.invocations(),
            &[("X".to_string(), 10, Vec::<u8>::new())]
        );
        assert!(state.get_proposal(id).unwrap().executed);

        // Terminal: every further mutation on this proposal is rejected
        assert!(matches!(
            state.confirm("carol", id),
            Err(MultisigError::AlreadyExecuted(0))
        ));
        assert!(matches!(
            state.revoke("bob", id),
            Err(MultisigError::AlreadyExecuted(0))
        ));
        assert!(matches!(
            state.execute("bob", id, &mut effect),
            Err(MultisigError::AlreadyExecuted(0))
        ));
        assert_eq!(effect.invocations().len(), 1);
    }

    #[test]
    fn test_effect_failure_rolls_back_and_retries() {
        // owners=[alice,bob,carol], threshold=3
        let mut state = test_state(3);

        let id = state.submit("alice", "treasury", 50, vec![0xff]).unwrap();
        state.confirm("alice", id).unwrap();
        state.confirm("bob", id).unwrap();
        assert_eq!(state.confirm("carol", id).unwrap(), 3);

        // Effect fails once, then succeeds
        let mut effect = RecordingEffect::failing(1);

        let result = state.execute("alice", id, &mut effect);
        assert!(matches!(result, Err(MultisigError::EffectFailed(_))));

        // State identical to before the call
        assert!(!state.get_proposal(id).unwrap().executed);
        assert_eq!(state.confirmation_count(id), 3);

        // Retry succeeds once the effect recovers
        state.execute("alice", id, &mut effect).unwrap();
        assert!(state.get_proposal(id).unwrap().executed);
        assert_eq!(effect.invocations().len(), 1);
    }

    #[test]
    fn test_reentrant_execute_sees_provisional_flag() {
        // An effect that calls back into execute on the same id must be
        // rejected with AlreadyExecuted while the outer call is in flight.
        struct ReentrantEffect {
            inner: Option<MultisigState>,
            observed: Option<MultisigError>,
        }

        impl ExecutionEffect for ReentrantEffect {
            fn apply(
                &mut self,
                _target: &str,
                _value: u64,
                _payload: &[u8],
            ) -> Result<(), EffectError> {
                // Simulate the callback against a snapshot of the state as
                // the gate left it: provisional flag set.
                if let Some(state) = self.inner.as_mut() {
                    let mut noop = RecordingEffect::new();
                    self.observed = state.execute("alice", 0, &mut noop).err();
                }
                Ok(())
            }
        }

        let mut state = test_state(1);
        let id = state.submit("alice", "treasury", 1, vec![]).unwrap();
        state.confirm("alice", id).unwrap();

        // Snapshot with the provisional flag applied, as a callback would see
        let mut snapshot = state.clone();
        snapshot.proposals.get_mut(id).unwrap().executed = true;

        let mut effect = ReentrantEffect {
            inner: Some(snapshot),
            observed: None,
        };

        state.execute("alice", id, &mut effect).unwrap();
        assert!(matches!(
            effect.observed,
            Some(MultisigError::AlreadyExecuted(0))
        ));
    }

    #[test]
    fn test_cross_proposal_independence() {
        let mut state = test_state(1);

        let id0 = state.submit("alice", "x", 1, vec![]).unwrap();
        let id1 = state.submit("bob", "y", 2, vec![]).unwrap();

        state.confirm("alice", id0).unwrap();
        let mut effect = RecordingEffect::new();
        state.execute("alice", id0, &mut effect).unwrap();

        // Executing one proposal leaves the other untouched
        assert!(!state.get_proposal(id1).unwrap().executed);
        state.confirm("bob", id1).unwrap();
        state.execute("bob", id1, &mut effect).unwrap();
        assert_eq!(effect.invocations().len(), 2);
    }
}
