//! Thread-safe shared handle to the approval state
//!
//! Every operation locks the whole state for its duration, so mutations
//! from different callers are applied in some total serial order and no
//! caller ever observes a partially-applied transition. The execution
//! effect is invoked while the lock is held; no operation in this core
//! suspends on I/O, so a plain mutex is sufficient.

use crate::effect::ExecutionEffect;
use crate::engine::error::MultisigError;
use crate::engine::proposal::Proposal;
use crate::engine::state::MultisigState;
use std::sync::{Arc, Mutex};

/// Cloneable, thread-safe handle to a `MultisigState`
#[derive(Clone, Debug)]
pub struct SharedState {
    inner: Arc<Mutex<MultisigState>>,
}

impl SharedState {
    /// Wrap a state in a shared handle
    pub fn new(state: MultisigState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MultisigState> {
        // No operation leaves the state partially applied, so recover on poison
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Submit a new proposal, returning its id
    pub fn submit(
        &self,
        proposer: &str,
        target: &str,
        value: u64,
        payload: Vec<u8>,
    ) -> Result<u64, MultisigError> {
        self.lock().submit(proposer, target, value, payload)
    }

    /// Record an owner's confirmation, returning the new count
    pub fn confirm(&self, owner: &str, id: u64) -> Result<usize, MultisigError> {
        self.lock().confirm(owner, id)
    }

    /// Withdraw an owner's confirmation, returning the new count
    pub fn revoke(&self, owner: &str, id: u64) -> Result<usize, MultisigError> {
        self.lock().revoke(owner, id)
    }

    /// Execute a proposal that has reached quorum
    ///
    /// Holds the state lock across the effect invocation, so the
    /// provisional `executed` flag is never visible to other callers
    /// except as a committed transition.
    pub fn execute(
        &self,
        caller: &str,
        id: u64,
        effect: &mut dyn ExecutionEffect,
    ) -> Result<(), MultisigError> {
        self.lock().execute(caller, id, effect)
    }

    /// Get a copy of a proposal by id
    pub fn get_proposal(&self, id: u64) -> Result<Proposal, MultisigError> {
        self.lock().get_proposal(id).cloned()
    }

    /// Check if an owner has confirmed a proposal
    pub fn is_confirmed(&self, id: u64, owner: &str) -> bool {
        self.lock().is_confirmed(id, owner)
    }

    /// Number of confirmations on a proposal
    pub fn confirmation_count(&self, id: u64) -> usize {
        self.lock().confirmation_count(id)
    }

    /// The authorized owners
    pub fn owners(&self) -> Vec<String> {
        self.lock().owners().to_vec()
    }

    /// The quorum threshold
    pub fn threshold(&self) -> usize {
        self.lock().threshold()
    }

    /// Run a closure against the locked state
    pub fn with_state<T>(&self, f: impl FnOnce(&MultisigState) -> T) -> T {
        f(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::RecordingEffect;
    use std::thread;

    fn shared_state(threshold: usize) -> SharedState {
        SharedState::new(
            MultisigState::with_owners(
                vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
                threshold,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_concurrent_confirmations_stay_unique() {
        let shared = shared_state(3);
        let id = shared.submit("alice", "treasury", 10, vec![]).unwrap();

        let mut handles = Vec::new();
        for owner in ["alice", "bob", "carol"] {
            // Each owner tries to confirm the same proposal twice
            for _ in 0..2 {
                let shared = shared.clone();
                handles.push(thread::spawn(move || shared.confirm(owner, id).is_ok()));
            }
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // Exactly one confirmation per owner survives
        assert_eq!(successes, 3);
        assert_eq!(shared.confirmation_count(id), 3);
    }

    #[test]
    fn test_concurrent_execute_exactly_once() {
        let shared = shared_state(1);
        let id = shared.submit("alice", "treasury", 10, vec![]).unwrap();
        shared.confirm("alice", id).unwrap();

        let mut handles = Vec::new();
        for owner in ["alice", "bob", "carol"] {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                let mut effect = RecordingEffect::new();
                let won = shared.execute(owner, id, &mut effect).is_ok();
                (won, effect.invocations().len())
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Exactly one caller wins, and only the winner's effect ran
        assert_eq!(results.iter().filter(|(won, _)| *won).count(), 1);
        for (won, invocations) in results {
            assert_eq!(invocations, if won { 1 } else { 0 });
        }
        assert!(shared.get_proposal(id).unwrap().executed);

        // The committed transition is visible through the locked view
        assert_eq!(shared.with_state(|s| s.pending_proposals().len()), 0);
        assert_eq!(shared.with_state(|s| s.proposal_count()), 1);
    }
}
