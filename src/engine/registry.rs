//! Owner registry
//!
//! The immutable set of principals authorized to submit, confirm, and
//! execute proposals, together with the M-of-N quorum threshold.

use crate::engine::error::MultisigError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The authorized owner set and quorum threshold for a wallet
///
/// Created once at construction and never mutated afterwards. Owner-set
/// rotation is deliberately unsupported; replacing the owners means
/// creating a new registry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OwnerRegistry {
    /// Authorized principals, in registration order
    owners: Vec<String>,
    /// Minimum confirmations required (M in M-of-N)
    threshold: usize,
}

impl OwnerRegistry {
    /// Create a new registry
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if `owners` is empty, contains
    /// duplicates, or `threshold` is outside `[1, owners.len()]`.
    pub fn new(owners: Vec<String>, threshold: usize) -> Result<Self, MultisigError> {
        if owners.is_empty() {
            return Err(MultisigError::InvalidConfiguration(
                "owner set must not be empty".to_string(),
            ));
        }

        if threshold == 0 {
            return Err(MultisigError::InvalidConfiguration(
                "threshold must be at least 1".to_string(),
            ));
        }

        if threshold > owners.len() {
            return Err(MultisigError::InvalidConfiguration(format!(
                "threshold {} exceeds owner count {}",
                threshold,
                owners.len()
            )));
        }

        // Check for duplicates
        let mut sorted_owners = owners.clone();
        sorted_owners.sort();
        for i in 1..sorted_owners.len() {
            if sorted_owners[i] == sorted_owners[i - 1] {
                return Err(MultisigError::InvalidConfiguration(format!(
                    "duplicate owner: {}",
                    sorted_owners[i]
                )));
            }
        }

        Ok(Self { owners, threshold })
    }

    /// Check if a principal is an authorized owner
    pub fn is_owner(&self, principal: &str) -> bool {
        self.owners.iter().any(|o| o == principal)
    }

    /// Fail with `NotAnOwner` unless the principal is authorized
    pub fn require_owner(&self, principal: &str) -> Result<(), MultisigError> {
        if self.is_owner(principal) {
            Ok(())
        } else {
            Err(MultisigError::NotAnOwner(principal.to_string()))
        }
    }

    /// Get the owners in registration order
    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// Get the quorum threshold (M)
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Get the total owner count (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }

    /// Deterministic identifier for this registry
    ///
    /// Fingerprint = hex(SHA256(threshold || sorted_owners)). The same
    /// owner set and threshold always yield the same fingerprint, in any
    /// registration order.
    pub fn fingerprint(&self) -> String {
        let mut sorted_owners = self.owners.clone();
        sorted_owners.sort();

        let mut hasher = Sha256::new();
        hasher.update(self.threshold.to_le_bytes());
        for owner in &sorted_owners {
            hasher.update(owner.as_bytes());
        }

        hex::encode(hasher.finalize())
    }
}
