//! Execution effects
//!
//! The external operation performed when a proposal is executed. The
//! engine treats the effect as opaque: it is handed `(target, value,
//! payload)`, may take arbitrary time, and may fail. The real mechanism
//! (fund transfer, contract call, token mint) lives outside this crate.

use log::info;
use thiserror::Error;

/// Failure reported by an execution effect
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct EffectError {
    /// Effect-specific failure description
    pub reason: String,
}

impl EffectError {
    /// Create a new effect error
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Contract for the external operation gated by the approval engine
pub trait ExecutionEffect {
    /// Carry out the approved action
    ///
    /// Must report failure rather than panicking; on failure the engine
    /// rolls the proposal back so the caller can retry later.
    fn apply(&mut self, target: &str, value: u64, payload: &[u8]) -> Result<(), EffectError>;
}

/// Effect that logs the approved action and always succeeds
///
/// The CLI's default effect: the engine's job ends at the approval gate,
/// so the "execution" is a structured log line an operator can wire into
/// whatever actually moves funds.
#[derive(Debug, Default)]
pub struct LogEffect;

impl LogEffect {
    /// Create a new log effect
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionEffect for LogEffect {
    fn apply(&mut self, target: &str, value: u64, payload: &[u8]) -> Result<(), EffectError> {
        info!(
            "effect applied: target={} value={} payload={}",
            target,
            value,
            hex::encode(payload)
        );
        Ok(())
    }
}

/// Effect that records every invocation, optionally failing first
///
/// Used by tests to verify exactly-once invocation and the rollback path:
/// `failing(n)` makes the first `n` applies fail before any invocation is
/// recorded.
#[derive(Debug, Default)]
pub struct RecordingEffect {
    invocations: Vec<(String, u64, Vec<u8>)>,
    failures_remaining: usize,
}

impl RecordingEffect {
    /// Create an effect that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an effect that fails the first `failures` applies
    pub fn failing(failures: usize) -> Self {
        Self {
            invocations: Vec::new(),
            failures_remaining: failures,
        }
    }

    /// Successful invocations recorded so far
    pub fn invocations(&self) -> &[(String, u64, Vec<u8>)] {
        &self.invocations
    }
}

impl ExecutionEffect for RecordingEffect {
    fn apply(&mut self, target: &str, value: u64, payload: &[u8]) -> Result<(), EffectError> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(EffectError::new("target unreachable"));
        }

        self.invocations
            .push((target.to_string(), value, payload.to_vec()));
        Ok(())
    }
}
