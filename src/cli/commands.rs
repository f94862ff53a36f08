//! CLI commands for the approval engine
//!
//! Implements all command handlers for the CLI interface. Every mutating
//! command loads the state, applies one operation, and saves the state
//! back through the storage layer.

use crate::effect::LogEffect;
use crate::engine::MultisigState;
use crate::storage::{Storage, StorageConfig};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub state: MultisigState,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from the data directory
    ///
    /// Fails if no wallet has been initialized yet; use `cmd_init` first.
    pub fn load(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };

        let storage = Storage::new(storage_config)?;

        if !storage.exists() {
            return Err(format!(
                "No wallet found in {:?}. Run 'quorumsig init' first.",
                data_dir
            )
            .into());
        }

        let state = storage.load()?;

        Ok(Self {
            state,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.state)?;
        Ok(())
    }
}

/// Initialize a new multisig wallet
pub fn cmd_init(data_dir: &Path, owners: Vec<String>, threshold: usize) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };

    let storage = Storage::new(storage_config)?;

    if storage.exists() {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        println!("   The owner registry is immutable; to change it, delete the data directory.");
        return Ok(());
    }

    let state = MultisigState::with_owners(owners, threshold)?;
    storage.save(&state)?;

    println!("✅ Multisig wallet initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔐 Quorum: {}", state.registry().description());
    println!(
        "   🆔 Fingerprint: {}...",
        &state.registry().fingerprint()[..32]
    );
    for owner in state.owners() {
        println!("   👤 {}", owner);
    }

    Ok(())
}

/// Submit a new proposal
pub fn cmd_submit(
    app: &mut AppState,
    proposer: &str,
    target: &str,
    value: u64,
    payload_hex: Option<&str>,
) -> CliResult<()> {
    let payload = match payload_hex {
        Some(s) => hex::decode(s)?,
        None => Vec::new(),
    };

    let id = app.state.submit(proposer, target, value, payload)?;
    app.save()?;

    println!("📤 Proposal submitted:");
    println!("   ID: {}", id);
    println!("   Proposer: {}", proposer);
    println!("   Target: {}", target);
    println!("   Value: {}", value);
    println!(
        "\n   {} confirmation(s) needed before execution.",
        app.state.threshold()
    );

    Ok(())
}

/// Confirm a proposal
pub fn cmd_confirm(app: &mut AppState, owner: &str, id: u64) -> CliResult<()> {
    let count = app.state.confirm(owner, id)?;
    app.save()?;

    let need = app.state.threshold();
    println!("✍️  Confirmation recorded for proposal {}", id);
    println!("   Confirmations: {}/{}", count, need);

    if count >= need {
        println!(
            "   ✅ Quorum reached! Execute with: quorumsig execute --caller <owner> --id {}",
            id
        );
    }

    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(app: &mut AppState, owner: &str, id: u64) -> CliResult<()> {
    let count = app.state.revoke(owner, id)?;
    app.save()?;

    println!("↩️  Confirmation revoked for proposal {}", id);
    println!("   Confirmations: {}/{}", count, app.state.threshold());

    Ok(())
}

/// Execute a proposal that has reached quorum
pub fn cmd_execute(app: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    let mut effect = LogEffect::new();

    app.state.execute(caller, id, &mut effect)?;
    app.save()?;

    let proposal = app.state.get_proposal(id)?;
    println!("🚀 Proposal {} executed!", id);
    println!("   Target: {}", proposal.target);
    println!("   Value: {}", proposal.value);
    if !proposal.payload.is_empty() {
        println!("   Payload: {}", hex::encode(&proposal.payload));
    }

    Ok(())
}

/// JSON view of the owner registry
fn owners_value(app: &AppState) -> serde_json::Value {
    let registry = app.state.registry();
    json!({
        "owners": registry.owners(),
        "threshold": registry.threshold(),
        "fingerprint": registry.fingerprint(),
    })
}

/// JSON view of one proposal with its confirmations
fn proposal_value(app: &AppState, id: u64) -> CliResult<serde_json::Value> {
    let proposal = app.state.get_proposal(id)?;
    Ok(json!({
        "proposal": serde_json::to_value(proposal)?,
        "confirmations": app.state.confirmation_count(id),
        "threshold": app.state.threshold(),
        "confirmed_by": app.state.confirmers(id),
    }))
}

/// Show the owner registry
pub fn cmd_owners(app: &AppState, json_output: bool) -> CliResult<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&owners_value(app))?);
        return Ok(());
    }

    let registry = app.state.registry();

    println!("🔐 Owner registry ({})", registry.description());
    println!("   Fingerprint: {}...", &registry.fingerprint()[..32]);
    for owner in registry.owners() {
        println!("   👤 {}", owner);
    }

    Ok(())
}

/// Show the quorum threshold
pub fn cmd_threshold(app: &AppState, json_output: bool) -> CliResult<()> {
    if json_output {
        let value = json!({
            "threshold": app.state.threshold(),
            "owner_count": app.state.registry().owner_count(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "🔢 Threshold: {} of {} owners",
        app.state.threshold(),
        app.state.registry().owner_count()
    );
    Ok(())
}

/// Show a single proposal
pub fn cmd_proposal(app: &AppState, id: u64, json_output: bool) -> CliResult<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&proposal_value(app, id)?)?);
        return Ok(());
    }

    let proposal = app.state.get_proposal(id)?;
    let count = app.state.confirmation_count(id);

    println!("📋 Proposal {}", proposal.id);
    println!("   ├─ Target: {}", proposal.target);
    println!("   ├─ Value: {}", proposal.value);
    if proposal.payload.is_empty() {
        println!("   ├─ Payload: (empty)");
    } else {
        println!("   ├─ Payload: {}", hex::encode(&proposal.payload));
    }
    println!("   ├─ Status: {}", proposal.status());
    println!("   ├─ Submitted by: {}", proposal.created_by);
    println!(
        "   ├─ Submitted at: {}",
        proposal.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   └─ Confirmations: {}/{}",
        count,
        app.state.threshold()
    );

    let confirmers = app.state.confirmers(id);
    if !confirmers.is_empty() {
        println!("\n   Confirmed by:");
        for owner in confirmers {
            println!("   └─ {}", owner);
        }
    }

    Ok(())
}

/// JSON view of the proposal list
fn proposals_value(app: &AppState, pending_only: bool) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = app
        .state
        .proposals()
        .filter(|p| !pending_only || !p.executed)
        .map(|p| {
            json!({
                "id": p.id,
                "target": p.target,
                "value": p.value,
                "status": p.status(),
                "confirmations": app.state.confirmation_count(p.id),
            })
        })
        .collect();

    json!({
        "proposals": rows,
        "threshold": app.state.threshold(),
    })
}

/// List proposals, optionally only the pending ones
pub fn cmd_proposals(app: &AppState, pending_only: bool, json_output: bool) -> CliResult<()> {
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&proposals_value(app, pending_only))?
        );
        return Ok(());
    }

    if app.state.proposal_count() == 0 {
        println!("📭 No proposals yet. Create one with: quorumsig submit");
        return Ok(());
    }

    let proposals = if pending_only {
        app.state.pending_proposals()
    } else {
        app.state.proposals().collect()
    };

    if proposals.is_empty() {
        println!("📭 No pending proposals.");
        return Ok(());
    }

    println!("📋 Proposals ({}):", proposals.len());
    for proposal in proposals {
        println!(
            "   #{} | {} | value {} | {} | {}/{} confirmations",
            proposal.id,
            proposal.target,
            proposal.value,
            proposal.status(),
            app.state.confirmation_count(proposal.id),
            app.state.threshold()
        );
    }

    Ok(())
}

/// Show confirmation count and confirmers for a proposal
pub fn cmd_confirmations(app: &AppState, id: u64, json_output: bool) -> CliResult<()> {
    // Surface ProposalNotFound for bad ids
    app.state.get_proposal(id)?;

    if json_output {
        let value = json!({
            "id": id,
            "confirmations": app.state.confirmation_count(id),
            "threshold": app.state.threshold(),
            "confirmed_by": app.state.confirmers(id),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let count = app.state.confirmation_count(id);
    println!(
        "✍️  Proposal {} has {}/{} confirmations",
        id,
        count,
        app.state.threshold()
    );

    for owner in app.state.confirmers(id) {
        println!("   └─ {}", owner);
    }

    Ok(())
}

/// Check whether a specific owner has confirmed a proposal
pub fn cmd_is_confirmed(app: &AppState, id: u64, owner: &str, json_output: bool) -> CliResult<()> {
    app.state.get_proposal(id)?;

    if json_output {
        let value = json!({
            "id": id,
            "owner": owner,
            "confirmed": app.state.is_confirmed(id, owner),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if app.state.is_confirmed(id, owner) {
        println!("✅ {} has confirmed proposal {}", owner, id);
    } else {
        println!("❌ {} has not confirmed proposal {}", owner, id);
    }

    Ok(())
}
