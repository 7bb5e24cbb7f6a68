//! Error types for the chancellor-core crate.
//!
//! None of these escape a public state transition. Transitions recover
//! locally (defaults, regeneration, unchanged state) and log; the typed
//! errors exist so the recovery sites can say exactly what went wrong.

use chancellor_ledger::LedgerError;
use chancellor_politics::PoliticsError;

use crate::config::ConfigError;
use crate::persistence::StoreError;

/// Errors that can occur while loading, saving or advancing a game.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A persisted sub-tree could not be decoded.
    #[error("malformed save data in '{subsystem}': {reason}")]
    MalformedSaveData {
        /// Top-level key of the affected sub-tree.
        subsystem: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The roster was needed but could not be found or generated.
    #[error("roster data missing: {reason}")]
    MissingRosterData {
        /// Why the roster is unavailable.
        reason: String,
    },

    /// A transition referenced something that does not exist.
    #[error("invalid transition: {reason}")]
    InvalidTransition {
        /// What was referenced.
        reason: String,
    },

    /// The key-value store rejected a read or write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The ledger rejected a change.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Roster generation failed.
    #[error("politics error: {0}")]
    Politics(#[from] PoliticsError),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
