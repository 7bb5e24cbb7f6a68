//! Error types for the chancellor-politics crate.

use chancellor_types::LegislatorId;

/// Errors raised by roster generation and member lookups.
#[derive(Debug, thiserror::Error)]
pub enum PoliticsError {
    /// The requested seat composition cannot be generated.
    #[error("invalid roster composition: {reason}")]
    InvalidComposition {
        /// Why the composition was rejected.
        reason: String,
    },

    /// No member with this id sits in the roster.
    #[error("unknown legislator: {id}")]
    UnknownLegislator {
        /// The id looked up.
        id: LegislatorId,
    },

    /// A granular operation ran before the roster was populated.
    #[error("legislator roster has not been populated")]
    MissingRoster,
}
