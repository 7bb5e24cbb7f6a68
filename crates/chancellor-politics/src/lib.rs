//! Legislature model for the Chancellor simulation.
//!
//! Everything here operates on plain data from `chancellor-types` and
//! never touches I/O. Stance scoring is a pure function of its inputs;
//! the vote simulator and lobbying take an injected RNG so callers decide
//! between reproducible and live sampling.
//!
//! # Modules
//!
//! - [`roster`] -- Deterministic roster generation ([`RosterConfig`])
//! - [`stance`] -- Per-member stance scoring ([`score_all`])
//! - [`blocs`] -- Materiality-gated bloc summaries ([`BlocTracker`])
//! - [`debounce`] -- Coalescing of rapid recomputation requests ([`Debouncer`])
//! - [`vote`] -- Granular and aggregate vote simulation ([`simulate_vote`])
//! - [`lobbying`] -- Direct lobbying of individual members ([`lobby`])
//! - [`promises`] -- Promise evaluation after ledger commits
//! - [`keys`] -- Stable hashing for per-member randomness
//! - [`error`] -- Error types ([`PoliticsError`])

pub mod blocs;
pub mod debounce;
pub mod error;
pub mod keys;
pub mod lobbying;
pub mod promises;
pub mod roster;
pub mod stance;
pub mod vote;

// Re-export primary types at crate root for convenience.
pub use blocs::{BlocTracker, summarize};
pub use debounce::Debouncer;
pub use error::PoliticsError;
pub use keys::{stable_hash, stable_unit};
pub use lobbying::{LobbyConfig, LobbyOutcome, lobby};
pub use promises::{evaluate_promises, promise_broken};
pub use roster::{MAX_SEATS, RosterConfig, generate_roster};
pub use stance::{StanceConfig, StanceContext, clear_overrides, policy_lean, score_all};
pub use vote::{VoteConfig, VoteInput, VoteOutcome, aggregate_loyalty, simulate_vote};
