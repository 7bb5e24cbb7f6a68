//! Game orchestration for the Chancellor simulation.
//!
//! This crate ties the ledger and the legislature together into the state
//! transitions a host drives: new game, budget submission, turn advance,
//! event responses, save and load. Every transition takes a [`GameState`]
//! by value and returns the next one; recoverable failures are logged and
//! turned into a fallback rather than returned.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `chancellor-config.yaml`.
//! - [`clock`] -- Calendar months and fiscal years.
//! - [`economy`] -- [`MonthlySimulation`] trait and [`BaselineEconomy`].
//! - [`game`] -- New-game construction and roster recovery.
//! - [`normalize`] -- Save-data normalization and migration.
//! - [`turn`] -- The monthly turn.
//! - [`events`] -- Scheduled events and responses.
//! - [`submission`] -- Budget votes.
//! - [`preview`] -- Debounced stance preview for draft budgets.
//! - [`persistence`] -- Save slots and roster blobs over a [`KeyValueStore`].
//! - [`error`] -- Error types ([`CoreError`]).
//!
//! [`GameState`]: chancellor_types::GameState

pub mod clock;
pub mod config;
pub mod economy;
pub mod error;
pub mod events;
pub mod game;
pub mod normalize;
pub mod persistence;
pub mod preview;
pub mod submission;
pub mod turn;

pub use config::{ConfigError, GameConfig};
pub use economy::{BaselineEconomy, MonthlySimulation};
pub use error::CoreError;
pub use events::{raise_event, raise_events, respond_to_event};
pub use game::{default_state, ensure_roster, new_game_state};
pub use normalize::normalize;
pub use persistence::{InMemoryStore, KeyValueStore, SaveReport, StoreError, load_game, save_game};
pub use preview::{PreviewUpdate, StancePreview};
pub use submission::{SubmissionOutcome, submit_budget, withdraw_budget};
pub use turn::advance_turn;
