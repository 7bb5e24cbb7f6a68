//! Shared type definitions for the Chancellor fiscal simulation.
//!
//! This crate is the single source of truth for the game state tree and the
//! wire format it is persisted in. Types flow downstream to `TypeScript`
//! via `ts-rs` for the host interface.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes
//! - [`enums`] -- Departments, tax levers, stance bands, fiscal rules
//! - [`structs`] -- The [`GameState`] tree and its sub-trees
//! - [`budget`] -- Sparse budget proposals and friction outcomes
//! - [`vote`] -- Vote inputs, results and records
//! - [`codec`] -- Decoding of the three persisted container encodings

pub mod budget;
pub mod codec;
pub mod enums;
pub mod ids;
pub mod structs;
pub mod vote;

// Re-export all public types at crate root for convenience.
pub use budget::{BudgetChanges, DeferredBudget, DepartmentDelta, FrictionTrigger, LineItemOverride};
pub use codec::ContainerError;
pub use enums::{
    Ballot, ConstraintId, Department, EventKind, FiscalRuleKind, GameMode, LobbyApproach, Party,
    Region, RiskKind, RuleConstraint, Severity, SpendingComponent, StanceLabel, TaxLever,
    VoteMode, VoteNarrative,
};
pub use ids::{EventId, LegislatorId, ProgrammeId, PromiseId, RosterId};
pub use structs::{
    BlocSummary, ConstraintResult, Constituency, DEFAULT_TOTAL_TURNS, DepartmentBudget,
    EmergencyProgramme, EventEffect, EventLog, EventResponse, FiscalBaseline, FiscalState,
    GameState, Ideology, Legislator, Legislature, LineItem, MacroState, ManifestoPledge,
    ManifestoState, Metadata, PendingEvent, PolicyRiskModifier, PoliticalState, Promise,
    PromiseCategory, ResolvedEvent, SCHEMA_VERSION, Stance,
};
pub use vote::{VoteRecord, VoteResult, VoteSummary};
