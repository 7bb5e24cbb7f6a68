//! Fiscal ledger for the Chancellor simulation.
//!
//! The ledger owns the tax-rate and department-spending lines of
//! [`FiscalState`](chancellor_types::FiscalState). It applies sparse
//! budget deltas, recomputes aggregates from their parts and gates large
//! changes behind legislative friction. It never writes revenue, deficit,
//! debt or any other derived macro-fiscal field; those belong to the turn
//! orchestrator.
//!
//! # Modules
//!
//! - [`ledger`] -- Applying, previewing and committing budget changes.
//! - [`friction`] -- The friction gate that defers large changes.
//! - [`verify`] -- Aggregate invariant audit.
//! - [`projection`] -- Revenue estimate, fiscal projection and headroom.
//! - [`constraints`] -- Manifesto and fiscal-rule constraint checker.
//!
//! # Aggregate Invariant
//!
//! For every department D:
//!
//! ```text
//! departments[D].total == departments[D].current + departments[D].capital
//! total_spending       == sum(departments[*].total)
//! ```
//!
//! Aggregates are always recomputed from their parts and never adjusted
//! incrementally, so any sequence of deltas that nets to zero returns the
//! aggregates exactly to where they started.

pub mod constraints;
pub mod friction;
pub mod ledger;
pub mod projection;
pub mod verify;

// Re-export primary types at crate root.
pub use constraints::{auto_satisfy, check, check_changes, check_state};
pub use friction::FrictionConfig;
pub use ledger::{
    BudgetApplication, Disposition, adjust_department, apply_budget_changes, commit, preview,
    recompute_aggregates,
};
pub use projection::{FiscalProjection, Headroom, constraint_slack, estimate_revenue, headroom};
pub use verify::{LedgerCheck, verify_ledger};

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use chancellor_types::Department;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when applying budget changes.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A line-item override names an item that does not exist and does not
    /// say where a new one belongs.
    #[error("unknown line item '{key}' with no department or component")]
    UnknownLineItem {
        /// The line-item key.
        key: String,
    },

    /// Decimal arithmetic overflowed.
    #[error("ledger arithmetic overflow while {context}")]
    Overflow {
        /// What was being computed.
        context: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// Aggregate drift detected by [`verify_ledger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Per-department (stored total, recomputed total) where they differ.
    pub department_drift: BTreeMap<Department, (Decimal, Decimal)>,
    /// (stored, recomputed) grand total when they differ.
    pub total_drift: Option<(Decimal, Decimal)>,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
