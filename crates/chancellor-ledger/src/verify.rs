//! Aggregate invariant audit.
//!
//! Aggregates are recomputed on every ledger write, so a healthy state
//! always passes. The audit runs after loads and turn advances to catch
//! drift introduced by hand-edited or corrupted saves.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use chancellor_types::FiscalState;

use crate::LedgerAnomaly;

/// Outcome of [`verify_ledger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCheck {
    /// Every aggregate equals the sum of its parts.
    Consistent,
    /// At least one aggregate has drifted.
    Drift(LedgerAnomaly),
}

/// Compare every stored aggregate with one recomputed from its parts.
pub fn verify_ledger(fiscal: &FiscalState) -> LedgerCheck {
    let mut department_drift = BTreeMap::new();
    let mut recomputed_total = Decimal::ZERO;

    for (department, budget) in &fiscal.departments {
        let expected = budget.current.saturating_add(budget.capital);
        recomputed_total = recomputed_total.saturating_add(expected);
        if budget.total != expected {
            department_drift.insert(*department, (budget.total, expected));
        }
    }

    let total_drift =
        (fiscal.total_spending != recomputed_total).then_some((fiscal.total_spending, recomputed_total));

    if department_drift.is_empty() && total_drift.is_none() {
        return LedgerCheck::Consistent;
    }

    let count = department_drift.len();
    LedgerCheck::Drift(LedgerAnomaly {
        department_drift,
        total_drift,
        message: format!(
            "ledger drift: {count} department aggregate(s) disagree with their parts{}",
            if total_drift.is_some() {
                ", grand total disagrees with departments"
            } else {
                ""
            }
        ),
    })
}
