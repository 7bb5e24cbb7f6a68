//! Applying budget changes to the fiscal lines.
//!
//! Every function here works on a complete snapshot: it takes the current
//! state and returns the next one. There is no in-place partial patch of a
//! department that another caller could observe half-applied.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use chancellor_types::{
    BudgetChanges, DeferredBudget, Department, FiscalState, FrictionTrigger, GameState, LineItem,
    SpendingComponent,
};

use crate::LedgerError;
use crate::constraints::check_state;
use crate::friction::{FrictionConfig, assess};

/// Upper bound on any tax rate, percent.
const MAX_RATE: Decimal = Decimal::ONE_HUNDRED;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The changes were applied to the fiscal lines.
    Applied,
    /// The changes were queued by the friction gate.
    Deferred {
        /// Turn on which they take effect.
        apply_turn: u32,
    },
}

/// Result of [`apply_budget_changes`].
#[derive(Debug, Clone)]
pub struct BudgetApplication {
    /// The next state.
    pub state: GameState,
    /// Whether the changes took effect.
    pub disposition: Disposition,
    /// What tripped the friction gate, if anything.
    pub triggers: Vec<FrictionTrigger>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Recompute every department aggregate and the grand total from parts.
pub fn recompute_aggregates(fiscal: &mut FiscalState) {
    for budget in fiscal.departments.values_mut() {
        budget.total = budget.current.saturating_add(budget.capital);
    }
    fiscal.total_spending = fiscal
        .departments
        .values()
        .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.total));
}

/// Add `delta` to one component of a department, flooring it at zero.
///
/// Aggregates are recomputed before returning.
pub fn adjust_department(
    fiscal: &mut FiscalState,
    department: Department,
    component: SpendingComponent,
    delta: Decimal,
) -> Result<(), LedgerError> {
    let budget = fiscal.departments.entry(department).or_default();
    let line = match component {
        SpendingComponent::Current => &mut budget.current,
        SpendingComponent::Capital => &mut budget.capital,
    };
    let next = line.checked_add(delta).ok_or(LedgerError::Overflow {
        context: "adjusting a department line",
    })?;
    *line = next.max(Decimal::ZERO);
    recompute_aggregates(fiscal);
    Ok(())
}

// ---------------------------------------------------------------------------
// Preview and commit
// ---------------------------------------------------------------------------

/// Project `changes` onto a copy of `fiscal` without any gating.
///
/// Tax rates are clamped to 0--100 and spending lines floored at zero.
/// Derived macro-fiscal fields are carried over untouched.
pub fn preview(fiscal: &FiscalState, changes: &BudgetChanges) -> Result<FiscalState, LedgerError> {
    let mut next = fiscal.clone();

    for (lever, delta) in &changes.tax_deltas {
        let rate = next.tax_rates.entry(*lever).or_default();
        let raised = rate.checked_add(*delta).ok_or(LedgerError::Overflow {
            context: "applying a tax delta",
        })?;
        *rate = raised.clamp(Decimal::ZERO, MAX_RATE);
    }

    for (department, delta) in &changes.department_deltas {
        let budget = next.departments.entry(*department).or_default();
        budget.current = budget
            .current
            .checked_add(delta.current)
            .ok_or(LedgerError::Overflow {
                context: "applying a current-spending delta",
            })?
            .max(Decimal::ZERO);
        budget.capital = budget
            .capital
            .checked_add(delta.capital)
            .ok_or(LedgerError::Overflow {
                context: "applying a capital-spending delta",
            })?
            .max(Decimal::ZERO);
    }

    for (key, item) in &changes.line_items {
        let (department, component, previous) = match next.line_items.get(key) {
            Some(existing) => (existing.department, existing.component, existing.amount),
            None => match (item.department, item.component) {
                (Some(d), Some(c)) => (d, c, Decimal::ZERO),
                _ => return Err(LedgerError::UnknownLineItem { key: key.clone() }),
            },
        };
        let diff = item.amount.checked_sub(previous).ok_or(LedgerError::Overflow {
            context: "applying a line-item override",
        })?;
        adjust_department(&mut next, department, component, diff)?;
        next.line_items.insert(
            key.clone(),
            LineItem {
                department,
                component,
                amount: item.amount.max(Decimal::ZERO),
            },
        );
    }

    recompute_aggregates(&mut next);
    Ok(next)
}

/// Apply `changes` to the fiscal lines of `state` without the friction gate.
///
/// Used for deferred budgets whose apply turn has arrived.
pub fn commit(mut state: GameState, changes: &BudgetChanges) -> Result<GameState, LedgerError> {
    state.fiscal = preview(&state.fiscal, changes)?;
    debug!(
        turn = state.metadata.turn,
        total_spending = %state.fiscal.total_spending,
        "budget committed to ledger"
    );
    Ok(state)
}

/// Apply a submission through the friction gate.
///
/// Changes that trip the gate are queued whole with an apply turn of
/// `turn + base_delay`, extended by `repeat_extension` for each further
/// deferral while a delay is already active. The legislative-delay flag is
/// set or extended and credibility is charged immediately. The constraint
/// check runs afterwards in every case and is stored on the manifesto.
pub fn apply_budget_changes(
    mut state: GameState,
    changes: &BudgetChanges,
    config: &FrictionConfig,
) -> Result<BudgetApplication, LedgerError> {
    let proposed = preview(&state.fiscal, changes)?;
    let triggers = assess(&state.fiscal, &proposed, state.economy.inflation_pct, changes, config);

    let disposition = if triggers.is_empty() {
        state.fiscal = proposed;
        Disposition::Applied
    } else {
        let turn = state.metadata.turn;
        let legislature = &mut state.legislature;
        let delay_active = legislature.delay_until_turn.is_some_and(|until| until > turn);
        legislature.delay_extensions = if delay_active {
            legislature.delay_extensions.saturating_add(1)
        } else {
            0
        };
        let apply_turn = turn
            .saturating_add(config.base_delay_turns)
            .saturating_add(
                config
                    .repeat_extension_turns
                    .saturating_mul(legislature.delay_extensions),
            );
        legislature.delay_until_turn = Some(
            legislature
                .delay_until_turn
                .filter(|_| delay_active)
                .map_or(apply_turn, |until| until.max(apply_turn)),
        );

        state.political.credibility =
            (state.political.credibility - config.credibility_penalty).clamp(0.0, 100.0);
        state.pending_budgets.push(DeferredBudget {
            changes: changes.clone(),
            submitted_turn: turn,
            apply_turn,
            triggers: triggers.clone(),
        });
        warn!(
            turn,
            apply_turn,
            triggers = triggers.len(),
            "budget deferred by legislative friction"
        );
        Disposition::Deferred { apply_turn }
    };

    state.manifesto.last_check = check_state(&state);
    Ok(BudgetApplication {
        state,
        disposition,
        triggers,
    })
}
