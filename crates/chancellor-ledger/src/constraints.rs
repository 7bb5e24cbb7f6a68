//! Manifesto and fiscal-rule constraint checker.
//!
//! Static constraints come from manifesto pledges: tax locks against a
//! fixed ceiling and spending floors against the fiscal-year-start
//! baseline. Dynamic constraints come from the active fiscal rule and are
//! evaluated on a one-year projection. A breach is an ordinary result,
//! never an error.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use chancellor_types::{
    BudgetChanges, ConstraintId, ConstraintResult, Department, FiscalRuleKind, FiscalState,
    GameState, MacroState, ManifestoPledge, Severity,
};

use crate::LedgerError;
use crate::ledger::preview;
use crate::projection::{FiscalProjection, calibrate, constraint_slack, severity_from_scalar};

fn tax_lock_severity(excess_pp: Decimal) -> Severity {
    if excess_pp <= Decimal::ONE {
        Severity::Minor
    } else if excess_pp <= Decimal::from(3) {
        Severity::Major
    } else {
        Severity::Critical
    }
}

fn floor_severity(shortfall_pct: f64) -> Severity {
    if shortfall_pct < 1.0 {
        Severity::Minor
    } else if shortfall_pct < 5.0 {
        Severity::Major
    } else {
        Severity::Critical
    }
}

fn evaluate_pledge(pledge: &ManifestoPledge, proposed: &FiscalState) -> Option<ConstraintResult> {
    match pledge {
        ManifestoPledge::TaxLock { lever, ceiling } => {
            let rate = proposed.rate(*lever);
            let slack = ceiling.saturating_sub(rate);
            let violated = rate > *ceiling;
            Some(ConstraintResult {
                id: pledge.constraint_id(),
                violated,
                severity: if violated {
                    tax_lock_severity(rate.saturating_sub(*ceiling))
                } else {
                    Severity::None
                },
                slack: slack.to_f64().unwrap_or(0.0),
                detail: format!("{lever} at {rate}% against a pledged ceiling of {ceiling}%"),
            })
        }
        ManifestoPledge::SpendingFloor { department } => {
            // A department missing from the baseline has no floor to breach.
            let floor = proposed.baseline.department_totals.get(department).copied()?;
            let total = proposed.department(*department).total;
            let slack = total.saturating_sub(floor);
            let violated = total < floor;
            let shortfall_pct = floor
                .saturating_sub(total)
                .checked_div(floor)
                .and_then(|r| r.to_f64())
                .map_or(0.0, |r| r * 100.0);
            Some(ConstraintResult {
                id: pledge.constraint_id(),
                violated,
                severity: if violated {
                    floor_severity(shortfall_pct)
                } else {
                    Severity::None
                },
                slack: slack.to_f64().unwrap_or(0.0),
                detail: format!(
                    "{department} at £{total}bn against a fiscal-year floor of £{floor}bn"
                ),
            })
        }
    }
}

/// Evaluate every pledge and every constraint of `rule` against `proposed`.
pub fn check(
    proposed: &FiscalState,
    economy: &MacroState,
    pledges: &[ManifestoPledge],
    rule: FiscalRuleKind,
) -> Vec<ConstraintResult> {
    let mut results: Vec<ConstraintResult> = pledges
        .iter()
        .filter_map(|p| evaluate_pledge(p, proposed))
        .collect();

    let projection = FiscalProjection::project(proposed, economy);
    for constraint in rule.constraints() {
        let slack = constraint_slack(constraint, &projection);
        let scalar = calibrate(slack);
        results.push(ConstraintResult {
            id: ConstraintId::Rule(constraint),
            violated: slack < Decimal::ZERO,
            severity: severity_from_scalar(scalar),
            slack: slack.to_f64().unwrap_or(0.0),
            detail: format!("{constraint:?} headroom £{}bn", slack.round_dp(2)),
        });
    }
    results
}

/// Check the fiscal lines currently in `state`.
pub fn check_state(state: &GameState) -> Vec<ConstraintResult> {
    check(
        &state.fiscal,
        &state.economy,
        &state.manifesto.pledges,
        state.metadata.fiscal_rule,
    )
}

/// Check `changes` as they would stand if applied to `state`.
pub fn check_changes(
    state: &GameState,
    changes: &BudgetChanges,
) -> Result<Vec<ConstraintResult>, LedgerError> {
    let proposed = preview(&state.fiscal, changes)?;
    Ok(check(
        &proposed,
        &state.economy,
        &state.manifesto.pledges,
        state.metadata.fiscal_rule,
    ))
}

// ---------------------------------------------------------------------------
// Auto-satisfy
// ---------------------------------------------------------------------------

fn protected_departments(pledges: &[ManifestoPledge]) -> Vec<Department> {
    pledges
        .iter()
        .filter_map(|p| match p {
            ManifestoPledge::SpendingFloor { department } => Some(*department),
            ManifestoPledge::TaxLock { .. } => None,
        })
        .collect()
}

/// Adjust `changes` by the minimum needed to clear constraint `id`.
///
/// Returns `changes` unchanged when the constraint is not breached or not
/// active. Tax locks are cleared by trimming the lever's delta, spending
/// floors by topping up the department's current spending, and rule
/// constraints by cutting current spending pro rata across departments
/// without a spending floor.
pub fn auto_satisfy(
    changes: &BudgetChanges,
    state: &GameState,
    id: ConstraintId,
) -> Result<BudgetChanges, LedgerError> {
    let proposed = preview(&state.fiscal, changes)?;
    let results = check(
        &proposed,
        &state.economy,
        &state.manifesto.pledges,
        state.metadata.fiscal_rule,
    );
    if !results.iter().any(|r| r.id == id && r.violated) {
        return Ok(changes.clone());
    }
    let mut adjusted = changes.clone();

    match id {
        ConstraintId::TaxLock(lever) => {
            let ceiling = state.manifesto.pledges.iter().find_map(|p| match p {
                ManifestoPledge::TaxLock { lever: l, ceiling } if *l == lever => Some(*ceiling),
                _ => None,
            });
            if let Some(ceiling) = ceiling {
                let delta = ceiling.saturating_sub(state.fiscal.rate(lever));
                adjusted.tax_deltas.insert(lever, delta);
            }
        }
        ConstraintId::SpendingFloor(department) => {
            let floor = proposed
                .baseline
                .department_totals
                .get(&department)
                .copied()
                .unwrap_or_default();
            let shortfall = floor.saturating_sub(proposed.department(department).total);
            let entry = adjusted.department_deltas.entry(department).or_default();
            entry.current = entry.current.saturating_add(shortfall);
        }
        ConstraintId::Rule(constraint) => {
            let projection = FiscalProjection::project(&proposed, &state.economy);
            let shortfall = Decimal::ZERO.saturating_sub(constraint_slack(constraint, &projection));
            let protected = protected_departments(&state.manifesto.pledges);
            let pool: Vec<(Department, Decimal)> = proposed
                .departments
                .iter()
                .filter(|(d, b)| !protected.contains(d) && b.current > Decimal::ZERO)
                .map(|(d, b)| (*d, b.current))
                .collect();
            let pool_total = pool
                .iter()
                .fold(Decimal::ZERO, |acc, (_, c)| acc.saturating_add(*c));
            if pool_total.is_zero() {
                return Ok(adjusted);
            }
            for (department, current) in pool {
                let share = shortfall
                    .saturating_mul(current)
                    .checked_div(pool_total)
                    .ok_or(LedgerError::Overflow {
                        context: "apportioning a spending cut",
                    })?
                    .round_dp_with_strategy(3, RoundingStrategy::AwayFromZero);
                let entry = adjusted.department_deltas.entry(department).or_default();
                entry.current = entry.current.saturating_sub(share);
            }
        }
    }
    Ok(adjusted)
}
