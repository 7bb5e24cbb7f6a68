//! Legislative friction gate.
//!
//! Large single-step changes cannot pass straight into law. A primary tax
//! lever rising by more than [`FrictionConfig::tax_rise_threshold_pp`], or a
//! department whose inflation-adjusted spending falls by more than
//! [`FrictionConfig::real_cut_threshold_pct`], holds the whole submission
//! back.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use chancellor_types::{BudgetChanges, FiscalState, FrictionTrigger};

/// Friction gate parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrictionConfig {
    /// Largest permitted one-step rise of a primary lever, percentage points.
    #[serde(default = "default_tax_rise_threshold_pp")]
    pub tax_rise_threshold_pp: Decimal,

    /// Largest permitted one-step real-terms cut of a department, percent.
    #[serde(default = "default_real_cut_threshold_pct")]
    pub real_cut_threshold_pct: f64,

    /// Turns a deferred submission waits before taking effect.
    #[serde(default = "default_base_delay_turns")]
    pub base_delay_turns: u32,

    /// Extra turns added for each further deferral while a delay is active.
    #[serde(default = "default_repeat_extension_turns")]
    pub repeat_extension_turns: u32,

    /// Credibility charged immediately on deferral.
    #[serde(default = "default_credibility_penalty")]
    pub credibility_penalty: f64,
}

const fn default_tax_rise_threshold_pp() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_real_cut_threshold_pct() -> f64 {
    15.0
}

const fn default_base_delay_turns() -> u32 {
    6
}

const fn default_repeat_extension_turns() -> u32 {
    3
}

const fn default_credibility_penalty() -> f64 {
    5.0
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            tax_rise_threshold_pp: default_tax_rise_threshold_pp(),
            real_cut_threshold_pct: default_real_cut_threshold_pct(),
            base_delay_turns: default_base_delay_turns(),
            repeat_extension_turns: default_repeat_extension_turns(),
            credibility_penalty: default_credibility_penalty(),
        }
    }
}

/// Real-terms percentage change from `before` to `after`.
///
/// The nominal ratio is deflated by one year of `inflation_pct`. Returns
/// `None` when `before` is zero.
pub fn real_change_pct(before: Decimal, after: Decimal, inflation_pct: f64) -> Option<f64> {
    if before.is_zero() {
        return None;
    }
    let ratio = after.checked_div(before)?.to_f64()?;
    let deflator = 1.0 + inflation_pct / 100.0;
    Some((ratio / deflator - 1.0) * 100.0)
}

/// List everything in a submission that trips the gate.
///
/// `proposed` is the preview of `changes` over `current`, so line-item
/// overrides count towards a department's cut.
pub fn assess(
    current: &FiscalState,
    proposed: &FiscalState,
    inflation_pct: f64,
    changes: &BudgetChanges,
    config: &FrictionConfig,
) -> Vec<FrictionTrigger> {
    let mut triggers = Vec::new();

    for (lever, delta) in &changes.tax_deltas {
        if lever.is_primary() && *delta > config.tax_rise_threshold_pp {
            triggers.push(FrictionTrigger::TaxRise {
                lever: *lever,
                delta_pp: *delta,
            });
        }
    }

    for (department, before) in &current.departments {
        let after = proposed.department(*department);
        let Some(pct) = real_change_pct(before.total, after.total, inflation_pct) else {
            continue;
        };
        if pct < -config.real_cut_threshold_pct {
            triggers.push(FrictionTrigger::RealTermsCut {
                department: *department,
                real_change_pct: pct,
            });
        }
    }

    triggers
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use chancellor_types::{Department, TaxLever};

    use super::*;
    use crate::ledger::preview;

    fn run(changes: &BudgetChanges, inflation: f64) -> Vec<FrictionTrigger> {
        let current = FiscalState::default();
        let proposed = preview(&current, changes).unwrap();
        assess(&current, &proposed, inflation, changes, &FrictionConfig::default())
    }

    #[test]
    fn modest_changes_pass() {
        let changes = BudgetChanges::new()
            .with_tax(TaxLever::IncomeTaxBasic, dec!(3))
            .with_current(Department::Defence, dec!(-2));
        assert!(run(&changes, 2.5).is_empty());
    }

    #[test]
    fn rise_above_threshold_on_primary_lever_trips() {
        let changes = BudgetChanges::new().with_tax(TaxLever::CorporationTax, dec!(5.5));
        let triggers = run(&changes, 2.5);
        assert_eq!(triggers.len(), 1);
        assert!(matches!(
            triggers[0],
            FrictionTrigger::TaxRise {
                lever: TaxLever::CorporationTax,
                ..
            }
        ));
    }

    #[test]
    fn rise_of_exactly_threshold_passes() {
        let changes = BudgetChanges::new().with_tax(TaxLever::Vat, dec!(5));
        assert!(run(&changes, 2.5).is_empty());
    }

    #[test]
    fn additional_rate_is_not_primary() {
        let changes = BudgetChanges::new().with_tax(TaxLever::IncomeTaxAdditional, dec!(10));
        assert!(run(&changes, 2.5).is_empty());
    }

    #[test]
    fn inflation_turns_a_nominal_cut_into_a_real_one() {
        // Housing total is 20; a 2.9bn cut is 14.5% nominal.
        let changes = BudgetChanges::new().with_capital(Department::Housing, dec!(-2.9));
        assert!(run(&changes, 0.0).is_empty());
        let triggers = run(&changes, 2.5);
        assert_eq!(triggers.len(), 1);
    }

    #[test]
    fn flat_line_under_high_inflation_is_a_real_cut() {
        // At 20% inflation an unchanged line is worth a sixth less.
        let changes = BudgetChanges::new().with_current(Department::Defence, Decimal::ZERO);
        let triggers = run(&changes, 20.0);
        assert!(triggers.iter().any(|t| matches!(
            t,
            FrictionTrigger::RealTermsCut {
                department: Department::Defence,
                ..
            }
        )));
        assert!(run(&changes, 17.0).is_empty());
    }

    #[test]
    fn rise_that_lags_inflation_is_still_a_cut() {
        // Justice total is 13.5: a 0.1bn rise is under 1% nominal.
        let changes = BudgetChanges::new().with_current(Department::Justice, dec!(0.1));
        let triggers = run(&changes, 20.0);
        assert!(triggers.iter().any(|t| matches!(
            t,
            FrictionTrigger::RealTermsCut {
                department: Department::Justice,
                ..
            }
        )));
    }

    #[test]
    fn three_deep_cuts_and_a_small_rise_trip_on_cuts() {
        let changes = BudgetChanges::new()
            .with_tax(TaxLever::IncomeTaxBasic, dec!(3))
            .with_current(Department::Transport, dec!(-6))
            .with_capital(Department::Housing, dec!(-5))
            .with_current(Department::Justice, dec!(-3));
        let triggers = run(&changes, 2.5);
        assert_eq!(triggers.len(), 3);
        assert!(
            triggers
                .iter()
                .all(|t| matches!(t, FrictionTrigger::RealTermsCut { .. }))
        );
    }

    #[test]
    fn real_change_of_zero_base_is_undefined() {
        assert!(real_change_pct(Decimal::ZERO, dec!(1), 2.0).is_none());
    }
}
