//! Legislator stance model.
//!
//! Scores every governing-party member's support for a proposal on a
//! 0--100 scale. The score is the sum of:
//!
//! | Term | Range |
//! |------|-------|
//! | Loyalty baseline: `50 + (1 - rebelliousness) * whip * 20` | 50--70 |
//! | Payroll bonus | +15 |
//! | Ideological alignment with the proposal's lean | ±20 |
//! | Fiscal-hawk deficit term | ±12 |
//! | Constituency impact of department changes and tax rises | ±25 |
//! | Active violations | -2.5 each |
//! | Broken promises to the member | -12 each |
//! | Jitter from [`stable_unit`] | ±4 |
//!
//! The jitter is keyed on `(seed, member, turn)`, so identical inputs always
//! give identical stances. Other parties are not scored: they vote against
//! the government regardless.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use chancellor_types::{
    BudgetChanges, Department, FiscalState, Legislator, LegislatorId, Party, Promise, PromiseId,
    Stance, StanceLabel,
};

use crate::keys::stable_unit;

/// Stance model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StanceConfig {
    /// Width of the per-member jitter band.
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Score deducted per active violation.
    #[serde(default = "default_violation_penalty")]
    pub violation_penalty: f64,

    /// Score deducted per broken promise to the member.
    #[serde(default = "default_broken_promise_penalty")]
    pub broken_promise_penalty: f64,

    /// Bonus for holding a government post.
    #[serde(default = "default_payroll_bonus")]
    pub payroll_bonus: f64,
}

const fn default_jitter() -> f64 {
    8.0
}

const fn default_violation_penalty() -> f64 {
    2.5
}

const fn default_broken_promise_penalty() -> f64 {
    12.0
}

const fn default_payroll_bonus() -> f64 {
    15.0
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            jitter: default_jitter(),
            violation_penalty: default_violation_penalty(),
            broken_promise_penalty: default_broken_promise_penalty(),
            payroll_bonus: default_payroll_bonus(),
        }
    }
}

/// Everything outside the roster and proposal that a stance depends on.
#[derive(Debug, Clone, Copy)]
pub struct StanceContext<'a> {
    /// Fiscal lines the proposal is measured against.
    pub fiscal: &'a FiscalState,
    /// Change in the annual deficit caused by the proposal, £bn.
    pub deficit_delta_bn: f64,
    /// Party-discipline pressure, 0--1.
    pub whip_strength: f64,
    /// Game seed.
    pub seed: u64,
    /// Stances from the previous scoring, for overrides.
    pub previous: &'a BTreeMap<LegislatorId, Stance>,
    /// Promises made to members.
    pub promises: &'a BTreeMap<PromiseId, Promise>,
    /// Model parameters.
    pub config: &'a StanceConfig,
}

/// Left/right lean of a proposal in `[-1, 1]`.
///
/// Tax cuts and spending cuts lean right; rises lean left.
pub fn policy_lean(changes: &BudgetChanges) -> f64 {
    let tax_pp: f64 = changes
        .tax_deltas
        .values()
        .filter_map(ToPrimitive::to_f64)
        .sum();
    let spend_bn: f64 = changes
        .department_deltas
        .values()
        .filter_map(|d| d.net().to_f64())
        .sum();
    ((-tax_pp * 5.0 - spend_bn) / 25.0).tanh()
}

/// Percent change of each department's total under the proposal.
fn department_changes(changes: &BudgetChanges, fiscal: &FiscalState) -> Vec<(Department, f64)> {
    changes
        .department_deltas
        .iter()
        .filter_map(|(dept, delta)| {
            let base = fiscal.department(*dept).total;
            let pct = delta
                .net()
                .checked_div(base)
                .and_then(|r| r.to_f64())
                .map(|r| r * 100.0)?;
            Some((*dept, pct))
        })
        .collect()
}

/// Local sensitivity multiplier for a department.
fn local_sensitivity(member: &Legislator, department: Department) -> f64 {
    let seat = &member.constituency;
    match department {
        Department::Welfare => seat.unemployment_pct / 4.5,
        Department::Pensions => seat.pensioner_share / 0.2,
        Department::Housing | Department::LocalGovernment => 0.5 + seat.deprivation,
        Department::Education | Department::Health | Department::Policing => {
            0.75 + seat.public_sector_share
        }
        Department::Defence | Department::Transport | Department::Justice => 1.0,
    }
}

fn broken_promises_to(member: LegislatorId, promises: &BTreeMap<PromiseId, Promise>) -> u32 {
    let count = promises
        .values()
        .filter(|p| p.broken && p.targets.contains(&member))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Score one member. The member is assumed to sit for the governing party.
pub fn score_member(
    member: &Legislator,
    changes: &BudgetChanges,
    department_pcts: &[(Department, f64)],
    lean: f64,
    active_violations: u32,
    turn: u32,
    context: &StanceContext<'_>,
) -> Stance {
    let config = context.config;
    let mut concerns = Vec::new();

    let loyalty = 50.0 + (1.0 - member.rebelliousness) * context.whip_strength * 20.0;
    let payroll = if member.payroll { config.payroll_bonus } else { 0.0 };
    let alignment = member.ideology.economic * lean * 20.0;

    let hawk = (-member.ideology.fiscal_hawk * context.deficit_delta_bn * 0.4).clamp(-12.0, 12.0);
    if hawk < -3.0 {
        concerns.push(String::from("worried about borrowing"));
    }

    let mut local: f64 = department_pcts
        .iter()
        .map(|(dept, pct)| {
            let weight = member.concerns.get(dept).copied().unwrap_or(0.0);
            pct * weight * local_sensitivity(member, *dept) * 0.8
        })
        .sum();
    for (dept, pct) in department_pcts {
        let weight = member.concerns.get(dept).copied().unwrap_or(0.0);
        if *pct < -2.0 && weight > 0.4 {
            concerns.push(format!("cuts to {dept}"));
        }
    }
    let tax_rises = changes.tax_rises().count();
    if tax_rises > 0 {
        #[allow(clippy::cast_precision_loss)]
        let rises = tax_rises as f64;
        local -= rises * (1.0 + member.constituency.marginality()) * 2.0;
        if member.constituency.marginality() > 0.6 {
            concerns.push(String::from("tax rises in a marginal seat"));
        }
    }
    let local = local.clamp(-25.0, 25.0);

    let violations = f64::from(active_violations) * config.violation_penalty;
    if active_violations > 0 {
        concerns.push(format!("{active_violations} manifesto or rule breach(es)"));
    }

    let broken = broken_promises_to(member.id, context.promises);
    let promise_penalty = f64::from(broken) * config.broken_promise_penalty;
    if broken > 0 {
        concerns.push(String::from("promises to them have been broken"));
    }

    let jitter = (stable_unit(context.seed, member.id.get(), turn) - 0.5) * config.jitter;

    let score = (loyalty + payroll + alignment + hawk + local - violations - promise_penalty
        + jitter)
        .clamp(0.0, 100.0);

    let previous = context.previous.get(&member.id);
    let override_label = previous.and_then(|s| s.override_label);
    let override_turn = previous.and_then(|s| s.override_turn);
    let (label, score) = match override_label {
        Some(forced) => {
            let (lo, hi) = forced.band();
            (forced, score.clamp(lo, hi))
        }
        None => (StanceLabel::from_score(score), score),
    };

    Stance {
        label,
        score,
        concerns,
        broken_promises: broken,
        override_label,
        override_turn,
    }
}

/// Score every governing member of `registry` against `changes`.
pub fn score_all(
    registry: &BTreeMap<LegislatorId, Legislator>,
    changes: &BudgetChanges,
    active_violations: u32,
    turn: u32,
    context: &StanceContext<'_>,
) -> BTreeMap<LegislatorId, Stance> {
    let lean = policy_lean(changes);
    let department_pcts = department_changes(changes, context.fiscal);
    registry
        .values()
        .filter(|m| m.party == Party::Governing)
        .map(|m| {
            (
                m.id,
                score_member(m, changes, &department_pcts, lean, active_violations, turn, context),
            )
        })
        .collect()
}

/// Drop every manual override, keeping scores and labels re-derived.
pub fn clear_overrides(stances: &mut BTreeMap<LegislatorId, Stance>) {
    for stance in stances.values_mut() {
        stance.override_label = None;
        stance.override_turn = None;
        stance.label = StanceLabel::from_score(stance.score);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use chancellor_types::{PromiseCategory, TaxLever};

    use super::*;
    use crate::roster::{RosterConfig, generate_roster};

    struct Fixture {
        roster: BTreeMap<LegislatorId, Legislator>,
        fiscal: FiscalState,
        previous: BTreeMap<LegislatorId, Stance>,
        promises: BTreeMap<PromiseId, Promise>,
        config: StanceConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                roster: generate_roster(&RosterConfig::default(), 11).unwrap(),
                fiscal: FiscalState::default(),
                previous: BTreeMap::new(),
                promises: BTreeMap::new(),
                config: StanceConfig::default(),
            }
        }

        fn context(&self, deficit_delta_bn: f64) -> StanceContext<'_> {
            StanceContext {
                fiscal: &self.fiscal,
                deficit_delta_bn,
                whip_strength: 0.7,
                seed: 11,
                previous: &self.previous,
                promises: &self.promises,
                config: &self.config,
            }
        }
    }

    #[test]
    fn zero_proposal_never_produces_opposition() {
        let f = Fixture::new();
        let stances = score_all(&f.roster, &BudgetChanges::new(), 0, 0, &f.context(0.0));
        assert_eq!(stances.len(), 400);
        assert!(stances.values().all(|s| s.label != StanceLabel::Oppose));
    }

    #[test]
    fn scores_are_bounded_and_labels_match_bands() {
        let f = Fixture::new();
        let harsh = BudgetChanges::new()
            .with_tax(TaxLever::IncomeTaxBasic, dec!(4))
            .with_tax(TaxLever::Vat, dec!(3))
            .with_current(Department::Welfare, dec!(-40))
            .with_current(Department::Pensions, dec!(-30));
        let stances = score_all(&f.roster, &harsh, 6, 3, &f.context(80.0));
        for stance in stances.values() {
            assert!((0.0..=100.0).contains(&stance.score));
            assert_eq!(stance.label, StanceLabel::from_score(stance.score));
        }
        assert!(stances.values().any(|s| s.label == StanceLabel::Oppose));
    }

    #[test]
    fn identical_inputs_give_identical_stances() {
        let f = Fixture::new();
        let changes = BudgetChanges::new().with_current(Department::Housing, dec!(-2));
        let a = score_all(&f.roster, &changes, 1, 5, &f.context(-2.0));
        let b = score_all(&f.roster, &changes, 1, 5, &f.context(-2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn override_persists_and_pins_score_into_band() {
        let mut f = Fixture::new();
        let target = f
            .roster
            .values()
            .find(|m| m.party == Party::Governing && !m.payroll)
            .unwrap()
            .id;
        f.previous.insert(
            target,
            Stance {
                override_label: Some(StanceLabel::Support),
                override_turn: Some(2),
                ..Stance::default()
            },
        );
        let harsh = BudgetChanges::new().with_current(Department::Welfare, dec!(-60));
        let stances = score_all(&f.roster, &harsh, 8, 3, &f.context(0.0));
        let stance = &stances[&target];
        assert_eq!(stance.label, StanceLabel::Support);
        assert!(stance.score >= StanceLabel::SUPPORT_THRESHOLD);
        assert_eq!(stance.override_turn, Some(2));

        let mut cleared = stances;
        clear_overrides(&mut cleared);
        assert!(cleared.values().all(|s| s.override_label.is_none()));
    }

    #[test]
    fn broken_promise_costs_support() {
        let mut f = Fixture::new();
        let target = f
            .roster
            .values()
            .find(|m| m.party == Party::Governing && !m.payroll)
            .unwrap()
            .id;
        let before = score_all(&f.roster, &BudgetChanges::new(), 0, 1, &f.context(0.0))[&target].score;
        f.promises.insert(
            PromiseId(1),
            Promise {
                id: PromiseId(1),
                category: PromiseCategory::NoTaxRise {
                    lever: TaxLever::Vat,
                    ceiling: dec!(20),
                },
                targets: vec![target],
                turn_made: 0,
                broken: true,
                turn_broken: Some(1),
            },
        );
        let after = &score_all(&f.roster, &BudgetChanges::new(), 0, 1, &f.context(0.0))[&target];
        assert_eq!(after.broken_promises, 1);
        assert!(after.score < before);
    }

    #[test]
    fn welfare_cut_hurts_high_unemployment_seats_more() {
        let f = Fixture::new();
        let template = f
            .roster
            .values()
            .find(|m| m.party == Party::Governing && !m.payroll)
            .unwrap();
        let mut high = template.clone();
        high.id = LegislatorId(1);
        high.constituency.unemployment_pct = 8.0;
        let mut low = template.clone();
        low.id = LegislatorId(2);
        low.constituency.unemployment_pct = 2.5;
        let pair: BTreeMap<LegislatorId, Legislator> =
            [(high.id, high), (low.id, low)].into_iter().collect();

        let cut = BudgetChanges::new().with_current(Department::Welfare, dec!(-20));
        let base = score_all(&pair, &BudgetChanges::new(), 0, 0, &f.context(0.0));
        let after = score_all(&pair, &cut, 0, 0, &f.context(0.0));
        let drop = |id: LegislatorId| base[&id].score - after[&id].score;
        assert!(drop(LegislatorId(1)) > drop(LegislatorId(2)));
    }

    #[test]
    fn lean_direction() {
        assert!(policy_lean(&BudgetChanges::new().with_tax(TaxLever::Vat, dec!(-2))) > 0.0);
        assert!(policy_lean(&BudgetChanges::new().with_current(Department::Health, dec!(10))) < 0.0);
        assert!(policy_lean(&BudgetChanges::new()).abs() < f64::EPSILON);
    }
}
