//! End-to-end budget scenarios.
//!
//! Each test drives the public transitions from a fresh game and checks
//! the externally visible outcome: constraint results, stance blocs,
//! friction deferral, vote verdicts and ledger aggregates.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects
)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use chancellor_core::{
    BaselineEconomy, GameConfig, SubmissionOutcome, advance_turn, default_state, new_game_state,
    submit_budget,
};
use chancellor_ledger::{
    Disposition, FrictionConfig, LedgerCheck, apply_budget_changes, check_changes, commit,
    recompute_aggregates, verify_ledger,
};
use chancellor_politics::{VoteConfig, VoteInput, simulate_vote};
use chancellor_types::{
    BudgetChanges, Department, FrictionTrigger, GameMode, StanceLabel, TaxLever, VoteMode,
    VoteSummary,
};

fn zero_changes() -> BudgetChanges {
    let mut changes = BudgetChanges::new();
    for lever in TaxLever::ALL {
        changes = changes.with_tax(lever, Decimal::ZERO);
    }
    for department in Department::ALL {
        changes = changes
            .with_current(department, Decimal::ZERO)
            .with_capital(department, Decimal::ZERO);
    }
    changes
}

#[test]
fn zero_budget_has_no_violations_and_no_opposition() {
    let state = default_state();
    let changes = zero_changes();

    let results = check_changes(&state, &changes).unwrap();
    assert!(results.iter().all(|r| !r.violated));

    let config = GameConfig::default();
    let mut rng = StdRng::seed_from_u64(11);
    let (state, outcome) = submit_budget(state, &changes, &config, &mut rng);

    let vote = outcome.vote().unwrap();
    assert_eq!(vote.mode, VoteMode::Granular);
    assert!(vote.passed);
    assert!(matches!(outcome, SubmissionOutcome::Enacted { .. }));
    assert!(!state.legislature.stances.is_empty());
    assert!(
        state
            .legislature
            .stances
            .values()
            .all(|s| s.label != StanceLabel::Oppose)
    );
    assert_eq!(state.legislature.blocs.oppose, 0);
}

#[test]
fn tax_rise_with_deep_real_cuts_is_deferred_six_turns() {
    let mut state = default_state();
    state.metadata.turn = 4;
    let before = state.clone();

    let changes = BudgetChanges::new()
        .with_tax(TaxLever::IncomeTaxBasic, dec!(3))
        .with_current(Department::Defence, dec!(-20))
        .with_current(Department::Justice, dec!(-5))
        .with_current(Department::Policing, dec!(-8));

    let application = apply_budget_changes(state, &changes, &FrictionConfig::default()).unwrap();

    assert_eq!(application.disposition, Disposition::Deferred { apply_turn: 10 });
    let cuts = application
        .triggers
        .iter()
        .filter(|t| matches!(t, FrictionTrigger::RealTermsCut { .. }))
        .count();
    assert_eq!(cuts, 3);

    let state = application.state;
    assert_eq!(state.fiscal.departments, before.fiscal.departments);
    assert_eq!(state.fiscal.tax_rates, before.fiscal.tax_rates);
    assert_eq!(state.legislature.delay_until_turn, Some(10));
    assert_eq!(state.pending_budgets.len(), 1);
    assert_eq!(state.pending_budgets[0].apply_turn, 10);
    assert!(state.political.credibility < before.political.credibility);
}

#[test]
fn hostile_aggregate_vote_fails_in_nearly_every_trial() {
    let summary = VoteSummary {
        backbench_satisfaction: 25.0,
        violation_count: 5,
        deficit_delta_bn: 30.0,
        rule_compliant: false,
        tax_rises: 3,
        spending_cuts: 3,
        executive_trust: 20.0,
        governing_seats: 400,
        payroll_seats: 120,
        other_seats: 250,
    };
    let config = VoteConfig::default();
    let trials = 500_u64;
    let failures = (0..trials)
        .filter(|trial| {
            let mut rng = StdRng::seed_from_u64(*trial);
            !simulate_vote(&VoteInput::Aggregate(&summary), &config, &mut rng)
                .result
                .passed
        })
        .count();
    assert!(failures >= 475, "only {failures} of {trials} trials failed");
}

#[test]
fn reverting_a_delta_restores_the_exact_aggregate() {
    let state = default_state();
    let original = state.fiscal.department(Department::Transport);
    let original_total = state.fiscal.total_spending;

    let state = commit(
        state,
        &BudgetChanges::new().with_capital(Department::Transport, dec!(3.725)),
    )
    .unwrap();
    assert_ne!(state.fiscal.department(Department::Transport).total, original.total);

    let state = commit(
        state,
        &BudgetChanges::new().with_capital(Department::Transport, dec!(-3.725)),
    )
    .unwrap();
    let mut state = commit(
        state,
        &BudgetChanges::new().with_capital(Department::Transport, Decimal::ZERO),
    )
    .unwrap();
    recompute_aggregates(&mut state.fiscal);

    assert_eq!(state.fiscal.department(Department::Transport), original);
    assert_eq!(state.fiscal.total_spending, original_total);
}

#[test]
fn deferred_submissions_extend_the_delay_and_land_on_maturity() {
    // Every governing member is on the payroll, so each division passes.
    let mut config = GameConfig::default();
    config.game.mode = GameMode::Sandbox;
    config.legislature.composition.payroll = config.legislature.composition.governing;
    let economy = BaselineEconomy::default();
    let mut rng = StdRng::seed_from_u64(11);
    let state = new_game_state(&config);
    let credibility = state.political.credibility;

    // Turn 0: a six point VAT rise trips friction.
    let vat = BudgetChanges::new().with_tax(TaxLever::Vat, dec!(6));
    let (state, outcome) = submit_budget(state, &vat, &config, &mut rng);
    let SubmissionOutcome::Deferred { vote, apply_turn } = &outcome else {
        panic!("expected a deferral, got {outcome:?}");
    };
    assert!(vote.passed);
    assert_eq!(*apply_turn, 6);
    assert_eq!(state.legislature.delay_until_turn, Some(6));
    assert_eq!(state.legislature.delay_extensions, 0);
    assert_eq!(state.pending_budgets.len(), 1);
    assert_eq!(state.fiscal.rate(TaxLever::Vat), dec!(20));
    assert_eq!(state.political.credibility, credibility - 5.0);

    let mut state = state;
    for _ in 0..2 {
        state = advance_turn(state, &economy);
    }
    assert_eq!(state.metadata.turn, 2);
    assert_eq!(state.fiscal.rate(TaxLever::Vat), dec!(20));
    let credibility = state.political.credibility;

    // Turn 2: another breach while the delay stands earns the extension.
    let corporation = BudgetChanges::new().with_tax(TaxLever::CorporationTax, dec!(6));
    let (state, outcome) = submit_budget(state, &corporation, &config, &mut rng);
    let SubmissionOutcome::Deferred { apply_turn, .. } = &outcome else {
        panic!("expected a deferral, got {outcome:?}");
    };
    assert_eq!(*apply_turn, 2 + 6 + 3);
    assert_eq!(state.legislature.delay_until_turn, Some(11));
    assert_eq!(state.legislature.delay_extensions, 1);
    assert_eq!(state.pending_budgets.len(), 2);
    assert_eq!(state.political.credibility, credibility - 5.0);
    assert_eq!(state.fiscal.rate(TaxLever::CorporationTax), dec!(25));

    let mut state = state;
    while state.metadata.turn < 6 {
        state = advance_turn(state, &economy);
    }
    assert_eq!(state.fiscal.rate(TaxLever::Vat), dec!(26));
    assert_eq!(state.fiscal.rate(TaxLever::CorporationTax), dec!(25));
    assert_eq!(state.pending_budgets.len(), 1);
    assert_eq!(state.legislature.delay_until_turn, Some(11));

    while state.metadata.turn < 11 {
        state = advance_turn(state, &economy);
    }
    assert_eq!(state.fiscal.rate(TaxLever::Vat), dec!(26));
    assert_eq!(state.fiscal.rate(TaxLever::CorporationTax), dec!(31));
    assert!(state.pending_budgets.is_empty());
    assert_eq!(state.legislature.delay_until_turn, None);
    assert_eq!(state.legislature.delay_extensions, 0);
    assert!(matches!(verify_ledger(&state.fiscal), LedgerCheck::Consistent));
}
