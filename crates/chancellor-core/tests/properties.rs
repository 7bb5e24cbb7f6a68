//! State-level properties that must hold for any sequence of transitions.
//!
//! Covers the ledger aggregate invariant, stance bounds and labels,
//! normalizer idempotence, the serialize/normalize round trip and stance
//! determinism.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects
)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde_json::json;

use chancellor_core::{
    BaselineEconomy, GameConfig, advance_turn, default_state, normalize, submit_budget,
};
use chancellor_ledger::{LedgerCheck, commit, verify_ledger};
use chancellor_politics::{StanceConfig, StanceContext, score_all};
use chancellor_types::{BudgetChanges, Department, GameState, StanceLabel, TaxLever};

/// A random sparse proposal of modest size.
fn random_changes(rng: &mut StdRng) -> BudgetChanges {
    let mut changes = BudgetChanges::new();
    for _ in 0..rng.random_range(1..5) {
        let lever = TaxLever::ALL[rng.random_range(0..TaxLever::ALL.len())];
        changes = changes.with_tax(lever, Decimal::new(rng.random_range(-20..=20), 1));
    }
    for _ in 0..rng.random_range(1..6) {
        let department = Department::ALL[rng.random_range(0..Department::ALL.len())];
        let amount = Decimal::new(rng.random_range(-5_000..=5_000), 3);
        changes = if rng.random::<bool>() {
            changes.with_current(department, amount)
        } else {
            changes.with_capital(department, amount)
        };
    }
    changes
}

#[test]
fn aggregates_hold_after_any_sequence_of_commits() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut state = GameState::default();
    for _ in 0..200 {
        state = commit(state, &random_changes(&mut rng)).unwrap();
        assert_eq!(verify_ledger(&state.fiscal), LedgerCheck::Consistent);
        for budget in state.fiscal.departments.values() {
            assert!(budget.current >= Decimal::ZERO);
            assert!(budget.capital >= Decimal::ZERO);
        }
    }
}

#[test]
fn stances_stay_in_bounds_with_consistent_labels() {
    let state = default_state();
    let config = StanceConfig::default();
    let mut rng = StdRng::seed_from_u64(5);
    for turn in 0..20 {
        let changes = random_changes(&mut rng);
        let context = StanceContext {
            fiscal: &state.fiscal,
            deficit_delta_bn: rng.random_range(-40.0..40.0),
            whip_strength: rng.random_range(0.0..1.0),
            seed: state.metadata.seed,
            previous: &state.legislature.stances,
            promises: &state.legislature.promises,
            config: &config,
        };
        let violations = rng.random_range(0..8);
        let stances = score_all(&state.legislature.roster, &changes, violations, turn, &context);
        for stance in stances.values() {
            assert!((0.0..=100.0).contains(&stance.score));
            assert_eq!(stance.label, StanceLabel::from_score(stance.score));
        }
    }
}

#[test]
fn stance_scores_are_reproducible() {
    let state = default_state();
    let config = StanceConfig::default();
    let changes = BudgetChanges::new()
        .with_tax(TaxLever::NationalInsurance, Decimal::ONE)
        .with_current(Department::Welfare, Decimal::new(-40, 1));
    let context = StanceContext {
        fiscal: &state.fiscal,
        deficit_delta_bn: -8.0,
        whip_strength: 0.7,
        seed: state.metadata.seed,
        previous: &state.legislature.stances,
        promises: &state.legislature.promises,
        config: &config,
    };
    let first = score_all(&state.legislature.roster, &changes, 1, 3, &context);
    let second = score_all(&state.legislature.roster, &changes, 1, 3, &context);
    assert_eq!(first, second);
}

#[test]
fn normalizing_is_idempotent() {
    let raws = [
        json!(null),
        json!("corrupt"),
        json!({"metadata": {"turn": 900}, "fiscal": {"departments": {"health": 300}}}),
        json!({
            "fiscal": {"spending": {"dataType": "Map", "value": [["housing", 12.5]]}},
            "legislature": {"stances": [[3, {"score": 250.0, "label": "oppose"}]]},
            "events": {"pending": "nope"},
        }),
        serde_json::to_value(default_state()).unwrap(),
    ];
    for raw in raws {
        let once = normalize(&raw);
        let twice = normalize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice, "not idempotent for {raw}");
    }
}

#[test]
fn played_state_survives_a_round_trip() {
    let config = GameConfig::default();
    let economy = BaselineEconomy::default();
    let mut rng = StdRng::seed_from_u64(21);
    let mut state = default_state();
    for turn in 0..8 {
        if turn % 3 == 0 {
            let changes = BudgetChanges::new()
                .with_current(Department::Education, Decimal::new(15, 1))
                .with_tax(TaxLever::CorporationTax, Decimal::new(-5, 1));
            state = submit_budget(state, &changes, &config, &mut rng).0;
        }
        state = advance_turn(state, &economy);
    }

    let wire = serde_json::to_string(&state).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(normalize(&raw), state);
}
