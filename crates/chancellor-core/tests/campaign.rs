//! Full campaigns driven through the public transitions.
//!
//! A campaign submits a budget every few turns, answers every event with
//! its first response and advances until the game ends.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal_macros::dec;

use chancellor_core::{
    BaselineEconomy, GameConfig, InMemoryStore, KeyValueStore, advance_turn, load_game,
    new_game_state, respond_to_event, save_game, submit_budget,
};
use chancellor_ledger::{LedgerCheck, verify_ledger};
use chancellor_types::{BudgetChanges, Department, GameState, TaxLever};

fn proposal(turn: u32) -> BudgetChanges {
    if turn % 12 == 0 {
        BudgetChanges::new()
            .with_current(Department::Health, dec!(3))
            .with_tax(TaxLever::IncomeTaxHigher, dec!(0.5))
    } else {
        BudgetChanges::new()
            .with_capital(Department::Transport, dec!(1.5))
            .with_current(Department::Welfare, dec!(-1))
    }
}

/// Play `turns` months with a fixed vote seed.
fn play(config: &GameConfig, turns: u32, vote_seed: u64) -> GameState {
    let economy = BaselineEconomy::default();
    let mut rng = StdRng::seed_from_u64(vote_seed);
    let mut state = new_game_state(config);
    for _ in 0..turns {
        let turn = state.metadata.turn;
        if turn % 6 == 0 {
            state = submit_budget(state, &proposal(turn), config, &mut rng).0;
        }
        while let Some(event) = state.events.pending.first() {
            let id = event.id;
            state = respond_to_event(state, id, 0);
        }
        state = advance_turn(state, &economy);
    }
    state
}

#[test]
fn sixty_turn_campaign_reaches_game_over_with_a_sound_ledger() {
    let config = GameConfig::default();
    let state = play(&config, 70, 7);

    assert!(state.metadata.game_over);
    assert_eq!(state.metadata.turn, 59);
    assert_eq!(verify_ledger(&state.fiscal), LedgerCheck::Consistent);
    assert!(!state.legislature.voting_records.is_empty());
    assert!(state.events.pending.is_empty());
    for budget in state.fiscal.departments.values() {
        assert_eq!(budget.total, budget.current + budget.capital);
    }
}

#[test]
fn campaigns_with_the_same_seeds_are_identical() {
    let config = GameConfig::default();
    let mut first = play(&config, 30, 42);
    let mut second = play(&config, 30, 42);
    // Roster ids are time-based and differ between runs.
    first.legislature.roster_id = None;
    second.legislature.roster_id = None;
    assert_eq!(first, second);
}

#[test]
fn saved_campaign_resumes_without_its_roster_blob() {
    let config = GameConfig::default();
    let state = play(&config, 20, 3);

    let mut store = InMemoryStore::new();
    let report = save_game(&mut store, &state, &config.persistence, 1);
    assert!(report.slot_written);
    assert!(report.roster_written);

    let mut slot_only = InMemoryStore::new();
    slot_only
        .set(&report.slot_key, store.get(&report.slot_key).unwrap())
        .unwrap();

    let restored = load_game(&slot_only, &config, 1).unwrap();
    assert_eq!(restored.legislature.roster, state.legislature.roster);
    assert_eq!(restored.fiscal, state.fiscal);
    assert_eq!(restored.metadata, state.metadata);
    assert!(restored.legislature.voting_records.is_empty());

    let full = load_game(&store, &config, 1).unwrap();
    assert_eq!(full, state);
}
