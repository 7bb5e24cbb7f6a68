//! Promise evaluation.
//!
//! Runs after every ledger commit. A promise is broken the first time the
//! committed lines fall outside it and stays broken for the rest of the
//! game, even if the lines later recover.

use tracing::info;

use chancellor_types::{FiscalState, GameState, Promise, PromiseCategory};

/// Backbench satisfaction lost per newly broken promise.
const BROKEN_PROMISE_COST: f64 = 3.0;

/// Whether the fiscal lines breach a promise.
pub fn promise_broken(promise: &Promise, fiscal: &FiscalState) -> bool {
    match &promise.category {
        PromiseCategory::ProtectDepartment { department, floor } => {
            fiscal.department(*department).total < *floor
        }
        PromiseCategory::NoTaxRise { lever, ceiling } => fiscal.rate(*lever) > *ceiling,
    }
}

/// Mark newly broken promises and refresh per-member broken counts.
pub fn evaluate_promises(mut state: GameState) -> GameState {
    let turn = state.metadata.turn;
    let mut newly_broken = 0_u32;
    for promise in state.legislature.promises.values_mut() {
        if promise.broken || !promise_broken(promise, &state.fiscal) {
            continue;
        }
        promise.broken = true;
        promise.turn_broken = Some(turn);
        newly_broken = newly_broken.saturating_add(1);
        info!(promise = %promise.id, turn, "promise broken");
    }

    if newly_broken > 0 {
        let satisfaction = &mut state.political.backbench_satisfaction;
        *satisfaction =
            (*satisfaction - f64::from(newly_broken) * BROKEN_PROMISE_COST).clamp(0.0, 100.0);
    }

    let promises = &state.legislature.promises;
    for (id, stance) in &mut state.legislature.stances {
        let count = promises
            .values()
            .filter(|p| p.broken && p.targets.contains(id))
            .count();
        stance.broken_promises = u32::try_from(count).unwrap_or(u32::MAX);
    }
    state
}
