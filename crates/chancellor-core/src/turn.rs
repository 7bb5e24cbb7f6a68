//! Turn orchestration.
//!
//! [`advance_turn`] is the only transition that moves the clock. One turn
//! runs these phases in order:
//!
//! 1. Clock: turn and calendar month advance. The April turn re-snapshots
//!    the fiscal-year baseline from the lines as they stand.
//! 2. Ledger: deferred budgets whose apply turn has arrived are committed,
//!    promises re-evaluated and an expired legislative delay cleared.
//! 3. Countdown: risk modifiers and emergency programmes tick down.
//! 4. Economy: the [`MonthlySimulation`] writes the macro indicators and
//!    the derived fiscal position.
//! 5. Events: scheduled events are raised.
//! 6. Audit: constraints are re-checked and the ledger verified.
//!
//! The game ends on reaching the terminal turn; after that the transition
//! returns its input unchanged.

use tracing::{debug, info, warn};

use chancellor_ledger::{LedgerCheck, check_state, commit, recompute_aggregates, verify_ledger};
use chancellor_politics::evaluate_promises;
use chancellor_types::{FiscalBaseline, FiscalState, GameState};

use crate::clock::CalendarMonth;
use crate::economy::MonthlySimulation;
use crate::events::{expire_temporaries, raise_events};

/// A fiscal-year baseline taken from the current lines.
pub fn snapshot_baseline(fiscal: &FiscalState, fiscal_year: i32) -> FiscalBaseline {
    FiscalBaseline {
        fiscal_year,
        department_totals: fiscal
            .departments
            .iter()
            .map(|(d, b)| (*d, b.current.saturating_add(b.capital)))
            .collect(),
        tax_rates: fiscal.tax_rates.clone(),
    }
}

fn commit_matured(mut state: GameState) -> GameState {
    let turn = state.metadata.turn;
    let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending_budgets)
        .into_iter()
        .partition(|b| b.apply_turn <= turn);
    state.pending_budgets = waiting;

    let committed = !due.is_empty();
    for budget in due {
        let submitted = budget.submitted_turn;
        state = match commit(state.clone(), &budget.changes) {
            Ok(next) => {
                info!(turn, submitted, "deferred budget took effect");
                next
            }
            Err(error) => {
                warn!(%error, turn, submitted, "deferred budget dropped");
                state
            }
        };
    }
    if committed {
        state = evaluate_promises(state);
    }

    let legislature = &mut state.legislature;
    if legislature.delay_until_turn.is_some_and(|until| until <= turn) {
        legislature.delay_until_turn = None;
        legislature.delay_extensions = 0;
        debug!(turn, "legislative delay lifted");
    }
    state
}

/// Advance the game by one month.
pub fn advance_turn(mut state: GameState, economy: &impl MonthlySimulation) -> GameState {
    if state.metadata.game_over {
        debug!(turn = state.metadata.turn, "advance ignored: game over");
        return state;
    }
    let last_turn = state.metadata.total_turns.max(1).saturating_sub(1);
    if state.metadata.turn >= last_turn {
        state.metadata.game_over = true;
        return state;
    }

    state.metadata.turn = state.metadata.turn.saturating_add(1);
    let month = CalendarMonth::of(&state.metadata).next();
    month.store(&mut state.metadata);
    if month.starts_fiscal_year() {
        state.fiscal.baseline = snapshot_baseline(&state.fiscal, month.fiscal_year());
        debug!(fiscal_year = month.fiscal_year(), "fiscal-year baseline taken");
    }

    let state = commit_matured(state);
    let state = expire_temporaries(state);
    let state = economy.step(state);
    let mut state = raise_events(state);

    state.manifesto.last_check = check_state(&state);
    if let LedgerCheck::Drift(anomaly) = verify_ledger(&state.fiscal) {
        warn!(%anomaly, "ledger drift repaired");
        recompute_aggregates(&mut state.fiscal);
    }

    let turn = state.metadata.turn;
    if turn >= last_turn {
        state.metadata.game_over = true;
        info!(turn, "final turn reached");
    }
    info!(
        turn,
        month = state.metadata.month,
        year = state.metadata.year,
        deficit = %state.fiscal.deficit,
        debt_to_gdp = %state.fiscal.debt_to_gdp,
        violations = state.manifesto.violation_count(),
        "turn advanced"
    );
    state
}
