//! Headless campaign runner.
//!
//! Plays a complete game without a player. Budgets are tabled in the
//! spring budget and autumn statement months; before each one the runner
//! previews stances and lobbies undecided governing members. Every event is
//! answered with its first response, and the game is autosaved after each
//! turn.

use std::time::Instant;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use chancellor_core::{
    BaselineEconomy, GameConfig, InMemoryStore, StancePreview, SubmissionOutcome, advance_turn,
    load_game, new_game_state, respond_to_event, save_game, submit_budget,
};
use chancellor_politics::{LobbyOutcome, lobby};
use chancellor_types::{
    BudgetChanges, Department, GameState, LegislatorId, LobbyApproach, Party, StanceLabel,
    TaxLever,
};

use crate::error::EngineError;

/// Members approached before each budget.
const LOBBY_LIMIT: usize = 8;

/// Months in which a budget is tabled.
const BUDGET_MONTHS: [u8; 2] = [4, 11];

/// Totals for a finished campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignReport {
    /// Turns advanced.
    pub turns_played: u32,
    /// Budgets applied on the day.
    pub enacted: u32,
    /// Budgets queued by friction.
    pub deferred: u32,
    /// Budgets voted down.
    pub defeated: u32,
    /// Budgets that never reached a vote.
    pub rejected: u32,
    /// Events answered.
    pub events_resolved: u32,
    /// Members won over by lobbying.
    pub lobby_successes: u32,
    /// Autosaves that failed to write.
    pub failed_saves: u32,
}

impl CampaignReport {
    fn record(&mut self, outcome: &SubmissionOutcome) {
        let counter = match outcome {
            SubmissionOutcome::Enacted { .. } => &mut self.enacted,
            SubmissionOutcome::Deferred { .. } => &mut self.deferred,
            SubmissionOutcome::Defeated { .. } => &mut self.defeated,
            SubmissionOutcome::Rejected { .. } => &mut self.rejected,
        };
        *counter = counter.saturating_add(1);
    }
}

/// The runner's proposal for the coming year.
///
/// Consolidates when borrowing is above 3% of GDP, otherwise invests in
/// public services.
pub fn draft_budget(state: &GameState) -> BudgetChanges {
    let ceiling = state
        .economy
        .nominal_gdp
        .saturating_mul(Decimal::new(3, 2));
    if state.fiscal.deficit > ceiling {
        BudgetChanges::new()
            .with_tax(TaxLever::IncomeTaxHigher, Decimal::ONE)
            .with_current(Department::Welfare, Decimal::new(-2, 0))
            .with_current(Department::Defence, Decimal::NEGATIVE_ONE)
    } else {
        BudgetChanges::new()
            .with_current(Department::Health, Decimal::new(3, 0))
            .with_current(Department::Education, Decimal::new(15, 1))
            .with_capital(Department::Transport, Decimal::new(2, 0))
    }
}

fn answer_events(mut state: GameState, report: &mut CampaignReport) -> GameState {
    while let Some(event) = state.events.pending.first() {
        let id = event.id;
        let before = state.events.pending.len();
        state = respond_to_event(state, id, 0);
        if state.events.pending.len() >= before {
            warn!(%id, "event could not be answered");
            break;
        }
        report.events_resolved = report.events_resolved.saturating_add(1);
    }
    state
}

fn undecided_governing(state: &GameState) -> Vec<LegislatorId> {
    let legislature = &state.legislature;
    legislature
        .stances
        .iter()
        .filter(|(_, stance)| stance.label == StanceLabel::Undecided)
        .filter(|(id, _)| {
            legislature
                .roster
                .get(id)
                .is_some_and(|m| m.party == Party::Governing)
        })
        .map(|(id, _)| *id)
        .take(LOBBY_LIMIT)
        .collect()
}

fn table_budget(
    state: GameState,
    config: &GameConfig,
    rng: &mut impl Rng,
    report: &mut CampaignReport,
) -> GameState {
    let draft = draft_budget(&state);

    let mut preview = StancePreview::new(config);
    let now = Instant::now();
    preview.request(draft.clone(), now);
    let settled = now.checked_add(config.stance.debounce_window()).unwrap_or(now);
    let mut state = match preview.poll(&state, settled) {
        Some(update) => update.apply(state),
        None => state,
    };

    for member in undecided_governing(&state) {
        let (next, outcome) = lobby(
            state,
            member,
            LobbyApproach::PersonalAppeal,
            &config.lobbying,
            rng,
        );
        state = next;
        if matches!(outcome, LobbyOutcome::Succeeded { .. }) {
            report.lobby_successes = report.lobby_successes.saturating_add(1);
        }
    }

    let (state, outcome) = submit_budget(state, &draft, config, rng);
    report.record(&outcome);
    info!(turn = state.metadata.turn, ?outcome, "budget tabled");
    state
}

/// Play a full game from `config`.
///
/// Returns the final state and the campaign totals. The final autosave is
/// read back from the store; failing to restore it is an error.
pub fn run_campaign(
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<(GameState, CampaignReport), EngineError> {
    let economy = BaselineEconomy::default();
    let mut store = InMemoryStore::new();
    let slot = config.persistence.slot;
    let mut report = CampaignReport::default();
    let mut state = new_game_state(config);

    while !state.metadata.game_over {
        state = answer_events(state, &mut report);
        if BUDGET_MONTHS.contains(&state.metadata.month) {
            state = table_budget(state, config, rng, &mut report);
        }
        state = advance_turn(state, &economy);
        report.turns_played = report.turns_played.saturating_add(1);

        let saved = save_game(&mut store, &state, &config.persistence, slot);
        if !saved.slot_written {
            report.failed_saves = report.failed_saves.saturating_add(1);
        }
        debug!(turn = state.metadata.turn, bytes = store.used_bytes(), "autosaved");
    }

    let key = config.persistence.slot_key(slot);
    let restored = load_game(&store, config, slot).ok_or(EngineError::Resume { key })?;
    if restored != state {
        warn!("restored autosave differs from the live state");
    }
    Ok((state, report))
}
