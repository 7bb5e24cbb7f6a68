//! New-game construction and roster recovery.

use tracing::{error, info, warn};

use chancellor_ledger::check_state;
use chancellor_politics::{RosterConfig, generate_roster};
use chancellor_types::{GameState, Metadata, RosterId, SCHEMA_VERSION};

use crate::clock::CalendarMonth;
use crate::config::GameConfig;
use crate::economy::refresh_fiscal_position;

/// A fresh game built from `config`.
///
/// The roster is generated up front; the derived fiscal position and the
/// opening constraint check are filled in so the first screen has data.
pub fn new_game_state(config: &GameConfig) -> GameState {
    let game = &config.game;
    let mut state = GameState {
        metadata: Metadata {
            schema_version: SCHEMA_VERSION,
            turn: 0,
            month: game.start_month.clamp(1, 12),
            year: game.start_year,
            total_turns: game.total_turns.max(1),
            mode: game.mode,
            game_over: false,
            seed: game.seed,
            fiscal_rule: game.fiscal_rule,
        },
        ..GameState::default()
    };
    state.fiscal.baseline.fiscal_year = CalendarMonth::of(&state.metadata).fiscal_year();
    state.legislature.whip_strength = config.legislature.whip_strength.clamp(0.0, 1.0);
    refresh_fiscal_position(&mut state.fiscal, &state.economy);
    state.manifesto.last_check = check_state(&state);

    let state = ensure_roster(state, &config.legislature.composition);
    info!(
        seed = state.metadata.seed,
        members = state.legislature.roster.len(),
        "new game created"
    );
    state
}

/// A fresh game with the default configuration.
pub fn default_state() -> GameState {
    new_game_state(&GameConfig::default())
}

/// Make sure the roster is populated.
///
/// A missing roster is regenerated from the game seed with `composition`;
/// if that fails the default composition is tried. If both fail the state
/// is returned without a roster and votes fall back to aggregate mode.
pub fn ensure_roster(mut state: GameState, composition: &RosterConfig) -> GameState {
    if !state.legislature.roster.is_empty() {
        return state;
    }
    let seed = state.metadata.seed;
    let roster = generate_roster(composition, seed).or_else(|first| {
        warn!(error = %first, "roster generation failed; retrying with default composition");
        generate_roster(&RosterConfig::default(), seed)
    });
    match roster {
        Ok(roster) => {
            state.legislature.roster = roster;
            if state.legislature.roster_id.is_none() {
                state.legislature.roster_id = Some(RosterId::new());
            }
        }
        Err(second) => {
            error!(
                error = %second,
                "could not generate a legislator roster; votes will use aggregate statistics"
            );
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use chancellor_politics::MAX_SEATS;

    use super::*;

    #[test]
    fn default_game_has_a_full_roster_and_no_violations() {
        let state = default_state();
        assert_eq!(state.legislature.roster.len(), 650);
        assert!(state.legislature.roster_id.is_some());
        assert_eq!(state.manifesto.violation_count(), 0);
        assert!(!state.fiscal.revenue.is_zero());
        assert_eq!(state.metadata.turn, 0);
    }

    #[test]
    fn same_seed_same_roster() {
        let a = default_state();
        let b = default_state();
        assert_eq!(a.legislature.roster, b.legislature.roster);
    }

    #[test]
    fn invalid_composition_falls_back_to_default() {
        let broken = RosterConfig {
            governing: MAX_SEATS,
            ..RosterConfig::default()
        };
        let state = ensure_roster(GameState::default(), &broken);
        assert_eq!(state.legislature.roster.len(), 650);
    }

    #[test]
    fn existing_roster_is_kept() {
        let state = default_state();
        let roster = state.legislature.roster.clone();
        let state = ensure_roster(state, &RosterConfig::default());
        assert_eq!(state.legislature.roster, roster);
    }
}
