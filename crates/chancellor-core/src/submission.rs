//! Budget submission.
//!
//! [`submit_budget`] runs a proposal through the full pipeline in a fixed
//! order:
//!
//! 1. Constraint check of the proposal against the current state.
//! 2. Roster check, regenerating it from the seed if missing.
//! 3. Stance scoring of every governing member and a bloc recount.
//! 4. The division: granular over the roster, or aggregate when no roster
//!    could be produced.
//! 5. Lobbying overrides are cleared and the division recorded.
//! 6. If the vote passed, the ledger applies the changes through the
//!    friction gate and promises are re-evaluated. If it failed, nothing is
//!    committed and the proposal is kept as the failed budget.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use chancellor_ledger::{
    Disposition, FiscalProjection, apply_budget_changes, check_changes, preview,
};
use chancellor_politics::{
    StanceContext, VoteInput, clear_overrides, evaluate_promises, score_all, simulate_vote,
    summarize,
};
use chancellor_types::{
    BudgetChanges, ConstraintId, ConstraintResult, GameState, VoteRecord, VoteResult, VoteSummary,
};

use crate::config::GameConfig;
use crate::error::CoreError;
use crate::game::ensure_roster;

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The vote passed and the changes are in the ledger.
    Enacted {
        /// The division.
        vote: VoteResult,
    },
    /// The vote passed but friction queued the changes.
    Deferred {
        /// The division.
        vote: VoteResult,
        /// Turn the changes take effect.
        apply_turn: u32,
    },
    /// The vote failed; nothing was committed.
    Defeated {
        /// The division.
        vote: VoteResult,
    },
    /// The proposal never reached a vote.
    Rejected {
        /// Why.
        reason: String,
    },
}

impl SubmissionOutcome {
    /// The division, if one was held.
    pub const fn vote(&self) -> Option<&VoteResult> {
        match self {
            Self::Enacted { vote } | Self::Deferred { vote, .. } | Self::Defeated { vote } => {
                Some(vote)
            }
            Self::Rejected { .. } => None,
        }
    }
}

/// Deficit change caused by `changes`, £bn a year.
pub fn deficit_delta_bn(state: &GameState, changes: &BudgetChanges) -> Result<f64, CoreError> {
    let proposed = preview(&state.fiscal, changes)?;
    let before = FiscalProjection::project(&state.fiscal, &state.economy).deficit;
    let after = FiscalProjection::project(&proposed, &state.economy).deficit;
    Ok(after.saturating_sub(before).to_f64().unwrap_or(0.0))
}

/// Summary statistics for an aggregate-mode division.
pub fn build_vote_summary(
    state: &GameState,
    changes: &BudgetChanges,
    violations: &[ConstraintResult],
    deficit_delta_bn: f64,
    config: &GameConfig,
) -> VoteSummary {
    let composition = &config.legislature.composition;
    let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    VoteSummary {
        backbench_satisfaction: state.political.backbench_satisfaction,
        violation_count: count(violations.iter().filter(|r| r.violated).count()),
        deficit_delta_bn,
        rule_compliant: !violations
            .iter()
            .any(|r| r.violated && matches!(r.id, ConstraintId::Rule(_))),
        tax_rises: count(changes.tax_rises().count()),
        spending_cuts: count(changes.spending_cuts().count()),
        executive_trust: state.political.executive_trust,
        governing_seats: composition.governing,
        payroll_seats: composition.payroll,
        other_seats: composition
            .seats()
            .saturating_sub(composition.governing),
    }
}

fn rejected(state: GameState, reason: String) -> (GameState, SubmissionOutcome) {
    warn!(reason = %reason, "budget submission rejected");
    (state, SubmissionOutcome::Rejected { reason })
}

/// Put `changes` to a vote and apply them if it passes.
pub fn submit_budget(
    state: GameState,
    changes: &BudgetChanges,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> (GameState, SubmissionOutcome) {
    if state.metadata.game_over {
        return rejected(state, "the game is over".to_owned());
    }
    let violations = match check_changes(&state, changes) {
        Ok(results) => results,
        Err(error) => return rejected(state, error.to_string()),
    };
    let deficit_delta = match deficit_delta_bn(&state, changes) {
        Ok(delta) => delta,
        Err(error) => return rejected(state, error.to_string()),
    };
    let active_violations = u32::try_from(violations.iter().filter(|r| r.violated).count())
        .unwrap_or(u32::MAX);

    let mut state = ensure_roster(state, &config.legislature.composition);
    let turn = state.metadata.turn;

    let outcome = if state.legislature.roster.is_empty() {
        let summary = build_vote_summary(&state, changes, &violations, deficit_delta, config);
        simulate_vote(&VoteInput::Aggregate(&summary), &config.vote, rng)
    } else {
        let legislature = &state.legislature;
        let context = StanceContext {
            fiscal: &state.fiscal,
            deficit_delta_bn: deficit_delta,
            whip_strength: legislature.whip_strength,
            seed: state.metadata.seed,
            previous: &legislature.stances,
            promises: &legislature.promises,
            config: &config.stance.model,
        };
        let stances = score_all(&legislature.roster, changes, active_violations, turn, &context);
        let outcome = simulate_vote(
            &VoteInput::Granular {
                roster: &legislature.roster,
                stances: &stances,
            },
            &config.vote,
            rng,
        );
        state.legislature.blocs = summarize(&stances, turn);
        state.legislature.stances = stances;
        outcome
    };

    clear_overrides(&mut state.legislature.stances);
    let vote = outcome.result;
    state.legislature.voting_records.insert(
        turn,
        VoteRecord {
            turn,
            result: vote.clone(),
            ballots: outcome.ballots,
        },
    );
    state.legislature.last_vote = Some(vote.clone());

    if !vote.passed {
        state.failed_budget = Some(changes.clone());
        state.manifesto.last_check = violations;
        info!(turn, majority = vote.majority, "budget defeated");
        return (state, SubmissionOutcome::Defeated { vote });
    }

    match apply_budget_changes(state.clone(), changes, &config.friction) {
        Ok(application) => {
            let mut state = evaluate_promises(application.state);
            state.failed_budget = None;
            let outcome = match application.disposition {
                Disposition::Applied => SubmissionOutcome::Enacted { vote },
                Disposition::Deferred { apply_turn } => {
                    SubmissionOutcome::Deferred { vote, apply_turn }
                }
            };
            info!(turn, "budget passed");
            (state, outcome)
        }
        Err(error) => rejected(state, error.to_string()),
    }
}

/// Abandon the failed budget. Fiscal lines are untouched.
pub fn withdraw_budget(mut state: GameState) -> GameState {
    if state.failed_budget.take().is_some() {
        info!(turn = state.metadata.turn, "failed budget withdrawn");
    }
    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use chancellor_types::{Department, Party, StanceLabel, TaxLever};

    use super::*;
    use crate::game::default_state;

    fn governing_members(state: &GameState) -> usize {
        state
            .legislature
            .roster
            .values()
            .filter(|m| m.party == Party::Governing)
            .count()
    }

    #[test]
    fn empty_budget_passes_on_a_fresh_game() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let (state, outcome) = submit_budget(default_state(), &BudgetChanges::new(), &config, &mut rng);
        assert!(matches!(outcome, SubmissionOutcome::Enacted { .. }));
        assert_eq!(state.legislature.stances.len(), governing_members(&state));
        assert!(state.legislature.voting_records.contains_key(&0));
        assert!(state.failed_budget.is_none());
    }

    #[test]
    fn stances_are_scored_and_overrides_cleared() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let changes = BudgetChanges::new().with_current(Department::Health, dec!(2));
        let (state, _) = submit_budget(default_state(), &changes, &config, &mut rng);
        assert!(state.legislature.stances.values().all(|s| s.override_label.is_none()));
        assert!(state
            .legislature
            .stances
            .values()
            .all(|s| s.label == StanceLabel::from_score(s.score)));
        let blocs = &state.legislature.blocs;
        assert_eq!(
            blocs.support + blocs.oppose + blocs.undecided,
            u32::try_from(governing_members(&state)).unwrap()
        );
    }

    #[test]
    fn defeat_keeps_the_lines_and_the_proposal() {
        let mut config = GameConfig::default();
        // A chamber where the governing party is a small minority.
        config.legislature.composition.governing = 100;
        config.legislature.composition.payroll = 40;
        config.legislature.composition.opposition = 480;
        let state = crate::game::new_game_state(&config);
        let before = state.fiscal.clone();
        let changes = BudgetChanges::new().with_tax(TaxLever::Vat, dec!(1));
        let mut rng = StdRng::seed_from_u64(3);
        let (state, outcome) = submit_budget(state, &changes, &config, &mut rng);
        assert!(matches!(outcome, SubmissionOutcome::Defeated { .. }));
        assert_eq!(state.fiscal, before);
        assert_eq!(state.failed_budget, Some(changes));

        let withdrawn = withdraw_budget(state);
        assert!(withdrawn.failed_budget.is_none());
        assert_eq!(withdrawn.fiscal, before);
    }

    #[test]
    fn game_over_rejects() {
        let mut state = default_state();
        state.metadata.game_over = true;
        let mut rng = StdRng::seed_from_u64(4);
        let (_, outcome) =
            submit_budget(state, &BudgetChanges::new(), &GameConfig::default(), &mut rng);
        assert!(outcome.vote().is_none());
    }

    #[test]
    fn summary_counts_rises_cuts_and_rule_breaches() {
        let state = default_state();
        let changes = BudgetChanges::new()
            .with_tax(TaxLever::Vat, dec!(1))
            .with_tax(TaxLever::CorporationTax, dec!(1))
            .with_current(Department::Justice, dec!(-1));
        let violations = check_changes(&state, &changes).unwrap();
        let summary = build_vote_summary(&state, &changes, &violations, 4.0, &GameConfig::default());
        assert_eq!(summary.tax_rises, 2);
        assert_eq!(summary.spending_cuts, 1);
        assert_eq!(summary.governing_seats, 400);
        assert_eq!(summary.other_seats, 250);
    }
}
