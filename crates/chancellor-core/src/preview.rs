//! Live stance preview while a budget is being drafted.
//!
//! Every slider movement calls [`StancePreview::request`]; the host polls
//! from its frame loop. Requests inside the debounce window collapse into
//! one recomputation against the latest draft, and the bloc summary is only
//! recounted when scores have moved materially.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use chancellor_ledger::check_changes;
use chancellor_politics::{BlocTracker, Debouncer, StanceConfig, StanceContext, score_all};
use chancellor_types::{BlocSummary, BudgetChanges, ConstraintResult, GameState, LegislatorId, Stance};

use crate::config::GameConfig;
use crate::submission::deficit_delta_bn;

/// A recomputed preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewUpdate {
    /// Scores of the governing members against the draft.
    pub stances: BTreeMap<LegislatorId, Stance>,
    /// New bloc summary, when the shift was material.
    pub blocs: Option<BlocSummary>,
    /// Constraint results for the draft.
    pub violations: Vec<ConstraintResult>,
}

impl PreviewUpdate {
    /// Write the previewed stances, blocs and constraint results into
    /// `state`. Fiscal lines are untouched.
    pub fn apply(self, mut state: GameState) -> GameState {
        state.legislature.stances = self.stances;
        if let Some(blocs) = self.blocs {
            state.legislature.blocs = blocs;
        }
        state.manifesto.last_check = self.violations;
        state
    }
}

/// Debounced stance recomputation for a draft budget.
#[derive(Debug, Clone)]
pub struct StancePreview {
    debouncer: Debouncer<BudgetChanges>,
    tracker: BlocTracker,
    model: StanceConfig,
}

impl StancePreview {
    /// A preview using the stance section of `config`.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.stance.debounce_window()),
            tracker: BlocTracker::new(config.stance.materiality_threshold),
            model: config.stance.model.clone(),
        }
    }

    /// Note that the draft changed.
    pub fn request(&mut self, draft: BudgetChanges, now: Instant) {
        self.debouncer.request(draft, now);
    }

    /// Whether a recomputation is waiting for its window.
    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Recompute if the latest draft has been quiet for the window.
    pub fn poll(&mut self, state: &GameState, now: Instant) -> Option<PreviewUpdate> {
        let draft = self.debouncer.poll(now)?;
        self.recompute(state, &draft)
    }

    fn recompute(&mut self, state: &GameState, draft: &BudgetChanges) -> Option<PreviewUpdate> {
        let violations = match check_changes(state, draft) {
            Ok(results) => results,
            Err(error) => {
                warn!(%error, "preview skipped");
                return None;
            }
        };
        let deficit_delta = deficit_delta_bn(state, draft).unwrap_or(0.0);
        let active = u32::try_from(violations.iter().filter(|r| r.violated).count())
            .unwrap_or(u32::MAX);
        let legislature = &state.legislature;
        let turn = state.metadata.turn;
        let context = StanceContext {
            fiscal: &state.fiscal,
            deficit_delta_bn: deficit_delta,
            whip_strength: legislature.whip_strength,
            seed: state.metadata.seed,
            previous: &legislature.stances,
            promises: &legislature.promises,
            config: &self.model,
        };
        let stances = score_all(&legislature.roster, draft, active, turn, &context);
        let blocs = self.tracker.observe(&stances, turn);
        debug!(members = stances.len(), recounted = blocs.is_some(), "preview recomputed");
        Some(PreviewUpdate {
            stances,
            blocs,
            violations,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use chancellor_types::Department;

    use super::*;
    use crate::game::default_state;

    fn at(start: Instant, millis: u64) -> Instant {
        start.checked_add(Duration::from_millis(millis)).unwrap()
    }

    #[test]
    fn burst_of_edits_recomputes_once_against_the_latest() {
        let config = GameConfig::default();
        let state = default_state();
        let mut preview = StancePreview::new(&config);
        let start = Instant::now();
        for (i, offset) in [0_u64, 40, 80, 120].into_iter().enumerate() {
            let amount = rust_decimal::Decimal::from(i);
            preview.request(
                BudgetChanges::new().with_current(Department::Health, amount),
                at(start, offset),
            );
        }
        assert!(preview.poll(&state, at(start, 200)).is_none());
        let update = preview.poll(&state, at(start, 400)).unwrap();
        assert!(!preview.is_pending());
        assert!(update.blocs.is_some());
        assert!(!update.stances.is_empty());
    }

    #[test]
    fn immaterial_change_keeps_the_blocs() {
        let config = GameConfig::default();
        let state = default_state();
        let mut preview = StancePreview::new(&config);
        let start = Instant::now();

        preview.request(BudgetChanges::new(), start);
        let first = preview.poll(&state, at(start, 300)).unwrap();
        assert!(first.blocs.is_some());

        preview.request(BudgetChanges::new(), at(start, 400));
        let second = preview.poll(&state, at(start, 700)).unwrap();
        assert!(second.blocs.is_none());
        assert_eq!(first.stances, second.stances);
    }

    #[test]
    fn applying_an_update_leaves_the_ledger_alone() {
        let config = GameConfig::default();
        let state = default_state();
        let mut preview = StancePreview::new(&config);
        let start = Instant::now();
        preview.request(
            BudgetChanges::new().with_current(Department::Defence, dec!(-5)),
            start,
        );
        let update = preview.poll(&state, at(start, 300)).unwrap();
        let next = update.apply(state.clone());
        assert_eq!(next.fiscal, state.fiscal);
        assert!(!next.legislature.stances.is_empty());
    }
}
