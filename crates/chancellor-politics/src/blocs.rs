//! Bloc summaries gated by a materiality threshold.
//!
//! Recounting the blocs walks the whole roster, so [`BlocTracker`] only
//! does it when the mean absolute score shift since the last recount
//! exceeds its threshold.

use std::collections::BTreeMap;

use tracing::debug;

use chancellor_types::{BlocSummary, LegislatorId, Stance, StanceLabel};

/// Count stances per band and average their scores.
pub fn summarize(stances: &BTreeMap<LegislatorId, Stance>, turn: u32) -> BlocSummary {
    let mut summary = BlocSummary {
        computed_turn: turn,
        ..BlocSummary::default()
    };
    let mut total = 0.0;
    for stance in stances.values() {
        match stance.label {
            StanceLabel::Support => summary.support = summary.support.saturating_add(1),
            StanceLabel::Oppose => summary.oppose = summary.oppose.saturating_add(1),
            StanceLabel::Undecided => summary.undecided = summary.undecided.saturating_add(1),
        }
        total += stance.score;
    }
    if !stances.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let count = stances.len() as f64;
        summary.mean_score = total / count;
    }
    summary
}

/// Tracks the scores behind the last bloc summary.
#[derive(Debug, Clone, Default)]
pub struct BlocTracker {
    /// Mean absolute shift, in score points, that triggers a recount.
    pub threshold: f64,
    last_scores: BTreeMap<LegislatorId, f64>,
}

impl BlocTracker {
    /// A tracker that has never summarised anything.
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_scores: BTreeMap::new(),
        }
    }

    /// Mean absolute score change against the last recount.
    ///
    /// Members added or removed since then count as a full shift.
    pub fn shift(&self, stances: &BTreeMap<LegislatorId, Stance>) -> f64 {
        if stances.is_empty() && self.last_scores.is_empty() {
            return 0.0;
        }
        if stances.len() != self.last_scores.len() {
            return f64::INFINITY;
        }
        let mut total = 0.0;
        for (id, stance) in stances {
            let Some(previous) = self.last_scores.get(id) else {
                return f64::INFINITY;
            };
            total += (stance.score - previous).abs();
        }
        #[allow(clippy::cast_precision_loss)]
        let count = stances.len() as f64;
        total / count
    }

    /// Recount if the shift is material, returning the new summary.
    pub fn observe(
        &mut self,
        stances: &BTreeMap<LegislatorId, Stance>,
        turn: u32,
    ) -> Option<BlocSummary> {
        let shift = self.shift(stances);
        if shift <= self.threshold {
            debug!(shift, threshold = self.threshold, "bloc recount skipped");
            return None;
        }
        self.last_scores = stances.iter().map(|(id, s)| (*id, s.score)).collect();
        let summary = summarize(stances, turn);
        debug!(
            support = summary.support,
            oppose = summary.oppose,
            undecided = summary.undecided,
            "blocs recounted"
        );
        Some(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stances(scores: &[f64]) -> BTreeMap<LegislatorId, Stance> {
        scores
            .iter()
            .zip(1_u32..)
            .map(|(score, id)| {
                (
                    LegislatorId(id),
                    Stance {
                        label: StanceLabel::from_score(*score),
                        score: *score,
                        ..Stance::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn summary_counts_each_band() {
        let summary = summarize(&stances(&[70.0, 65.0, 50.0, 30.0]), 4);
        assert_eq!(summary.support, 2);
        assert_eq!(summary.undecided, 1);
        assert_eq!(summary.oppose, 1);
        assert!((summary.mean_score - 53.75).abs() < 1e-9);
        assert_eq!(summary.computed_turn, 4);
    }

    #[test]
    fn first_observation_always_recounts() {
        let mut tracker = BlocTracker::new(2.0);
        assert!(tracker.observe(&stances(&[55.0, 61.0]), 0).is_some());
    }

    #[test]
    fn small_shift_is_ignored_and_large_shift_recounts() {
        let mut tracker = BlocTracker::new(2.0);
        tracker.observe(&stances(&[55.0, 61.0]), 0).unwrap();
        assert!(tracker.observe(&stances(&[56.0, 62.0]), 0).is_none());
        let summary = tracker.observe(&stances(&[40.0, 45.0]), 1).unwrap();
        assert_eq!(summary.oppose, 1);
        assert_eq!(summary.undecided, 1);
    }

    #[test]
    fn membership_change_is_material() {
        let mut tracker = BlocTracker::new(50.0);
        tracker.observe(&stances(&[55.0]), 0).unwrap();
        assert!(tracker.observe(&stances(&[55.0, 55.0]), 0).is_some());
    }
}
