//! Vote inputs and results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Ballot, VoteMode, VoteNarrative};
use crate::ids::LegislatorId;

/// Summary statistics used when per-member stances are unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteSummary {
    /// Backbench satisfaction, 0--100.
    pub backbench_satisfaction: f64,
    /// Number of active manifesto and fiscal-rule violations.
    pub violation_count: u32,
    /// Change in the annual deficit caused by the proposal, £bn.
    pub deficit_delta_bn: f64,
    /// Whether the proposal complies with the active fiscal rule.
    pub rule_compliant: bool,
    /// Number of tax levers that rise.
    pub tax_rises: u32,
    /// Number of departments whose spending falls.
    pub spending_cuts: u32,
    /// Trust between the prime minister and the chancellor, 0--100.
    pub executive_trust: f64,
    /// Seats held by the governing party.
    pub governing_seats: u32,
    /// Governing members on the payroll.
    pub payroll_seats: u32,
    /// Seats held by everyone else.
    pub other_seats: u32,
}

/// Outcome of a simulated division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteResult {
    /// Members voting aye.
    pub ayes: u32,
    /// Members voting no.
    pub noes: u32,
    /// Members not voting.
    pub abstentions: u32,
    /// Ayes minus noes.
    pub majority: i64,
    /// Whether the budget passed.
    pub passed: bool,
    /// Narrative class of the outcome.
    pub narrative: VoteNarrative,
    /// Phrase describing the outcome.
    pub narrative_text: String,
    /// Governing members who did not vote aye.
    ///
    /// Only filled for granular divisions. Aggregate divisions have no
    /// individual ballots, so this stays empty and [`Self::rebel_count`]
    /// is the only record of the rebellion.
    pub rebels: Vec<LegislatorId>,
    /// Number of governing members who did not vote aye.
    pub rebel_count: u32,
    /// Which simulation path produced the result.
    pub mode: VoteMode,
}

/// A stored division with individual ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoteRecord {
    /// Turn the vote was held.
    pub turn: u32,
    /// The outcome.
    pub result: VoteResult,
    /// Per-member ballots; empty for aggregate votes.
    #[serde(default, with = "crate::codec::pair_seq")]
    #[ts(as = "Vec<(LegislatorId, Ballot)>")]
    pub ballots: BTreeMap<LegislatorId, Ballot>,
}
