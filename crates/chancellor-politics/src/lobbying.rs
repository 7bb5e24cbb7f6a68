//! Direct lobbying of individual legislators.
//!
//! Lobbying resolves immediately: the roll happens inside [`lobby`] and
//! the returned state already reflects success or failure. A successful
//! approach pins the member's stance to support until the next budget
//! submission clears overrides.

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use chancellor_types::{
    GameState, LegislatorId, LobbyApproach, Party, Promise, PromiseCategory, PromiseId, Stance,
    StanceLabel,
};

/// Lobbying parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LobbyConfig {
    /// Base success chance of a personal appeal.
    #[serde(default = "default_personal_appeal")]
    pub personal_appeal: f64,

    /// Base success chance of whip pressure.
    #[serde(default = "default_whip_pressure")]
    pub whip_pressure: f64,

    /// Base success chance of a constituency promise.
    #[serde(default = "default_constituency_promise")]
    pub constituency_promise: f64,

    /// Backbench satisfaction lost when an approach fails.
    #[serde(default = "default_failure_cost")]
    pub failure_cost: f64,

    /// Backbench satisfaction lost when whip pressure fails.
    #[serde(default = "default_whip_failure_cost")]
    pub whip_failure_cost: f64,

    /// Floor on any success chance.
    #[serde(default = "default_min_chance")]
    pub min_chance: f64,

    /// Ceiling on any success chance.
    #[serde(default = "default_max_chance")]
    pub max_chance: f64,
}

const fn default_personal_appeal() -> f64 {
    0.45
}

const fn default_whip_pressure() -> f64 {
    0.55
}

const fn default_constituency_promise() -> f64 {
    0.7
}

const fn default_failure_cost() -> f64 {
    2.0
}

const fn default_whip_failure_cost() -> f64 {
    4.0
}

const fn default_min_chance() -> f64 {
    0.05
}

const fn default_max_chance() -> f64 {
    0.95
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            personal_appeal: default_personal_appeal(),
            whip_pressure: default_whip_pressure(),
            constituency_promise: default_constituency_promise(),
            failure_cost: default_failure_cost(),
            whip_failure_cost: default_whip_failure_cost(),
            min_chance: default_min_chance(),
            max_chance: default_max_chance(),
        }
    }
}

impl LobbyConfig {
    const fn base_chance(&self, approach: LobbyApproach) -> f64 {
        match approach {
            LobbyApproach::PersonalAppeal => self.personal_appeal,
            LobbyApproach::WhipPressure => self.whip_pressure,
            LobbyApproach::ConstituencyPromise(_) => self.constituency_promise,
        }
    }

    const fn failure_cost(&self, approach: LobbyApproach) -> f64 {
        match approach {
            LobbyApproach::WhipPressure => self.whip_failure_cost,
            LobbyApproach::PersonalAppeal | LobbyApproach::ConstituencyPromise(_) => {
                self.failure_cost
            }
        }
    }
}

/// Result of a lobbying attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyOutcome {
    /// The member now supports the budget.
    Succeeded {
        /// Promise made to secure the support, if any.
        promise: Option<PromiseId>,
    },
    /// The member was unmoved.
    Failed,
    /// The member does not exist; nothing changed.
    Ignored,
}

/// Chance that `approach` wins over a member.
pub fn success_chance(
    approach: LobbyApproach,
    score: f64,
    rebelliousness: f64,
    party: Party,
    config: &LobbyConfig,
) -> f64 {
    let chance = (config.base_chance(approach) + (score - 50.0) / 100.0 - rebelliousness * 0.3)
        .max(config.min_chance)
        .min(config.max_chance);
    if party == Party::Governing {
        chance
    } else {
        chance * 0.3
    }
}

fn next_promise_id(state: &GameState) -> PromiseId {
    state
        .legislature
        .promises
        .keys()
        .next_back()
        .map_or(PromiseId(1), |id| id.next())
}

/// Lobby one member.
pub fn lobby(
    mut state: GameState,
    member: LegislatorId,
    approach: LobbyApproach,
    config: &LobbyConfig,
    rng: &mut impl Rng,
) -> (GameState, LobbyOutcome) {
    let Some(legislator) = state.legislature.roster.get(&member) else {
        debug!(%member, "lobbying ignored: unknown member");
        return (state, LobbyOutcome::Ignored);
    };
    let turn = state.metadata.turn;
    let score = state
        .legislature
        .stances
        .get(&member)
        .map_or(Stance::default().score, |s| s.score);
    let chance = success_chance(
        approach,
        score,
        legislator.rebelliousness,
        legislator.party,
        config,
    );

    if rng.random::<f64>() >= chance {
        let satisfaction = &mut state.political.backbench_satisfaction;
        *satisfaction = (*satisfaction - config.failure_cost(approach)).clamp(0.0, 100.0);
        info!(%member, ?approach, chance, "lobbying failed");
        return (state, LobbyOutcome::Failed);
    }

    let promise = if let LobbyApproach::ConstituencyPromise(department) = approach {
        let id = next_promise_id(&state);
        let floor: Decimal = state.fiscal.department(department).total;
        state.legislature.promises.insert(
            id,
            Promise {
                id,
                category: PromiseCategory::ProtectDepartment { department, floor },
                targets: vec![member],
                turn_made: turn,
                broken: false,
                turn_broken: None,
            },
        );
        Some(id)
    } else {
        None
    };

    let stance = state.legislature.stances.entry(member).or_default();
    let (lo, hi) = StanceLabel::Support.band();
    stance.score = stance.score.clamp(lo, hi);
    stance.label = StanceLabel::Support;
    stance.override_label = Some(StanceLabel::Support);
    stance.override_turn = Some(turn);

    info!(%member, ?approach, chance, ?promise, "lobbying succeeded");
    (state, LobbyOutcome::Succeeded { promise })
}
