//! Scheduled events and player responses.
//!
//! Each turn [`raise_events`] walks a fixed catalogue. A template fires
//! when its condition holds on the current state and a roll fixed by
//! `(seed, turn, template)` falls under its monthly chance:
//!
//! | Template | Kind | Condition | Chance |
//! |----------|------|-----------|--------|
//! | `gilt_wobble` | crisis | headroom below zero or credibility under 50 | 25% |
//! | `pm_defence_demand` | PM demand | executive trust under 75 | 6% |
//! | `flood_emergency` | crisis | October to February | 8% |
//! | `public_sector_strike` | crisis | mean service quality under 50 | 20% |
//!
//! At most one instance of a template is pending at a time. Events are only
//! raised in [`GameMode::Standard`].
//!
//! [`respond_to_event`] resolves a pending event with one of its responses
//! and applies the response's effects.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use chancellor_ledger::{FiscalProjection, adjust_department, check_state, headroom};
use chancellor_politics::{evaluate_promises, stable_unit};
use chancellor_types::{
    Department, EmergencyProgramme, EventEffect, EventId, EventKind, EventResponse, GameMode,
    GameState, PendingEvent, PolicyRiskModifier, ProgrammeId, ResolvedEvent, RiskKind,
    SpendingComponent,
};

use crate::error::CoreError;

/// A catalogue entry.
struct EventTemplate {
    key: &'static str,
    salt: u32,
    kind: EventKind,
    title: &'static str,
    chance: f64,
    condition: fn(&GameState) -> bool,
    responses: fn() -> Vec<EventResponse>,
}

fn response(label: &str, effects: Vec<EventEffect>) -> EventResponse {
    EventResponse {
        label: label.to_owned(),
        effects,
    }
}

fn gilt_wobble_due(state: &GameState) -> bool {
    let projection = FiscalProjection::project(&state.fiscal, &state.economy);
    headroom(state.metadata.fiscal_rule, &projection).scalar < 0.0
        || state.political.credibility < 50.0
}

fn gilt_wobble_responses() -> Vec<EventResponse> {
    vec![
        response(
            "Make a statement reaffirming the fiscal rules",
            vec![EventEffect::Credibility(3.0), EventEffect::ExecutiveTrust(-2.0)],
        ),
        response(
            "Announce an efficiency review of local government",
            vec![
                EventEffect::Spending {
                    department: Department::LocalGovernment,
                    component: SpendingComponent::Current,
                    delta: Decimal::new(-2, 0),
                },
                EventEffect::Credibility(5.0),
                EventEffect::BackbenchSatisfaction(-4.0),
            ],
        ),
        response(
            "Say nothing",
            vec![
                EventEffect::Risk {
                    kind: RiskKind::MarketJitters,
                    magnitude: 0.5,
                    turns: 4,
                },
                EventEffect::Credibility(-4.0),
            ],
        ),
    ]
}

fn pm_defence_due(state: &GameState) -> bool {
    state.political.executive_trust < 75.0
}

fn pm_defence_responses() -> Vec<EventResponse> {
    vec![
        response(
            "Fund the full uplift",
            vec![
                EventEffect::Spending {
                    department: Department::Defence,
                    component: SpendingComponent::Capital,
                    delta: Decimal::new(3, 0),
                },
                EventEffect::ExecutiveTrust(8.0),
            ],
        ),
        response(
            "Offer a smaller increase",
            vec![
                EventEffect::Spending {
                    department: Department::Defence,
                    component: SpendingComponent::Capital,
                    delta: Decimal::new(15, 1),
                },
                EventEffect::ExecutiveTrust(2.0),
            ],
        ),
        response(
            "Refuse",
            vec![
                EventEffect::ExecutiveTrust(-12.0),
                EventEffect::Risk {
                    kind: RiskKind::PolicyUncertainty,
                    magnitude: 0.2,
                    turns: 3,
                },
            ],
        ),
    ]
}

fn flood_due(state: &GameState) -> bool {
    matches!(state.metadata.month, 10..=12 | 1 | 2)
}

fn flood_responses() -> Vec<EventResponse> {
    vec![
        response(
            "Launch an emergency relief programme",
            vec![
                EventEffect::Programme {
                    name: "Flood relief".to_owned(),
                    department: Department::LocalGovernment,
                    annual_cost: Decimal::new(4, 0),
                    turns: 6,
                },
                EventEffect::PublicApproval(4.0),
            ],
        ),
        response(
            "Leave recovery to local councils",
            vec![
                EventEffect::PublicApproval(-6.0),
                EventEffect::BackbenchSatisfaction(-3.0),
            ],
        ),
    ]
}

fn strike_due(state: &GameState) -> bool {
    let quality = &state.economy.service_quality;
    if quality.is_empty() {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = quality.values().sum::<f64>() / quality.len() as f64;
    mean < 50.0
}

fn strike_responses() -> Vec<EventResponse> {
    vec![
        response(
            "Settle the pay claim",
            vec![
                EventEffect::Spending {
                    department: Department::Health,
                    component: SpendingComponent::Current,
                    delta: Decimal::new(3, 0),
                },
                EventEffect::BackbenchSatisfaction(3.0),
                EventEffect::Credibility(-2.0),
            ],
        ),
        response(
            "Hold the line",
            vec![
                EventEffect::Risk {
                    kind: RiskKind::IndustrialAction,
                    magnitude: 0.4,
                    turns: 3,
                },
                EventEffect::PublicApproval(-4.0),
            ],
        ),
    ]
}

static CATALOGUE: [EventTemplate; 4] = [
    EventTemplate {
        key: "gilt_wobble",
        salt: 0x6769_6c74,
        kind: EventKind::Crisis,
        title: "Gilt yields jump after a weak auction",
        chance: 0.25,
        condition: gilt_wobble_due,
        responses: gilt_wobble_responses,
    },
    EventTemplate {
        key: "pm_defence_demand",
        salt: 0x6465_6665,
        kind: EventKind::PmDemand,
        title: "The Prime Minister wants more for defence",
        chance: 0.06,
        condition: pm_defence_due,
        responses: pm_defence_responses,
    },
    EventTemplate {
        key: "flood_emergency",
        salt: 0x666c_6f6f,
        kind: EventKind::Crisis,
        title: "Severe flooding across the north",
        chance: 0.08,
        condition: flood_due,
        responses: flood_responses,
    },
    EventTemplate {
        key: "public_sector_strike",
        salt: 0x7374_726b,
        kind: EventKind::Crisis,
        title: "Nurses and teachers vote to strike",
        chance: 0.20,
        condition: strike_due,
        responses: strike_responses,
    },
];

/// Keys of every event template.
pub fn catalogue_keys() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|t| t.key)
}

fn template(key: &str) -> Option<&'static EventTemplate> {
    CATALOGUE.iter().find(|t| t.key == key)
}

fn is_pending(state: &GameState, key: &str) -> bool {
    state.events.pending.iter().any(|e| e.template == key)
}

fn push_event(state: &mut GameState, template: &EventTemplate) {
    let id = state.events.next_id;
    state.events.next_id = id.next();
    state.events.pending.push(PendingEvent {
        id,
        template: template.key.to_owned(),
        kind: template.kind,
        title: template.title.to_owned(),
        raised_turn: state.metadata.turn,
        responses: (template.responses)(),
    });
    info!(%id, template = template.key, turn = state.metadata.turn, "event raised");
}

/// Raise every catalogue event whose condition and roll come up this turn.
pub fn raise_events(mut state: GameState) -> GameState {
    if state.metadata.mode != GameMode::Standard {
        return state;
    }
    let seed = state.metadata.seed;
    let turn = state.metadata.turn;
    for template in &CATALOGUE {
        if is_pending(&state, template.key) || !(template.condition)(&state) {
            continue;
        }
        if stable_unit(seed, template.salt, turn) < template.chance {
            push_event(&mut state, template);
        }
    }
    state
}

/// Raise the event `key` unconditionally.
///
/// Unknown keys and templates already pending leave the state unchanged.
pub fn raise_event(mut state: GameState, key: &str) -> GameState {
    let Some(template) = template(key) else {
        debug!(key, "ignoring unknown event template");
        return state;
    };
    if is_pending(&state, key) {
        debug!(key, "event already pending");
        return state;
    }
    push_event(&mut state, template);
    state
}

fn shift(value: &mut f64, delta: f64) {
    *value = (*value + delta).clamp(0.0, 100.0);
}

fn next_programme_id(state: &GameState) -> ProgrammeId {
    state
        .emergency_programmes
        .iter()
        .map(|p| p.id)
        .max()
        .map_or(ProgrammeId(1), ProgrammeId::next)
}

fn apply_effect(state: &mut GameState, effect: EventEffect) -> Result<(), CoreError> {
    let political = &mut state.political;
    match effect {
        EventEffect::Credibility(delta) => shift(&mut political.credibility, delta),
        EventEffect::ExecutiveTrust(delta) => shift(&mut political.executive_trust, delta),
        EventEffect::BackbenchSatisfaction(delta) => {
            shift(&mut political.backbench_satisfaction, delta);
        }
        EventEffect::PublicApproval(delta) => shift(&mut political.public_approval, delta),
        EventEffect::Risk {
            kind,
            magnitude,
            turns,
        } => state.risk_modifiers.push(PolicyRiskModifier {
            kind,
            magnitude,
            remaining_turns: turns,
        }),
        EventEffect::Programme {
            name,
            department,
            annual_cost,
            turns,
        } => {
            adjust_department(
                &mut state.fiscal,
                department,
                SpendingComponent::Current,
                annual_cost,
            )?;
            let id = next_programme_id(state);
            state.emergency_programmes.push(EmergencyProgramme {
                id,
                name,
                department,
                annual_cost,
                remaining_turns: turns,
            });
        }
        EventEffect::Spending {
            department,
            component,
            delta,
        } => adjust_department(&mut state.fiscal, department, component, delta)?,
    }
    Ok(())
}

/// Resolve pending event `event_id` with response `response_index`.
///
/// An unknown event or response leaves the state unchanged.
pub fn respond_to_event(mut state: GameState, event_id: EventId, response_index: usize) -> GameState {
    let Some(position) = state.events.pending.iter().position(|e| e.id == event_id) else {
        let error = CoreError::InvalidTransition {
            reason: format!("no pending event {event_id}"),
        };
        debug!(%error, "event response ignored");
        return state;
    };
    let valid = state
        .events
        .pending
        .get(position)
        .is_some_and(|e| response_index < e.responses.len());
    let index = u32::try_from(response_index).ok().filter(|_| valid);
    let Some(index) = index else {
        let error = CoreError::InvalidTransition {
            reason: format!("event {event_id} has no response {response_index}"),
        };
        debug!(%error, "event response ignored");
        return state;
    };

    let event = state.events.pending.remove(position);
    let turn = state.metadata.turn;
    let effects = event
        .responses
        .into_iter()
        .nth(response_index)
        .map(|r| r.effects)
        .unwrap_or_default();
    for effect in effects {
        if let Err(error) = apply_effect(&mut state, effect) {
            warn!(%error, id = %event_id, "event effect skipped");
        }
    }
    state.events.resolved.push(ResolvedEvent {
        id: event.id,
        template: event.template,
        response_index: index,
        resolved_turn: turn,
    });

    state.manifesto.last_check = check_state(&state);
    let state = evaluate_promises(state);
    info!(id = %event_id, response = response_index, turn, "event resolved");
    state
}

/// Count down risks and programmes, removing the ones that end.
///
/// An ending programme takes its cost back out of its department.
pub fn expire_temporaries(mut state: GameState) -> GameState {
    for risk in &mut state.risk_modifiers {
        risk.remaining_turns = risk.remaining_turns.saturating_sub(1);
    }
    state.risk_modifiers.retain(|r| r.remaining_turns > 0);

    let mut ended = Vec::new();
    for programme in &mut state.emergency_programmes {
        programme.remaining_turns = programme.remaining_turns.saturating_sub(1);
        if programme.remaining_turns == 0 {
            ended.push((programme.department, programme.annual_cost, programme.id));
        }
    }
    state.emergency_programmes.retain(|p| p.remaining_turns > 0);
    for (department, cost, id) in ended {
        let available = state.fiscal.department(department).current;
        let removed = cost.min(available);
        if removed < cost {
            warn!(
                %id,
                %department,
                %cost,
                shortfall = %cost.saturating_sub(removed),
                "emergency programme outlasted its department's current spending"
            );
        }
        let refund = Decimal::ZERO.saturating_sub(removed);
        match adjust_department(&mut state.fiscal, department, SpendingComponent::Current, refund) {
            Ok(()) => debug!(%id, %department, %removed, "emergency programme ended"),
            Err(error) => warn!(%error, %id, "could not unwind emergency programme"),
        }
    }
    state
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn with_event(key: &str) -> (GameState, EventId) {
        let state = raise_event(GameState::default(), key);
        let id = state.events.pending[0].id;
        (state, id)
    }

    #[test]
    fn catalogue_has_the_four_templates() {
        let keys: Vec<_> = catalogue_keys().collect();
        assert_eq!(
            keys,
            ["gilt_wobble", "pm_defence_demand", "flood_emergency", "public_sector_strike"]
        );
    }

    #[test]
    fn a_template_is_pending_at_most_once() {
        let (state, _) = with_event("flood_emergency");
        let state = raise_event(state, "flood_emergency");
        assert_eq!(state.events.pending.len(), 1);
        let state = raise_event(state, "meteor_strike");
        assert_eq!(state.events.pending.len(), 1);
    }

    #[test]
    fn raising_is_deterministic_and_skips_sandbox() {
        let mut state = GameState::default();
        state.political.credibility = 20.0;
        state.political.executive_trust = 10.0;
        let mut raised_any = false;
        for turn in 0..40 {
            state.metadata.turn = turn;
            let a = raise_events(state.clone());
            let b = raise_events(state.clone());
            assert_eq!(a.events, b.events);
            raised_any |= !a.events.pending.is_empty();
        }
        assert!(raised_any);

        state.metadata.mode = GameMode::Sandbox;
        for turn in 0..40 {
            state.metadata.turn = turn;
            assert!(raise_events(state.clone()).events.pending.is_empty());
        }
    }

    #[test]
    fn unknown_event_or_response_changes_nothing() {
        let (state, id) = with_event("gilt_wobble");
        assert_eq!(respond_to_event(state.clone(), id.next(), 0), state);
        assert_eq!(respond_to_event(state.clone(), id, 9), state);
    }

    #[test]
    fn response_effects_are_applied_and_clamped() {
        let (mut state, id) = with_event("pm_defence_demand");
        state.political.executive_trust = 97.0;
        let before = state.fiscal.department(Department::Defence).capital;
        let state = respond_to_event(state, id, 0);
        assert!((state.political.executive_trust - 100.0).abs() < f64::EPSILON);
        assert_eq!(state.fiscal.department(Department::Defence).capital, before + dec!(3));
        assert!(state.events.pending.is_empty());
        assert_eq!(state.events.resolved[0].response_index, 0);
    }

    #[test]
    fn programme_cost_comes_and_goes() {
        let (state, id) = with_event("flood_emergency");
        let before = state.fiscal.department(Department::LocalGovernment).current;
        let mut state = respond_to_event(state, id, 0);
        assert_eq!(
            state.fiscal.department(Department::LocalGovernment).current,
            before + dec!(4)
        );
        assert_eq!(state.emergency_programmes.len(), 1);
        for _ in 0..6 {
            state = expire_temporaries(state);
        }
        assert!(state.emergency_programmes.is_empty());
        assert_eq!(state.fiscal.department(Department::LocalGovernment).current, before);
    }

    #[test]
    fn unwinding_a_programme_stops_at_what_is_left() {
        let (state, id) = with_event("flood_emergency");
        let mut state = respond_to_event(state, id, 0);
        let capital = state.fiscal.department(Department::LocalGovernment).capital;
        adjust_department(
            &mut state.fiscal,
            Department::LocalGovernment,
            SpendingComponent::Current,
            dec!(-34),
        )
        .unwrap();
        assert_eq!(
            state.fiscal.department(Department::LocalGovernment).current,
            dec!(5)
        );
        for _ in 0..6 {
            state = expire_temporaries(state);
        }
        assert!(state.emergency_programmes.is_empty());
        let after = state.fiscal.department(Department::LocalGovernment);
        assert_eq!(after.current, dec!(1));
        assert_eq!(after.capital, capital);
        assert_eq!(after.total, after.current + after.capital);
    }

    #[test]
    fn programme_larger_than_the_line_clears_it() {
        let (state, id) = with_event("flood_emergency");
        let mut state = respond_to_event(state, id, 0);
        state
            .fiscal
            .departments
            .get_mut(&Department::LocalGovernment)
            .unwrap()
            .current = dec!(1.5);
        chancellor_ledger::recompute_aggregates(&mut state.fiscal);
        for _ in 0..6 {
            state = expire_temporaries(state);
        }
        let after = state.fiscal.department(Department::LocalGovernment);
        assert_eq!(after.current, Decimal::ZERO);
        assert_eq!(
            chancellor_ledger::verify_ledger(&state.fiscal),
            chancellor_ledger::LedgerCheck::Consistent
        );
    }

    #[test]
    fn risks_count_down_and_expire() {
        let (state, id) = with_event("public_sector_strike");
        let mut state = respond_to_event(state, id, 1);
        assert_eq!(state.risk_modifiers.len(), 1);
        state = expire_temporaries(state);
        state = expire_temporaries(state);
        assert_eq!(state.risk_modifiers[0].remaining_turns, 1);
        state = expire_temporaries(state);
        assert!(state.risk_modifiers.is_empty());
    }
}
