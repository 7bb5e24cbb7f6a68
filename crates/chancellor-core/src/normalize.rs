//! Save-data normalization.
//!
//! [`normalize`] turns any JSON value into a valid [`GameState`]. Each
//! top-level sub-tree is decoded independently: fresh defaults are laid
//! down first and the saved fields merged over them, so a field added in a
//! later release simply takes its default. A sub-tree that still fails to
//! decode is replaced by its defaults alone and reported as
//! [`CoreError::MalformedSaveData`]; the rest of the save survives.
//!
//! Migrations applied on the way in:
//!
//! - Department figures saved as a single number, or as an object holding
//!   only `spending`, are split into current and capital using each
//!   department's historical capital share. A legacy `fiscal.spending`
//!   container stands in for a missing `fiscal.departments`.
//! - Fixed-key containers (tax rates, departments, service quality) are
//!   merged per key, so a save missing one department still has all ten.
//! - A missing fiscal-year baseline is seeded from the loaded lines.
//!
//! Afterwards aggregates are recomputed, stance scores clamped and their
//! labels re-derived, the turn clamped into range and the schema version
//! stamped. Normalizing an already-normalized state changes nothing.

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use chancellor_ledger::recompute_aggregates;
use chancellor_types::codec::{decode_entries, encode_entries};
use chancellor_types::{
    BudgetChanges, Department, DepartmentBudget, FiscalState, GameState, MacroState,
    SCHEMA_VERSION, StanceLabel,
};

use crate::clock::CalendarMonth;
use crate::error::CoreError;
use crate::turn::snapshot_baseline;

/// Basis points in one whole.
const BASIS_POINTS: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Normalize a raw save into a valid game state.
pub fn normalize(raw: &Value) -> GameState {
    normalize_with_report(raw).0
}

/// Normalize a raw save, also returning every sub-tree that had to be
/// replaced by defaults.
pub fn normalize_with_report(raw: &Value) -> (GameState, Vec<CoreError>) {
    let mut report = Vec::new();
    let empty = Map::new();
    let root = match raw {
        Value::Object(fields) => fields,
        Value::Null => &empty,
        other => {
            report.push(malformed("root", format!("expected an object, found {other}")));
            &empty
        }
    };
    let defaults = GameState::default();

    let fiscal_saved = root.get("fiscal").map(migrate_fiscal);
    let economy_saved = root.get("economy").map(merge_economy_containers);

    let mut state = GameState {
        metadata: overlay("metadata", defaults.metadata, root.get("metadata"), &mut report),
        fiscal: overlay("fiscal", defaults.fiscal, fiscal_saved.as_ref(), &mut report),
        economy: overlay("economy", defaults.economy, economy_saved.as_ref(), &mut report),
        political: overlay("political", defaults.political, root.get("political"), &mut report),
        legislature: overlay(
            "legislature",
            defaults.legislature,
            root.get("legislature"),
            &mut report,
        ),
        manifesto: overlay("manifesto", defaults.manifesto, root.get("manifesto"), &mut report),
        risk_modifiers: overlay(
            "risk_modifiers",
            defaults.risk_modifiers,
            root.get("risk_modifiers"),
            &mut report,
        ),
        emergency_programmes: overlay(
            "emergency_programmes",
            defaults.emergency_programmes,
            root.get("emergency_programmes"),
            &mut report,
        ),
        events: overlay("events", defaults.events, root.get("events"), &mut report),
        pending_budgets: overlay(
            "pending_budgets",
            defaults.pending_budgets,
            root.get("pending_budgets"),
            &mut report,
        ),
        failed_budget: decode_failed_budget(root.get("failed_budget"), &mut report),
    };

    seed_baseline_if_absent(&mut state, fiscal_saved.as_ref());
    repair(&mut state);

    for error in &report {
        warn!(%error, "save data partially replaced by defaults");
    }
    (state, report)
}

fn malformed(subsystem: &'static str, reason: String) -> CoreError {
    CoreError::MalformedSaveData { subsystem, reason }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Merge `overlay` into `base`. Objects merge field by field; anything else
/// replaces the base value. `null` is treated as absent.
fn deep_merge(base: Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Object(mut base), Value::Object(fields)) => {
            for (key, value) in fields {
                let merged = base
                    .remove(key)
                    .map_or_else(|| value.clone(), |existing| deep_merge(existing, value));
                base.insert(key.clone(), merged);
            }
            Value::Object(base)
        }
        (_, other) => other.clone(),
    }
}

/// Decode one sub-tree with its saved fields over `default`.
fn overlay<T>(
    subsystem: &'static str,
    default: T,
    saved: Option<&Value>,
    report: &mut Vec<CoreError>,
) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(saved) = saved.filter(|v| !v.is_null()) else {
        return default;
    };
    let base = match serde_json::to_value(&default) {
        Ok(base) => base,
        Err(e) => {
            report.push(malformed(subsystem, e.to_string()));
            return default;
        }
    };
    match serde_json::from_value(deep_merge(base, saved)) {
        Ok(decoded) => decoded,
        Err(e) => {
            report.push(malformed(subsystem, e.to_string()));
            default
        }
    }
}

fn decode_failed_budget(
    saved: Option<&Value>,
    report: &mut Vec<CoreError>,
) -> Option<BudgetChanges> {
    let saved = saved.filter(|v| !v.is_null())?;
    match serde_json::from_value(saved.clone()) {
        Ok(changes) => Some(changes),
        Err(e) => {
            report.push(malformed("failed_budget", e.to_string()));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Containers and migrations
// ---------------------------------------------------------------------------

/// Merge a saved fixed-key container over the default one, key by key.
///
/// Returns `None` when the saved container is in no known encoding, in
/// which case the caller drops it and the default stands.
fn merge_fixed_keys(default: &Value, saved: &Value) -> Option<Value> {
    let saved_entries = decode_entries(saved).ok()?;
    let mut entries = decode_entries(default).unwrap_or_default();
    for (key, value) in saved_entries {
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }
    Some(encode_entries(entries))
}

/// Replace a fixed-key container field with its per-key merge against
/// `default`, or drop it if it cannot be decoded.
fn merge_field(fields: &mut Map<String, Value>, key: &str, default: &Value) {
    let Some(saved) = fields.remove(key) else {
        return;
    };
    if let Some(merged) = merge_fixed_keys(default, &saved) {
        fields.insert(key.to_owned(), merged);
    }
}

fn default_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn decimal_of(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

/// Split a legacy single spending figure into current and capital.
pub fn split_legacy_spending(department: Department, amount: Decimal) -> DepartmentBudget {
    let capital = amount
        .saturating_mul(Decimal::from(department.capital_share_bp()))
        .checked_div(BASIS_POINTS)
        .unwrap_or_default()
        .round_dp(6);
    DepartmentBudget::new(amount.saturating_sub(capital), capital)
}

/// Rewrite one saved department entry into the current shape.
fn migrate_department(key: &Value, value: Value) -> Value {
    let legacy_amount = match &value {
        Value::Object(fields)
            if !fields.contains_key("current") && !fields.contains_key("capital") =>
        {
            fields.get("spending").and_then(decimal_of)
        }
        Value::Number(_) | Value::String(_) => decimal_of(&value),
        _ => None,
    };
    let department = serde_json::from_value::<Department>(key.clone()).ok();
    match (department, legacy_amount) {
        (Some(department), Some(amount)) => {
            default_value(&split_legacy_spending(department, amount))
        }
        _ => value,
    }
}

fn migrate_fiscal(saved: &Value) -> Value {
    let Value::Object(fields) = saved else {
        return saved.clone();
    };
    let mut fields = fields.clone();
    let defaults = FiscalState::default();

    if let Some(legacy) = fields.remove("spending") {
        if !fields.contains_key("departments") {
            fields.insert("departments".to_owned(), legacy);
        }
    }
    if let Some(departments) = fields.remove("departments") {
        if let Ok(entries) = decode_entries(&departments) {
            let migrated = entries
                .into_iter()
                .map(|(k, v)| {
                    let v = migrate_department(&k, v);
                    (k, v)
                })
                .collect();
            fields.insert("departments".to_owned(), encode_entries(migrated));
        }
    }
    merge_field(&mut fields, "departments", &default_value(&defaults.departments));
    merge_field(&mut fields, "tax_rates", &default_value(&defaults.tax_rates));
    Value::Object(fields)
}

fn merge_economy_containers(saved: &Value) -> Value {
    let Value::Object(fields) = saved else {
        return saved.clone();
    };
    let mut fields = fields.clone();
    let defaults = MacroState::default();
    merge_field(&mut fields, "service_quality", &default_value(&defaults.service_quality));
    Value::Object(fields)
}

/// Whether the saved baseline carries a non-empty container under `key`.
fn baseline_has(fiscal_saved: Option<&Value>, key: &str) -> bool {
    fiscal_saved
        .and_then(|f| f.get("baseline"))
        .and_then(|b| b.get(key))
        .and_then(|c| decode_entries(c).ok())
        .is_some_and(|entries| !entries.is_empty())
}

fn seed_baseline_if_absent(state: &mut GameState, fiscal_saved: Option<&Value>) {
    if fiscal_saved.is_none() {
        return;
    }
    let fiscal_year = CalendarMonth::of(&state.metadata).fiscal_year();
    let snapshot = snapshot_baseline(&state.fiscal, fiscal_year);
    let baseline = &mut state.fiscal.baseline;
    if !baseline_has(fiscal_saved, "department_totals") {
        baseline.department_totals = snapshot.department_totals;
        baseline.fiscal_year = fiscal_year;
    }
    if !baseline_has(fiscal_saved, "tax_rates") {
        baseline.tax_rates = snapshot.tax_rates;
    }
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

fn repair(state: &mut GameState) {
    recompute_aggregates(&mut state.fiscal);

    let metadata = &mut state.metadata;
    metadata.schema_version = SCHEMA_VERSION;
    metadata.total_turns = metadata.total_turns.max(1);
    let last_turn = metadata.total_turns.saturating_sub(1);
    metadata.turn = metadata.turn.min(last_turn);
    metadata.month = metadata.month.clamp(1, 12);
    if metadata.turn >= last_turn {
        metadata.game_over = true;
    }

    for stance in state.legislature.stances.values_mut() {
        let score = if stance.score.is_finite() {
            stance.score.clamp(0.0, 100.0)
        } else {
            50.0
        };
        match stance.override_label {
            Some(label) => {
                let (lo, hi) = label.band();
                stance.score = score.clamp(lo, hi);
                stance.label = label;
            }
            None => {
                stance.score = score;
                stance.label = StanceLabel::from_score(score);
            }
        }
    }

    let whip = &mut state.legislature.whip_strength;
    if !whip.is_finite() {
        *whip = 0.7;
    }
    *whip = whip.clamp(0.0, 1.0);

    let events = &mut state.events;
    let highest = events
        .pending
        .iter()
        .map(|e| e.id)
        .chain(events.resolved.iter().map(|e| e.id))
        .max();
    if let Some(highest) = highest {
        if events.next_id <= highest {
            events.next_id = highest.next();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use chancellor_types::{LegislatorId, Stance, TaxLever};

    use super::*;

    #[test]
    fn null_and_empty_saves_give_the_default_state() {
        assert_eq!(normalize(&Value::Null), GameState::default());
        assert_eq!(normalize(&json!({})), GameState::default());
    }

    #[test]
    fn a_scalar_root_is_reported() {
        let (state, report) = normalize_with_report(&json!(17));
        assert_eq!(state, GameState::default());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn malformed_subtree_only_resets_itself() {
        let raw = json!({
            "metadata": {"turn": 12, "seed": 5},
            "political": {"credibility": "very high"},
        });
        let (state, report) = normalize_with_report(&raw);
        assert_eq!(state.metadata.turn, 12);
        assert_eq!(state.metadata.seed, 5);
        assert_eq!(state.political, GameState::default().political);
        assert!(matches!(
            report.as_slice(),
            [CoreError::MalformedSaveData { subsystem: "political", .. }]
        ));
    }

    #[test]
    fn legacy_single_figures_are_split() {
        let raw = json!({
            "fiscal": {
                "departments": {"defence": 60, "housing": {"spending": "20"}},
            }
        });
        let state = normalize(&raw);
        let defence = state.fiscal.department(Department::Defence);
        assert_eq!(defence.total, dec!(60));
        assert_eq!(defence, split_legacy_spending(Department::Defence, dec!(60)));
        assert!(defence.capital > Decimal::ZERO);
        let housing = state.fiscal.department(Department::Housing);
        assert_eq!(housing.total, dec!(20));
        // Unmentioned departments keep their defaults.
        assert_eq!(
            state.fiscal.department(Department::Health),
            GameState::default().fiscal.department(Department::Health)
        );
        assert_eq!(state.fiscal.departments.len(), Department::ALL.len());
    }

    #[test]
    fn legacy_spending_container_stands_in_for_departments() {
        let raw = json!({
            "fiscal": {"spending": [["welfare", 150]]}
        });
        let state = normalize(&raw);
        assert_eq!(state.fiscal.department(Department::Welfare).total, dec!(150));
    }

    #[test]
    fn missing_baseline_is_seeded_from_the_loaded_lines() {
        let raw = json!({
            "metadata": {"month": 2, "year": 2026},
            "fiscal": {"departments": {"justice": 40}},
        });
        let state = normalize(&raw);
        let baseline = &state.fiscal.baseline;
        assert_eq!(baseline.fiscal_year, 2025);
        assert_eq!(baseline.department_totals.get(&Department::Justice), Some(&dec!(40)));
        assert_eq!(baseline.tax_rates, state.fiscal.tax_rates);
    }

    #[test]
    fn native_map_tax_rates_merge_per_key() {
        let raw = json!({
            "fiscal": {
                "tax_rates": {"dataType": "Map", "value": [["vat", "17.5"]]}
            }
        });
        let state = normalize(&raw);
        assert_eq!(state.fiscal.rate(TaxLever::Vat), dec!(17.5));
        assert_eq!(state.fiscal.rate(TaxLever::IncomeTaxBasic), dec!(20));
        assert_eq!(state.fiscal.tax_rates.len(), TaxLever::ALL.len());
    }

    #[test]
    fn stale_aggregates_are_recomputed() {
        let raw = json!({
            "fiscal": {
                "departments": [["policing", {"current": "21", "capital": "2", "total": "99"}]],
                "total_spending": "1"
            }
        });
        let state = normalize(&raw);
        assert_eq!(state.fiscal.department(Department::Policing).total, dec!(23));
        let sum: Decimal = state.fiscal.departments.values().map(|b| b.total).sum();
        assert_eq!(state.fiscal.total_spending, sum);
    }

    #[test]
    fn stances_are_clamped_and_relabelled() {
        let raw = json!({
            "legislature": {
                "stances": {
                    "1": {"label": "oppose", "score": 140.0},
                    "2": {"label": "support", "score": 45.0, "override_label": "oppose"}
                }
            }
        });
        let state = normalize(&raw);
        let first: &Stance = &state.legislature.stances[&LegislatorId(1)];
        assert!((first.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(first.label, StanceLabel::Support);
        let second = &state.legislature.stances[&LegislatorId(2)];
        assert_eq!(second.label, StanceLabel::Oppose);
        assert!(second.score <= StanceLabel::OPPOSE_THRESHOLD);
    }

    #[test]
    fn turn_is_clamped_and_schema_stamped() {
        let raw = json!({
            "metadata": {"turn": 500, "total_turns": 60, "schema_version": 1, "month": 0}
        });
        let state = normalize(&raw);
        assert_eq!(state.metadata.turn, 59);
        assert!(state.metadata.game_over);
        assert_eq!(state.metadata.schema_version, SCHEMA_VERSION);
        assert_eq!(state.metadata.month, 1);
    }

    #[test]
    fn unparseable_container_becomes_empty() {
        let raw = json!({"legislature": {"promises": "garbage"}});
        let state = normalize(&raw);
        assert!(state.legislature.promises.is_empty());
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let raw = json!({
            "metadata": {"turn": 7, "month": 3},
            "fiscal": {"departments": {"defence": 60}},
            "legislature": {"stances": {"4": {"score": -3.0}}},
        });
        let once = normalize(&raw);
        let twice = normalize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }
}
