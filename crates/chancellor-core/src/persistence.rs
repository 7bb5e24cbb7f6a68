//! Save slots and roster storage over a key-value store.
//!
//! The host supplies the store; this module owns the serialization. A game
//! is written as two blobs so the large, rarely changing roster is not
//! rewritten into every save slot.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `save:slot:{n}` | JSON | [`SaveEnvelope`] with the roster and voting records stripped |
//! | `roster:{roster_id}` | JSON | [`RosterBlob`] with legislators and voting records |
//!
//! Writes are fire-and-forget. A failed write is logged and reported in the
//! [`SaveReport`]; it never interrupts play.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use chancellor_types::{GameState, Legislator, LegislatorId, RosterId, SCHEMA_VERSION, VoteRecord};

use crate::config::{GameConfig, PersistenceConfig};
use crate::error::CoreError;
use crate::game::ensure_roster;
use crate::normalize::normalize;

/// Errors raised by a [`KeyValueStore`] write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The write would take the store over its byte quota.
    #[error("quota exceeded writing {key}: {required} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Bytes the store would hold after the write.
        required: usize,
        /// Byte quota of the store.
        quota: usize,
    },

    /// The backend refused the write for another reason.
    #[error("store rejected {key}: {reason}")]
    Rejected {
        /// Key being written.
        key: String,
        /// Backend-specific reason.
        reason: String,
    },
}

/// String key-value storage supplied by the host.
pub trait KeyValueStore {
    /// Value at `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`] with an optional byte quota.
///
/// The quota counts key and value bytes across all entries, which is how
/// browser storage limits behave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    /// An empty store without a quota.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: None,
        }
    }

    /// An empty store that rejects writes beyond `quota_bytes`.
    pub const fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently held, keys included.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .fold(0_usize, |acc, (k, v)| acc.saturating_add(k.len()).saturating_add(v.len()))
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .entries
                .get(key)
                .map_or(0, |old| key.len().saturating_add(old.len()));
            let required = self
                .used_bytes()
                .saturating_sub(replaced)
                .saturating_add(key.len())
                .saturating_add(value.len());
            if required > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    required,
                    quota,
                });
            }
        }
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// A save slot as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    /// Schema version of `state`.
    pub schema_version: u32,
    /// When the save was taken.
    pub saved_at: DateTime<Utc>,
    /// Serialized game state, roster stripped.
    pub state: Value,
}

/// Legislators and their voting history, stored apart from the save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterBlob {
    /// Roster this blob belongs to.
    pub roster_id: RosterId,
    /// Every legislator.
    #[serde(with = "chancellor_types::codec::pair_seq")]
    pub roster: BTreeMap<LegislatorId, Legislator>,
    /// Votes keyed by turn.
    #[serde(with = "chancellor_types::codec::pair_seq")]
    pub voting_records: BTreeMap<u32, VoteRecord>,
}

/// What [`save_game`] managed to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Key of the save slot.
    pub slot_key: String,
    /// Whether the save slot was written.
    pub slot_written: bool,
    /// Key of the roster blob, when the game has a roster.
    pub roster_key: Option<String>,
    /// Whether the roster blob was written.
    pub roster_written: bool,
}

fn write_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), CoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, json)?;
    Ok(())
}

/// Write `state` to save slot `slot` and its roster to the roster key.
///
/// Failures are logged and reflected in the report, never returned.
pub fn save_game(
    store: &mut impl KeyValueStore,
    state: &GameState,
    config: &PersistenceConfig,
    slot: u32,
) -> SaveReport {
    let slot_key = config.slot_key(slot);
    let legislature = &state.legislature;

    let mut roster_key = None;
    let mut roster_written = false;
    match legislature.roster_id {
        Some(roster_id) if !legislature.roster.is_empty() => {
            let key = config.roster_key(roster_id);
            let blob = RosterBlob {
                roster_id,
                roster: legislature.roster.clone(),
                voting_records: legislature.voting_records.clone(),
            };
            match write_json(store, &key, &blob) {
                Ok(()) => roster_written = true,
                Err(error) => warn!(key = %key, %error, "failed to write roster"),
            }
            roster_key = Some(key);
        }
        _ => debug!("no roster to write; it will be regenerated on load"),
    }

    let mut slim = state.clone();
    slim.legislature.roster.clear();
    slim.legislature.voting_records.clear();
    let slot_written = serde_json::to_value(&slim)
        .map_err(CoreError::from)
        .and_then(|state| {
            let envelope = SaveEnvelope {
                schema_version: SCHEMA_VERSION,
                saved_at: Utc::now(),
                state,
            };
            write_json(store, &slot_key, &envelope)
        })
        .map_or_else(
            |error| {
                warn!(key = %slot_key, %error, "failed to write save slot");
                false
            },
            |()| true,
        );

    SaveReport {
        slot_key,
        slot_written,
        roster_key,
        roster_written,
    }
}

/// Read the roster blob for `roster_id`.
pub fn load_roster(
    store: &impl KeyValueStore,
    config: &PersistenceConfig,
    roster_id: RosterId,
) -> Result<RosterBlob, CoreError> {
    let key = config.roster_key(roster_id);
    let raw = store.get(&key).ok_or_else(|| CoreError::MissingRosterData {
        reason: format!("{key} is not in the store"),
    })?;
    let blob: RosterBlob = serde_json::from_str(&raw)?;
    if blob.roster_id != roster_id {
        return Err(CoreError::MissingRosterData {
            reason: format!("{key} holds roster {}", blob.roster_id),
        });
    }
    Ok(blob)
}

/// Unwrap the state from a save-slot value. Bare states written before the
/// envelope existed are accepted as they are.
fn state_of(value: Value) -> Value {
    match value {
        Value::Object(mut fields)
            if fields.contains_key("saved_at") && fields.contains_key("state") =>
        {
            fields.remove("state").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Load save slot `slot`.
///
/// The state is normalized and its roster reattached from the roster blob;
/// a missing or unreadable roster is regenerated from the seed. Returns
/// `None` when the slot is empty or is not JSON.
pub fn load_game(store: &impl KeyValueStore, config: &GameConfig, slot: u32) -> Option<GameState> {
    let key = config.persistence.slot_key(slot);
    let Some(raw) = store.get(&key) else {
        debug!(key = %key, "save slot is empty");
        return None;
    };
    let value = match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(e) => {
            let error = CoreError::MalformedSaveData {
                subsystem: "slot",
                reason: e.to_string(),
            };
            warn!(key = %key, %error, "save slot is not readable");
            return None;
        }
    };

    let mut state = normalize(&state_of(value));
    if let Some(roster_id) = state.legislature.roster_id {
        match load_roster(store, &config.persistence, roster_id) {
            Ok(blob) => {
                state.legislature.roster = blob.roster;
                state.legislature.voting_records = blob.voting_records;
            }
            Err(error) => warn!(%error, "roster unavailable; regenerating from seed"),
        }
    }
    Some(ensure_roster(state, &config.legislature.composition))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::game::default_state;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn slot_blob_carries_no_roster() {
        let mut store = InMemoryStore::new();
        let state = default_state();
        let report = save_game(&mut store, &state, &config().persistence, 0);
        assert!(report.slot_written);
        assert!(report.roster_written);

        let envelope: SaveEnvelope =
            serde_json::from_str(&store.get("save:slot:0").unwrap()).unwrap();
        assert_eq!(envelope.schema_version, SCHEMA_VERSION);
        let saved = normalize(&envelope.state);
        assert!(saved.legislature.roster.is_empty());
        assert_eq!(saved.legislature.roster_id, state.legislature.roster_id);
    }

    #[test]
    fn save_then_load_restores_the_game() {
        let mut store = InMemoryStore::new();
        let state = default_state();
        save_game(&mut store, &state, &config().persistence, 3);
        let loaded = load_game(&store, &config(), 3).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn empty_slot_loads_nothing() {
        assert!(load_game(&InMemoryStore::new(), &config(), 0).is_none());
    }

    #[test]
    fn garbage_slot_loads_nothing() {
        let mut store = InMemoryStore::new();
        store.set("save:slot:0", "{not json".to_owned()).unwrap();
        assert!(load_game(&store, &config(), 0).is_none());
    }

    #[test]
    fn quota_failure_is_reported_not_raised() {
        let mut store = InMemoryStore::with_quota(64);
        let report = save_game(&mut store, &default_state(), &config().persistence, 0);
        assert!(!report.slot_written);
        assert!(!report.roster_written);
        assert!(store.is_empty());
    }

    #[test]
    fn quota_counts_replaced_values_once() {
        let mut store = InMemoryStore::with_quota(10);
        store.set("k", "12345".to_owned()).unwrap();
        store.set("k", "123456789".to_owned()).unwrap();
        assert_eq!(store.used_bytes(), 10);
        assert!(matches!(
            store.set("j", "1".to_owned()),
            Err(StoreError::QuotaExceeded { required: 12, .. })
        ));
    }

    #[test]
    fn missing_roster_is_regenerated_from_the_seed() {
        let mut store = InMemoryStore::new();
        let state = default_state();
        let config = config();
        let mut slim = state.clone();
        slim.legislature.roster.clear();
        let envelope = SaveEnvelope {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            state: serde_json::to_value(&slim).unwrap(),
        };
        store
            .set("save:slot:0", serde_json::to_string(&envelope).unwrap())
            .unwrap();

        let loaded = load_game(&store, &config, 0).unwrap();
        assert_eq!(loaded.legislature.roster, state.legislature.roster);
    }

    #[test]
    fn mismatched_roster_blob_is_rejected() {
        let mut store = InMemoryStore::new();
        let state = default_state();
        let config = config().persistence;
        save_game(&mut store, &state, &config, 0);
        let other = RosterId::new();
        let moved = store.get(&config.roster_key(state.legislature.roster_id.unwrap())).unwrap();
        store.set(&config.roster_key(other), moved).unwrap();
        assert!(matches!(
            load_roster(&store, &config, other),
            Err(CoreError::MissingRosterData { .. })
        ));
    }

    #[test]
    fn bare_legacy_state_is_accepted() {
        let mut store = InMemoryStore::new();
        store
            .set("save:slot:1", r#"{"metadata": {"turn": 4}}"#.to_owned())
            .unwrap();
        let loaded = load_game(&store, &config(), 1).unwrap();
        assert_eq!(loaded.metadata.turn, 4);
        assert_eq!(loaded.legislature.roster.len(), 650);
    }
}
