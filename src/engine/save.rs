//! Save/load for the engine state.
//!
//! ## Versioning policy
//!
//! - `SAVE_VERSION`: current format version. Bump when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest version that can still be merged.
//!   Only bump for breaking changes (a field changes meaning or is removed).
//!   Additive changes keep old saves loadable.
//!
//! Records without a `version` field are treated as version 1.
//!
//! ## Merge rule
//!
//! Loading always starts from canonical defaults. Every scalar present in
//! the record is overlaid; producers and upgrades are matched by id, so
//! unknown ids are dropped and missing ids keep their defaults. Catalog
//! constants (names, costs, rates) are never persisted. After the merge
//! every field is clamped back into its declared range.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::combo::Combo;
use super::state::EngineState;
use crate::time::Millis;

/// Current save format version.
const SAVE_VERSION: u32 = 1;

/// Oldest version that can be merged onto defaults.
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Key of the save blob in the store.
pub const STORAGE_KEY: &str = "tap_to_empire_save";

/// Autosave interval in ticks. 20 ticks/sec × 10 sec.
pub const AUTOSAVE_INTERVAL: u32 = 200;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize save: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("corrupt save data: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("save version {found} is older than the minimum supported {min}")]
    Incompatible { found: u32, min: u32 },
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Key-value blob storage the save lives in.
pub trait BlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// In-process store. Used in tests and on targets without `localStorage`.
#[derive(Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl BlobStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        self.storage
            .get_item(key)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        self.storage
            .set_item(key, blob)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.storage
            .remove_item(key)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }
}

/// The store the driver should use on this target.
pub fn default_store() -> Box<dyn BlobStore> {
    #[cfg(target_arch = "wasm32")]
    if let Some(storage) = LocalStorage::open() {
        return Box::new(storage);
    }
    Box::new(MemoryStore::new())
}

#[cfg(target_arch = "wasm32")]
fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

#[cfg(target_arch = "wasm32")]
fn console_warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn console_log(_msg: &str) {}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(_msg: &str) {}

fn legacy_version() -> u32 {
    1
}

/// Serialized form. Every field is optional so partial records merge.
#[derive(Serialize, Deserialize, Default, Debug)]
#[serde(default)]
struct SaveData {
    #[serde(default = "legacy_version")]
    version: u32,
    currency: Option<f64>,
    tap_base: Option<f64>,
    crit_chance: Option<f64>,
    crit_multiplier: Option<f64>,
    combo: Option<f64>,
    combo_decay_ms: Option<u64>,
    last_action_ms: Option<Millis>,
    prestige_points: Option<u64>,
    boost_expiry_ms: Option<Millis>,
    last_save_ms: Option<Millis>,
    producers: Vec<ProducerSave>,
    tap_upgrades: Vec<UpgradeSave>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ProducerSave {
    id: String,
    #[serde(default)]
    quantity: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
struct UpgradeSave {
    id: String,
    #[serde(default)]
    level: Option<u32>,
}

/// Capture the state into its serialized form.
fn extract_save(state: &EngineState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        currency: Some(state.currency),
        tap_base: Some(state.tap_base),
        crit_chance: Some(state.crit_chance),
        crit_multiplier: Some(state.crit_multiplier),
        combo: Some(state.combo.value()),
        combo_decay_ms: Some(state.combo.decay_threshold_ms),
        last_action_ms: Some(state.combo.last_action),
        prestige_points: Some(state.prestige_points),
        boost_expiry_ms: Some(state.boost_expiry),
        last_save_ms: Some(state.last_save),
        producers: state
            .producers
            .iter()
            .map(|p| ProducerSave {
                id: p.id.to_string(),
                quantity: Some(p.quantity),
            })
            .collect(),
        tap_upgrades: state
            .tap_upgrades
            .iter()
            .map(|u| UpgradeSave {
                id: u.id.to_string(),
                level: Some(u.level),
            })
            .collect(),
    }
}

/// Overlay a record onto canonical defaults, then clamp.
fn merge_onto_defaults(save: &SaveData, now: Millis) -> EngineState {
    let mut state = EngineState::new(now);

    if let Some(v) = save.currency {
        state.currency = v;
    }
    if let Some(v) = save.tap_base {
        state.tap_base = v;
    }
    if let Some(v) = save.crit_chance {
        state.crit_chance = v;
    }
    if let Some(v) = save.crit_multiplier {
        state.crit_multiplier = v;
    }
    if let Some(v) = save.prestige_points {
        state.prestige_points = v;
    }
    if let Some(v) = save.boost_expiry_ms {
        state.boost_expiry = v;
    }
    if let Some(v) = save.last_save_ms {
        state.last_save = v;
    }
    state.combo = Combo::restore(
        save.combo.unwrap_or(state.combo.value()),
        save.last_action_ms.unwrap_or(state.combo.last_action),
        save.combo_decay_ms.unwrap_or(state.combo.decay_threshold_ms),
    );

    for p in &mut state.producers {
        let found = save.producers.iter().find(|s| s.id == p.id);
        if let Some(quantity) = found.and_then(|s| s.quantity) {
            p.quantity = quantity;
        }
    }
    for u in &mut state.tap_upgrades {
        let found = save.tap_upgrades.iter().find(|s| s.id == u.id);
        if let Some(level) = found.and_then(|s| s.level) {
            u.level = level;
        }
    }

    state.clamp_to_invariants();
    state
}

/// Serialize the state to a JSON blob.
pub fn encode(state: &EngineState) -> Result<String, SaveError> {
    serde_json::to_string(&extract_save(state)).map_err(SaveError::Serialize)
}

/// Parse a JSON blob and merge it onto defaults.
pub fn decode(json: &str, now: Millis) -> Result<EngineState, SaveError> {
    let save: SaveData = serde_json::from_str(json).map_err(SaveError::Parse)?;
    if save.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            found: save.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if save.version < SAVE_VERSION {
        console_log(&format!(
            "Tap to Empire: migrating save (saved={}, current={})",
            save.version, SAVE_VERSION
        ));
    }
    Ok(merge_onto_defaults(&save, now))
}

/// Stamp the save watermark and write a snapshot to the store.
///
/// The snapshot is encoded from one borrow of the state, so it is
/// consistent even if the write itself is slow.
pub fn save_game(
    state: &mut EngineState,
    store: &mut dyn BlobStore,
    now: Millis,
) -> Result<(), SaveError> {
    state.last_save = now;
    let json = encode(state)?;
    store.write(STORAGE_KEY, &json)
}

/// Load the saved state, or canonical defaults when there is none.
///
/// Corrupt or incompatible saves are discarded with a console warning;
/// loading never fails.
pub fn load_game(store: &mut dyn BlobStore, now: Millis) -> EngineState {
    let json = match store.read(STORAGE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return EngineState::new(now),
        Err(e) => {
            console_warn(&format!("Tap to Empire: cannot read save: {e}"));
            return EngineState::new(now);
        }
    };

    match decode(&json, now) {
        Ok(state) => state,
        Err(e) => {
            console_warn(&format!("Tap to Empire: discarding save: {e}"));
            if let Err(e) = store.remove(STORAGE_KEY) {
                console_warn(&format!("Tap to Empire: cannot remove save: {e}"));
            }
            EngineState::new(now)
        }
    }
}

/// Remove the save blob.
pub fn delete_save(store: &mut dyn BlobStore) -> Result<(), SaveError> {
    store.remove(STORAGE_KEY)
}
