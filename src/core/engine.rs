//! The assessment engine: both stores, rehydration, and persistence commits
//!
//! One engine instance owns the defaults store, the assessment store, and
//! the storage medium. It is constructed once at startup and handed to
//! consumers by reference; there are no module-level singletons. Every
//! public mutation ends in a commit step that re-serializes and writes the
//! whole affected store.
//!
//! No operation here returns an error. Missing inputs surface as
//! `valid: false` results, rejected imports as `false`, and storage write
//! failures are swallowed: the in-memory state stays authoritative for the
//! rest of the session.

use crate::core::assessment::{resolve_key, AssessmentRecord, AssessmentStore};
use crate::core::combine::UncertaintyResult;
use crate::core::defaults::{DefaultsRecord, DefaultsStore};
use crate::core::params::ParameterSet;
use crate::storage::{StorageMedium, DEFAULTS_KEY, LEGACY_STATE_KEY, STATE_MAP_KEY};

pub struct UncertaintyEngine<S: StorageMedium> {
    storage: S,
    defaults: DefaultsStore,
    assessments: AssessmentStore,
}

impl<S: StorageMedium> UncertaintyEngine<S> {
    /// Rehydrate both stores from the medium
    ///
    /// Load order matters: defaults first (new records seed from them),
    /// then the assessment map, then the read-once legacy single-record
    /// blob, merged under the fallback key only when the map has nothing
    /// there. Unparseable blobs are discarded in favor of factory state.
    pub fn load(storage: S) -> Self {
        let defaults = storage
            .read(DEFAULTS_KEY)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .map(|value| DefaultsStore::rehydrate(&value))
            .unwrap_or_default();

        let mut assessments = storage
            .read(STATE_MAP_KEY)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .map(|value| AssessmentStore::rehydrate(&value))
            .unwrap_or_default();

        if let Some(raw) = storage.read(LEGACY_STATE_KEY) {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
                // Same guard the original reader applied: a legacy blob
                // without params is not worth adopting.
                if value.get("params").is_some() {
                    assessments.adopt_legacy(AssessmentRecord::normalize(&value));
                }
            }
        }

        Self {
            storage,
            defaults,
            assessments,
        }
    }

    // ----- assessment operations -----

    /// Create the record for `key` if needed, seeded from the current
    /// defaults. Idempotent.
    pub fn ensure(&mut self, key: &str) {
        if self.assessments.ensure(key, self.defaults.params()) {
            self.commit_assessments();
        }
    }

    /// The record for `key`, creating it on first access; `None` resolves
    /// to the well-known fallback key
    pub fn get_active(&mut self, key: Option<&str>) -> &AssessmentRecord {
        let key = resolve_key(key);
        self.ensure(key);
        self.active(key)
    }

    /// Apply a pure transformation to the active record's parameters
    ///
    /// A previously committed record goes stale. Returns the combination
    /// of the new parameters as a preview; the committed results stay in
    /// place until the next save.
    pub fn update_params<F>(&mut self, key: Option<&str>, update: F) -> UncertaintyResult
    where
        F: FnOnce(ParameterSet) -> ParameterSet,
    {
        let key = resolve_key(key);
        self.assessments.ensure(key, self.defaults.params());
        let preview = self.assessments.update_params(key, update);
        self.commit_assessments();
        preview
    }

    /// Commit the active record's current parameters
    pub fn save(&mut self, key: Option<&str>) -> &AssessmentRecord {
        let key = resolve_key(key);
        self.assessments.ensure(key, self.defaults.params());
        self.assessments.save(key);
        self.commit_assessments();
        self.active(key)
    }

    /// Replace the active record's parameters with the factory baseline
    /// (not the user-editable defaults record)
    pub fn reset_to_defaults(&mut self, key: Option<&str>) -> &AssessmentRecord {
        let key = resolve_key(key);
        self.assessments.ensure(key, self.defaults.params());
        self.assessments.reset(key);
        self.commit_assessments();
        self.active(key)
    }

    /// Demote a committed record to stale without editing its parameters
    pub fn mark_stale(&mut self, key: Option<&str>) -> bool {
        let key = resolve_key(key);
        self.assessments.ensure(key, self.defaults.params());
        let changed = self.assessments.mark_stale(key);
        if changed {
            self.commit_assessments();
        }
        changed
    }

    /// Copy the current defaults into the active record, with the same
    /// stale-demotion rule as a parameter edit
    pub fn load_defaults_into(&mut self, key: Option<&str>) -> UncertaintyResult {
        let seed = self.defaults.params().clone();
        self.update_params(key, move |_| seed)
    }

    /// Iterate all assessment records in key order
    pub fn assessments(&self) -> impl Iterator<Item = (&str, &AssessmentRecord)> {
        self.assessments.iter()
    }

    pub fn assessment_count(&self) -> usize {
        self.assessments.len()
    }

    // ----- defaults operations -----

    pub fn defaults_record(&self) -> &DefaultsRecord {
        self.defaults.record()
    }

    /// Draft edit of the defaults; nothing is persisted until
    /// [`UncertaintyEngine::save_defaults`]
    pub fn update_defaults<F>(&mut self, update: F)
    where
        F: FnOnce(ParameterSet) -> ParameterSet,
    {
        self.defaults.update(update);
    }

    /// Commit and persist the defaults draft
    pub fn save_defaults(&mut self) -> &DefaultsRecord {
        self.defaults.save();
        self.commit_defaults();
        self.defaults.record()
    }

    /// Restore factory defaults; reset is itself a committed action
    pub fn reset_defaults(&mut self) {
        self.defaults.reset();
        self.commit_defaults();
    }

    /// Serialized snapshot of the committed defaults for file exchange
    pub fn export_defaults(&self) -> String {
        self.defaults.export()
    }

    /// Replace the defaults from an exported snapshot; `false` leaves the
    /// store unchanged and nothing persisted
    pub fn import_defaults(&mut self, doc: &str) -> bool {
        if !self.defaults.import(doc) {
            return false;
        }
        self.commit_defaults();
        true
    }

    // ----- persistence commits -----

    fn active(&self, key: &str) -> &AssessmentRecord {
        self.assessments
            .record(key)
            .expect("assessment record exists after ensure")
    }

    fn commit_assessments(&mut self) {
        if let Some(blob) = self.assessments.snapshot() {
            // Best-effort: a rejected write leaves the in-memory store
            // authoritative for the session.
            let _ = self.storage.write(STATE_MAP_KEY, &blob);
        }
    }

    fn commit_defaults(&mut self) {
        if let Some(blob) = self.defaults.snapshot() {
            let _ = self.storage.write(DEFAULTS_KEY, &blob);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assessment::{AssessmentStatus, FALLBACK_ASSESSMENT_KEY};
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn engine() -> UncertaintyEngine<MemoryStore> {
        UncertaintyEngine::load(MemoryStore::new())
    }

    #[test]
    fn test_get_active_creates_record_seeded_from_defaults() {
        let mut engine = engine();
        engine.update_defaults(|mut params| {
            params.sensor_error.value = Some(1.25);
            params
        });

        let record = engine.get_active(Some("report-42"));
        assert_eq!(record.params.sensor_error.value, Some(1.25));
        assert_eq!(record.status, AssessmentStatus::Empty);
        assert_eq!(record.last_updated, None);
    }

    #[test]
    fn test_get_active_none_resolves_to_fallback_key() {
        let mut engine = engine();
        engine.get_active(None);
        let keys: Vec<&str> = engine.assessments().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![FALLBACK_ASSESSMENT_KEY]);
    }

    #[test]
    fn test_records_are_independent_per_key() {
        let mut engine = engine();
        engine.update_params(Some("report-1"), |mut params| {
            params.sensor_error.value = Some(9.0);
            params
        });

        assert_eq!(
            engine.get_active(Some("report-2")).params.sensor_error.value,
            ParameterSet::default().sensor_error.value
        );
        assert_eq!(engine.assessment_count(), 2);
    }

    #[test]
    fn test_editing_defaults_does_not_touch_existing_records() {
        let mut engine = engine();
        engine.ensure("report-1");

        engine.update_defaults(|mut params| {
            params.sensor_error.value = Some(5.0);
            params
        });
        engine.save_defaults();

        assert_ne!(
            engine.get_active(Some("report-1")).params.sensor_error.value,
            Some(5.0)
        );
        // But a record created afterwards picks the new seed up
        assert_eq!(
            engine.get_active(Some("report-2")).params.sensor_error.value,
            Some(5.0)
        );
    }

    #[test]
    fn test_load_defaults_into_applies_stale_demotion() {
        let mut engine = engine();
        engine.save(Some("report-1"));
        assert_eq!(
            engine.get_active(Some("report-1")).status,
            AssessmentStatus::Filled
        );

        engine.update_defaults(|mut params| {
            params.sensor_error.value = Some(2.5);
            params
        });
        let preview = engine.load_defaults_into(Some("report-1"));

        let record = engine.get_active(Some("report-1"));
        assert_eq!(record.status, AssessmentStatus::Stale);
        assert_eq!(record.params.sensor_error.value, Some(2.5));
        assert!(preview.valid);
    }

    #[test]
    fn test_state_survives_reload() {
        let mut store = MemoryStore::new();
        {
            let mut engine = UncertaintyEngine::load(store.clone());
            engine.update_params(Some("report-1"), |mut params| {
                params.sensor_error.value = Some(0.9);
                params
            });
            engine.save(Some("report-1"));
            // Grab the blobs the engine wrote
            store = engine.storage;
        }

        let mut reloaded = UncertaintyEngine::load(store);
        let record = reloaded.get_active(Some("report-1"));
        assert_eq!(record.status, AssessmentStatus::Filled);
        assert_eq!(record.params.sensor_error.value, Some(0.9));
        assert!(record.results.valid);
    }

    #[test]
    fn test_defaults_survive_reload_only_after_save() {
        let mut store = MemoryStore::new();
        {
            let mut engine = UncertaintyEngine::load(store.clone());
            engine.update_defaults(|mut params| {
                params.sensor_error.value = Some(7.0);
                params
            });
            // No save_defaults: the draft must not be persisted
            store = engine.storage;
        }
        let engine = UncertaintyEngine::load(store.clone());
        assert_ne!(engine.defaults_record().params.sensor_error.value, Some(7.0));

        {
            let mut engine = UncertaintyEngine::load(store.clone());
            engine.update_defaults(|mut params| {
                params.sensor_error.value = Some(7.0);
                params
            });
            engine.save_defaults();
            store = engine.storage;
        }
        let engine = UncertaintyEngine::load(store);
        assert_eq!(engine.defaults_record().params.sensor_error.value, Some(7.0));
        assert!(engine.defaults_record().last_modified.is_some());
    }

    #[test]
    fn test_legacy_blob_merges_under_fallback_key() {
        let mut store = MemoryStore::new();
        let legacy = json!({
            "status": "filled",
            "lastUpdated": "2024-03-01T08:00:00Z",
            "params": {
                "radialMisalignment": { "value": 0.9, "unit": "μm", "distribution": "uniform" },
            },
            "results": { "radial": 0.5, "axial": 0.5, "valid": true },
        });
        store.seed(crate::storage::LEGACY_STATE_KEY, &legacy.to_string());

        let mut engine = UncertaintyEngine::load(store);
        let record = engine.get_active(None);
        assert_eq!(record.status, AssessmentStatus::Filled);
        assert_eq!(record.params.sensor_misalignment_radial.value, Some(0.9));
    }

    #[test]
    fn test_map_record_wins_over_legacy_blob() {
        let mut store = MemoryStore::new();
        let map = json!({
            "default": {
                "status": "empty",
                "params": { "sensorError": { "value": 1.0, "unit": "μm", "distribution": "uniform" } },
            },
        });
        let legacy = json!({
            "status": "filled",
            "params": { "sensorError": { "value": 2.0, "unit": "μm", "distribution": "uniform" } },
        });
        store.seed(crate::storage::STATE_MAP_KEY, &map.to_string());
        store.seed(crate::storage::LEGACY_STATE_KEY, &legacy.to_string());

        let mut engine = UncertaintyEngine::load(store);
        assert_eq!(
            engine.get_active(None).params.sensor_error.value,
            Some(1.0)
        );
    }

    #[test]
    fn test_legacy_blob_without_params_is_ignored() {
        let mut store = MemoryStore::new();
        store.seed(crate::storage::LEGACY_STATE_KEY, "{\"status\":\"filled\"}");

        let engine = UncertaintyEngine::load(store);
        assert_eq!(engine.assessment_count(), 0);
    }

    #[test]
    fn test_malformed_blobs_fall_back_to_factory_state() {
        let mut store = MemoryStore::new();
        store.seed(crate::storage::DEFAULTS_KEY, "{{{not json");
        store.seed(crate::storage::STATE_MAP_KEY, "also not json");

        let engine = UncertaintyEngine::load(store);
        assert_eq!(engine.defaults_record().params, ParameterSet::default());
        assert_eq!(engine.assessment_count(), 0);
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let mut engine = UncertaintyEngine::load(MemoryStore::read_only());
        engine.update_params(Some("report-1"), |mut params| {
            params.sensor_error.value = Some(0.7);
            params
        });
        let record = engine.save(Some("report-1"));

        // Nothing reached the medium, but the session state is intact
        assert_eq!(record.status, AssessmentStatus::Filled);
        assert!(!engine.storage.contains(crate::storage::STATE_MAP_KEY));

        assert!(engine.import_defaults(r#"{ "params": {} }"#));
        engine.reset_defaults();
    }

    #[test]
    fn test_legacy_key_is_never_written() {
        let mut store = MemoryStore::new();
        store.seed(crate::storage::LEGACY_STATE_KEY, r#"{ "params": {} }"#);
        let legacy_before = store.read(crate::storage::LEGACY_STATE_KEY);

        let mut engine = UncertaintyEngine::load(store);
        engine.save(None);
        engine.save_defaults();

        assert_eq!(
            engine.storage.read(crate::storage::LEGACY_STATE_KEY),
            legacy_before
        );
        assert!(engine.storage.contains(crate::storage::STATE_MAP_KEY));
    }
}
