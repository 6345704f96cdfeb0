//! Assessment records and the keyed store behind report/run evaluations
//!
//! Each report or run gets its own [`AssessmentRecord`]: an independent
//! parameter set, the last committed combination result, a freshness status,
//! and the timestamp of the last save. The store creates records lazily the
//! first time a key is touched, seeding them from the defaults record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::combine::{combine, UncertaintyResult};
use crate::core::params::ParameterSet;

/// Well-known key for legacy/ungrouped assessments
pub const FALLBACK_ASSESSMENT_KEY: &str = "default";

/// Resolve an optional caller-supplied key to a concrete one
pub fn resolve_key(key: Option<&str>) -> &str {
    key.unwrap_or(FALLBACK_ASSESSMENT_KEY)
}

/// Freshness of an assessment's committed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AssessmentStatus {
    /// Nothing committed yet
    #[default]
    Empty,
    /// Results committed and still matching the parameters
    Filled,
    /// Results committed, but the parameters have changed since
    Stale,
}

impl AssessmentStatus {
    /// Parse a persisted status name, if recognized
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(AssessmentStatus::Empty),
            "filled" => Some(AssessmentStatus::Filled),
            "stale" => Some(AssessmentStatus::Stale),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessmentStatus::Empty => write!(f, "empty"),
            AssessmentStatus::Filled => write!(f, "filled"),
            AssessmentStatus::Stale => write!(f, "stale"),
        }
    }
}

/// One independent uncertainty evaluation tied to a report/run key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    #[serde(default)]
    pub status: AssessmentStatus,

    /// Timestamp of the last successful save; `None` until then
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    pub params: ParameterSet,

    /// Results as of the last commit point (seed, save, or reset). Edits
    /// after a save leave these in place; `status` flags the drift.
    #[serde(default)]
    pub results: UncertaintyResult,
}

impl AssessmentRecord {
    /// Fresh record seeded from a parameter set
    ///
    /// Results are computed immediately so readers of a brand-new record
    /// always see a snapshot consistent with its parameters.
    pub fn seeded_from(params: ParameterSet) -> Self {
        let results = combine(&params);
        Self {
            status: AssessmentStatus::Empty,
            last_updated: None,
            params,
            results,
        }
    }

    /// Combination of the record's current parameters
    ///
    /// This is the live value; it only matches `results` while the record
    /// is not stale.
    pub fn recompute(&self) -> UncertaintyResult {
        combine(&self.params)
    }

    /// Rebuild a persisted record, tolerating older or damaged shapes
    pub fn normalize(raw: &Value) -> Self {
        let Some(map) = raw.as_object() else {
            return Self::seeded_from(ParameterSet::default());
        };

        let params = ParameterSet::normalize(map.get("params").unwrap_or(&Value::Null));
        let status = map
            .get("status")
            .and_then(Value::as_str)
            .and_then(AssessmentStatus::parse)
            .unwrap_or_default();
        let last_updated = map
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let results = map
            .get("results")
            .and_then(|value| serde_json::from_value::<UncertaintyResult>(value.clone()).ok())
            .unwrap_or_else(|| combine(&params));

        Self {
            status,
            last_updated,
            params,
            results,
        }
    }
}

/// Keyed collection of assessment records
///
/// The store owns every record exclusively; callers mutate through the
/// operations below, never through shared references. Persistence is the
/// engine's job: all operations here are pure in-memory state changes.
#[derive(Debug, Default)]
pub struct AssessmentStore {
    records: BTreeMap<String, AssessmentRecord>,
}

impl AssessmentStore {
    /// Rebuild the store from a persisted key→record map
    pub fn rehydrate(raw: &Value) -> Self {
        let mut records = BTreeMap::new();
        if let Some(map) = raw.as_object() {
            for (key, value) in map {
                records.insert(key.clone(), AssessmentRecord::normalize(value));
            }
        }
        Self { records }
    }

    /// Adopt a record read from the legacy single-record blob
    ///
    /// Merged under the fallback key, and only when the map has no record
    /// there already: the map is the newer source of truth.
    pub fn adopt_legacy(&mut self, record: AssessmentRecord) {
        self.records
            .entry(FALLBACK_ASSESSMENT_KEY.to_string())
            .or_insert(record);
    }

    /// Create the record for `key` if it does not exist yet
    ///
    /// New records are seeded with a value copy of the given parameters.
    /// Returns whether a record was created. Idempotent.
    pub fn ensure(&mut self, key: &str, seed: &ParameterSet) -> bool {
        if self.records.contains_key(key) {
            return false;
        }
        self.records
            .insert(key.to_string(), AssessmentRecord::seeded_from(seed.clone()));
        true
    }

    pub fn record(&self, key: &str) -> Option<&AssessmentRecord> {
        self.records.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate records in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssessmentRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Apply a pure transformation to the record's parameters
    ///
    /// Demotes a previously committed record to stale; the committed
    /// results and timestamp stay as they were until the next save. The
    /// returned value is the recomputed combination of the new parameters,
    /// for callers that want a preview.
    pub fn update_params<F>(&mut self, key: &str, update: F) -> UncertaintyResult
    where
        F: FnOnce(ParameterSet) -> ParameterSet,
    {
        let Some(record) = self.records.get_mut(key) else {
            return UncertaintyResult::default();
        };
        record.params = update(record.params.clone());
        if record.status == AssessmentStatus::Filled {
            record.status = AssessmentStatus::Stale;
        }
        combine(&record.params)
    }

    /// Commit the combination of the current parameters
    ///
    /// A valid result fills the record with a fresh timestamp; an invalid
    /// one empties it.
    pub fn save(&mut self, key: &str) {
        let Some(record) = self.records.get_mut(key) else {
            return;
        };
        let results = combine(&record.params);
        if results.valid {
            record.status = AssessmentStatus::Filled;
            record.last_updated = Some(Utc::now());
        } else {
            record.status = AssessmentStatus::Empty;
            record.last_updated = None;
        }
        record.results = results;
    }

    /// Replace the record's parameters with the factory baseline
    pub fn reset(&mut self, key: &str) {
        if let Some(record) = self.records.get_mut(key) {
            *record = AssessmentRecord::seeded_from(ParameterSet::default());
        }
    }

    /// Demote a committed record to stale; no-op in any other state
    ///
    /// Used when an external dependency (a data-source switch, say)
    /// invalidates a committed assessment without editing its parameters.
    pub fn mark_stale(&mut self, key: &str) -> bool {
        match self.records.get_mut(key) {
            Some(record) if record.status == AssessmentStatus::Filled => {
                record.status = AssessmentStatus::Stale;
                true
            }
            _ => false,
        }
    }

    /// Serialized snapshot of the whole map, if representable
    pub fn snapshot(&self) -> Option<String> {
        serde_json::to_string(&self.records).ok()
    }
}
