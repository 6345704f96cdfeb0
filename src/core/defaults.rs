//! Organization-wide default parameter set
//!
//! A single record shared by every new assessment. Edits are drafts until an
//! explicit save stamps `lastModified`; reset and import commit immediately.
//! Editing the defaults never reaches back into existing assessments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::params::ParameterSet;

/// The shared seed for new assessment records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsRecord {
    pub params: ParameterSet,

    /// Timestamp of the last committed change; `None` for factory state
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Store owning the single defaults record
#[derive(Debug, Default)]
pub struct DefaultsStore {
    record: DefaultsRecord,
}

impl DefaultsStore {
    /// Rebuild from a persisted blob; anything unusable falls back to
    /// factory state
    pub fn rehydrate(raw: &Value) -> Self {
        let Some(map) = raw.as_object() else {
            return Self::default();
        };
        let Some(params_raw) = map.get("params") else {
            return Self::default();
        };

        Self {
            record: DefaultsRecord {
                params: ParameterSet::normalize(params_raw),
                last_modified: parse_timestamp(map.get("lastModified")),
            },
        }
    }

    pub fn record(&self) -> &DefaultsRecord {
        &self.record
    }

    pub fn params(&self) -> &ParameterSet {
        &self.record.params
    }

    /// Draft edit: transforms the parameters without touching
    /// `lastModified`. Persisting is deferred until [`DefaultsStore::save`].
    pub fn update<F>(&mut self, update: F)
    where
        F: FnOnce(ParameterSet) -> ParameterSet,
    {
        self.record.params = update(self.record.params.clone());
    }

    /// Commit the current draft with a fresh timestamp
    pub fn save(&mut self) {
        self.record.last_modified = Some(Utc::now());
    }

    /// Restore factory defaults and clear the timestamp
    pub fn reset(&mut self) {
        self.record = DefaultsRecord::default();
    }

    /// Human-readable snapshot of the committed record
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.record).unwrap_or_default()
    }

    /// Replace the record from an exported snapshot
    ///
    /// A document without a `params` field is rejected and leaves the store
    /// unchanged. A missing `lastModified` is replaced with the current
    /// time; a present one is carried over verbatim.
    pub fn import(&mut self, doc: &str) -> bool {
        let Ok(raw) = serde_json::from_str::<Value>(doc) else {
            return false;
        };
        let Some(map) = raw.as_object() else {
            return false;
        };
        let Some(params_raw) = map.get("params") else {
            return false;
        };

        self.record = DefaultsRecord {
            params: ParameterSet::normalize(params_raw),
            last_modified: parse_timestamp(map.get("lastModified")).or_else(|| Some(Utc::now())),
        };
        true
    }

    /// Serialized snapshot for the storage medium, if representable
    pub fn snapshot(&self) -> Option<String> {
        serde_json::to_string(&self.record).ok()
    }
}

fn parse_timestamp(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    raw.and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
