//! Core module - the uncertainty engine and its supporting types

pub mod assessment;
pub mod combine;
pub mod config;
pub mod defaults;
pub mod distribution;
pub mod engine;
pub mod params;
pub mod project;

pub use assessment::{
    resolve_key, AssessmentRecord, AssessmentStatus, AssessmentStore, FALLBACK_ASSESSMENT_KEY,
};
pub use combine::{combine, UncertaintyResult, AXIAL_GROUP, RADIAL_GROUP};
pub use config::Config;
pub use defaults::{DefaultsRecord, DefaultsStore};
pub use distribution::Distribution;
pub use engine::UncertaintyEngine;
pub use params::{
    Contributor, EnvironmentReading, ParameterSet, UncertaintyParameter, UNIT_NM, UNIT_UM,
};
pub use project::{Project, ProjectError};
