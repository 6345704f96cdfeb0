//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::Project;

/// SUT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assessment key used when a command does not name one
    pub assessment: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/sut/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Project config (.sut/config.yaml)
        if let Ok(project) = Project::discover() {
            let project_config_path = project.sut_dir().join("config.yaml");
            if project_config_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&project_config_path) {
                    if let Ok(project_config) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(project_config);
                    }
                }
            }
        }

        // 4. Environment variables
        if let Ok(assessment) = std::env::var("SUT_ASSESSMENT") {
            if !assessment.is_empty() {
                config.assessment = Some(assessment);
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sut")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.assessment.is_some() {
            self.assessment = other.assessment;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Resolve the active assessment key: an explicit key wins, then the
    /// configured one, then the engine's built-in fallback (signaled by
    /// `None`)
    pub fn resolve_assessment(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| self.assessment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_other_takes_precedence() {
        let mut config = Config {
            assessment: Some("report-1".to_string()),
            default_format: None,
        };
        config.merge(Config {
            assessment: Some("report-2".to_string()),
            default_format: Some("json".to_string()),
        });

        assert_eq!(config.assessment.as_deref(), Some("report-2"));
        assert_eq!(config.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_merge_keeps_existing_when_other_is_empty() {
        let mut config = Config {
            assessment: Some("report-1".to_string()),
            default_format: None,
        };
        config.merge(Config::default());
        assert_eq!(config.assessment.as_deref(), Some("report-1"));
    }

    #[test]
    fn test_resolve_assessment_priority() {
        let config = Config {
            assessment: Some("configured".to_string()),
            default_format: None,
        };
        assert_eq!(
            config.resolve_assessment(Some("explicit".to_string())),
            Some("explicit".to_string())
        );
        assert_eq!(
            config.resolve_assessment(None),
            Some("configured".to_string())
        );
        assert_eq!(Config::default().resolve_assessment(None), None);
    }
}
