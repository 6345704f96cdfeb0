//! Parameter set model - the typed schema of all uncertainty contributors
//!
//! A parameter set is a fixed-shape collection of declared uncertainty
//! contributors plus two descriptive environment readings. Sets loaded from
//! persisted storage go through [`ParameterSet::normalize`], which tolerates
//! older field names and damaged shapes; sets built in memory are always
//! well-typed and never need it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::distribution::Distribution;

/// Native unit that gets converted during combination
pub const UNIT_NM: &str = "nm";
/// Working unit of the combination calculator
pub const UNIT_UM: &str = "μm";

/// One declared uncertainty contributor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyParameter {
    /// Declared half-width or standard deviation; `None` until provided
    pub value: Option<f64>,

    /// Declared unit ("nm" is converted; anything else is read as μm)
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Distribution shape of the declared value
    #[serde(default)]
    pub distribution: Distribution,
}

fn default_unit() -> String {
    UNIT_UM.to_string()
}

impl UncertaintyParameter {
    pub fn new(value: f64, unit: &str, distribution: Distribution) -> Self {
        Self {
            value: Some(value),
            unit: unit.to_string(),
            distribution,
        }
    }

    /// Declared value converted to micrometers
    ///
    /// Only "nm" has a conversion entry; every other declared unit is taken
    /// as already being in micrometers. Extending the unit table means
    /// extending this match, nothing else.
    pub fn micrometers(&self) -> Option<f64> {
        let value = self.value.filter(|v| v.is_finite())?;
        match self.unit.as_str() {
            UNIT_NM => Some(value / 1000.0),
            _ => Some(value),
        }
    }

    /// Standard uncertainty (standard deviation equivalent) in micrometers
    ///
    /// `None` means "not yet configured" and is a normal state, not an
    /// error: any combination depending on this contributor is invalid
    /// until a value arrives.
    pub fn standard_uncertainty(&self) -> Option<f64> {
        let micrometers = self.micrometers()?;
        Some(micrometers.abs() / self.distribution.divisor())
    }
}

/// Descriptive environment reading, carried for reporting only
///
/// Not part of the uncertainty combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub value: Option<f64>,
    pub unit: String,
}

impl EnvironmentReading {
    pub fn new(value: f64, unit: &str) -> Self {
        Self {
            value: Some(value),
            unit: unit.to_string(),
        }
    }
}

/// Names of the seven uncertainty contributors in a parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contributor {
    SensorError,
    StandardError,
    EnvironmentError,
    SensorMisalignmentRadial,
    SensorMisalignmentAxial,
    SensorLateralDisplacementRadial,
    SensorLateralDisplacementAxial,
}

impl Contributor {
    pub const ALL: [Contributor; 7] = [
        Contributor::SensorError,
        Contributor::StandardError,
        Contributor::EnvironmentError,
        Contributor::SensorMisalignmentRadial,
        Contributor::SensorMisalignmentAxial,
        Contributor::SensorLateralDisplacementRadial,
        Contributor::SensorLateralDisplacementAxial,
    ];

    /// Human-readable label for tables and prompts
    pub fn label(self) -> &'static str {
        match self {
            Contributor::SensorError => "sensor error",
            Contributor::StandardError => "standard error",
            Contributor::EnvironmentError => "environment error",
            Contributor::SensorMisalignmentRadial => "sensor misalignment (radial)",
            Contributor::SensorMisalignmentAxial => "sensor misalignment (axial)",
            Contributor::SensorLateralDisplacementRadial => "lateral displacement (radial)",
            Contributor::SensorLateralDisplacementAxial => "lateral displacement (axial)",
        }
    }
}

/// The full set of declared contributors for one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub sensor_error: UncertaintyParameter,
    pub standard_error: UncertaintyParameter,
    pub environment_error: UncertaintyParameter,
    pub sensor_misalignment_radial: UncertaintyParameter,
    pub sensor_misalignment_axial: UncertaintyParameter,
    pub sensor_lateral_displacement_radial: UncertaintyParameter,
    pub sensor_lateral_displacement_axial: UncertaintyParameter,
    pub environment_temperature: EnvironmentReading,
    pub environment_humidity: EnvironmentReading,
}

impl Default for ParameterSet {
    /// Factory defaults: the hardcoded baseline used when nothing is
    /// persisted yet and on explicit reset
    fn default() -> Self {
        Self {
            sensor_error: UncertaintyParameter::new(0.5, UNIT_UM, Distribution::Uniform),
            standard_error: UncertaintyParameter::new(0.3, UNIT_UM, Distribution::Uniform),
            environment_error: UncertaintyParameter::new(0.2, UNIT_UM, Distribution::Uniform),
            sensor_misalignment_radial: UncertaintyParameter::new(
                0.4,
                UNIT_UM,
                Distribution::Uniform,
            ),
            sensor_misalignment_axial: UncertaintyParameter::new(
                0.4,
                UNIT_UM,
                Distribution::Uniform,
            ),
            sensor_lateral_displacement_radial: UncertaintyParameter::new(
                0.2,
                UNIT_UM,
                Distribution::Uniform,
            ),
            sensor_lateral_displacement_axial: UncertaintyParameter::new(
                0.2,
                UNIT_UM,
                Distribution::Uniform,
            ),
            environment_temperature: EnvironmentReading::new(20.0, "°C"),
            environment_humidity: EnvironmentReading::new(50.0, "%RH"),
        }
    }
}

impl ParameterSet {
    pub fn contributor(&self, which: Contributor) -> &UncertaintyParameter {
        match which {
            Contributor::SensorError => &self.sensor_error,
            Contributor::StandardError => &self.standard_error,
            Contributor::EnvironmentError => &self.environment_error,
            Contributor::SensorMisalignmentRadial => &self.sensor_misalignment_radial,
            Contributor::SensorMisalignmentAxial => &self.sensor_misalignment_axial,
            Contributor::SensorLateralDisplacementRadial => {
                &self.sensor_lateral_displacement_radial
            }
            Contributor::SensorLateralDisplacementAxial => &self.sensor_lateral_displacement_axial,
        }
    }

    pub fn contributor_mut(&mut self, which: Contributor) -> &mut UncertaintyParameter {
        match which {
            Contributor::SensorError => &mut self.sensor_error,
            Contributor::StandardError => &mut self.standard_error,
            Contributor::EnvironmentError => &mut self.environment_error,
            Contributor::SensorMisalignmentRadial => &mut self.sensor_misalignment_radial,
            Contributor::SensorMisalignmentAxial => &mut self.sensor_misalignment_axial,
            Contributor::SensorLateralDisplacementRadial => {
                &mut self.sensor_lateral_displacement_radial
            }
            Contributor::SensorLateralDisplacementAxial => {
                &mut self.sensor_lateral_displacement_axial
            }
        }
    }

    /// Rebuild a parameter set from persisted data of any vintage
    ///
    /// Every field that is absent or has the wrong shape falls back to its
    /// factory default instead of failing the load. Two renamed fields from
    /// the original schema are still honored: `radialMisalignment` and
    /// `axialMisalignment` feed the sensor-misalignment fields when the new
    /// names are absent.
    pub fn normalize(raw: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = raw.as_object() else {
            return defaults;
        };

        let parameter = |name: &str, legacy: Option<&str>, fallback: &UncertaintyParameter| {
            map.get(name)
                .or_else(|| legacy.and_then(|key| map.get(key)))
                .map(|value| normalize_parameter(value, fallback))
                .unwrap_or_else(|| fallback.clone())
        };
        let reading = |name: &str, fallback: &EnvironmentReading| {
            map.get(name)
                .map(|value| normalize_reading(value, fallback))
                .unwrap_or_else(|| fallback.clone())
        };

        Self {
            sensor_error: parameter("sensorError", None, &defaults.sensor_error),
            standard_error: parameter("standardError", None, &defaults.standard_error),
            environment_error: parameter("environmentError", None, &defaults.environment_error),
            sensor_misalignment_radial: parameter(
                "sensorMisalignmentRadial",
                Some("radialMisalignment"),
                &defaults.sensor_misalignment_radial,
            ),
            sensor_misalignment_axial: parameter(
                "sensorMisalignmentAxial",
                Some("axialMisalignment"),
                &defaults.sensor_misalignment_axial,
            ),
            sensor_lateral_displacement_radial: parameter(
                "sensorLateralDisplacementRadial",
                None,
                &defaults.sensor_lateral_displacement_radial,
            ),
            sensor_lateral_displacement_axial: parameter(
                "sensorLateralDisplacementAxial",
                None,
                &defaults.sensor_lateral_displacement_axial,
            ),
            environment_temperature: reading(
                "environmentTemperature",
                &defaults.environment_temperature,
            ),
            environment_humidity: reading("environmentHumidity", &defaults.environment_humidity),
        }
    }
}

fn normalize_parameter(raw: &Value, fallback: &UncertaintyParameter) -> UncertaintyParameter {
    let Some(map) = raw.as_object() else {
        return fallback.clone();
    };

    // A non-numeric value reads as "not yet provided"; unit and distribution
    // keep the field's factory choice when unrecognized.
    let value = map.get("value").and_then(Value::as_f64);
    let unit = map
        .get("unit")
        .and_then(Value::as_str)
        .unwrap_or(&fallback.unit)
        .to_string();
    let distribution = map
        .get("distribution")
        .and_then(Value::as_str)
        .and_then(Distribution::parse)
        .unwrap_or(fallback.distribution);

    UncertaintyParameter {
        value,
        unit,
        distribution,
    }
}

fn normalize_reading(raw: &Value, fallback: &EnvironmentReading) -> EnvironmentReading {
    let Some(map) = raw.as_object() else {
        return fallback.clone();
    };

    EnvironmentReading {
        value: map.get("value").and_then(Value::as_f64),
        unit: map
            .get("unit")
            .and_then(Value::as_str)
            .unwrap_or(&fallback.unit)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_uncertainty_uniform() {
        let param = UncertaintyParameter::new(0.5, UNIT_UM, Distribution::Uniform);
        let sigma = param.standard_uncertainty().unwrap();
        assert!((sigma - 0.5 / 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_standard_uncertainty_normal_is_identity() {
        let param = UncertaintyParameter::new(0.25, UNIT_UM, Distribution::Normal);
        assert_eq!(param.standard_uncertainty(), Some(0.25));
    }

    #[test]
    fn test_standard_uncertainty_converts_nanometers() {
        let param = UncertaintyParameter::new(500.0, UNIT_NM, Distribution::Uniform);
        let sigma = param.standard_uncertainty().unwrap();
        assert!((sigma - 0.5 / 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_standard_uncertainty_unknown_unit_reads_as_micrometers() {
        let param = UncertaintyParameter::new(0.3, "mil", Distribution::Normal);
        assert_eq!(param.standard_uncertainty(), Some(0.3));
    }

    #[test]
    fn test_standard_uncertainty_applies_absolute_value() {
        let param = UncertaintyParameter::new(-0.4, UNIT_UM, Distribution::Normal);
        assert_eq!(param.standard_uncertainty(), Some(0.4));
    }

    #[test]
    fn test_standard_uncertainty_missing_value() {
        let param = UncertaintyParameter {
            value: None,
            unit: UNIT_UM.to_string(),
            distribution: Distribution::Uniform,
        };
        assert_eq!(param.standard_uncertainty(), None);
    }

    #[test]
    fn test_standard_uncertainty_rejects_non_finite() {
        let param = UncertaintyParameter::new(f64::NAN, UNIT_UM, Distribution::Uniform);
        assert_eq!(param.standard_uncertainty(), None);

        let param = UncertaintyParameter::new(f64::INFINITY, UNIT_UM, Distribution::Normal);
        assert_eq!(param.standard_uncertainty(), None);
    }

    #[test]
    fn test_standard_uncertainty_is_linear() {
        let single = UncertaintyParameter::new(0.2, UNIT_UM, Distribution::Triangular);
        let double = UncertaintyParameter::new(0.4, UNIT_UM, Distribution::Triangular);
        let ratio = double.standard_uncertainty().unwrap() / single.standard_uncertainty().unwrap();
        assert!((ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty_object_yields_factory_defaults() {
        let normalized = ParameterSet::normalize(&json!({}));
        assert_eq!(normalized, ParameterSet::default());
    }

    #[test]
    fn test_normalize_non_object_yields_factory_defaults() {
        assert_eq!(ParameterSet::normalize(&json!(null)), ParameterSet::default());
        assert_eq!(ParameterSet::normalize(&json!(42)), ParameterSet::default());
    }

    #[test]
    fn test_normalize_keeps_well_formed_fields() {
        let raw = json!({
            "sensorError": { "value": 700.0, "unit": "nm", "distribution": "triangular" },
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.sensor_error.value, Some(700.0));
        assert_eq!(normalized.sensor_error.unit, UNIT_NM);
        assert_eq!(normalized.sensor_error.distribution, Distribution::Triangular);
        // Untouched fields come back as factory defaults
        assert_eq!(normalized.standard_error, ParameterSet::default().standard_error);
    }

    #[test]
    fn test_normalize_maps_legacy_misalignment_names() {
        let raw = json!({
            "radialMisalignment": { "value": 0.9, "unit": "μm", "distribution": "uniform" },
            "axialMisalignment": { "value": 0.7, "unit": "μm", "distribution": "uniform" },
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.sensor_misalignment_radial.value, Some(0.9));
        assert_eq!(normalized.sensor_misalignment_axial.value, Some(0.7));
    }

    #[test]
    fn test_normalize_prefers_new_names_over_legacy() {
        let raw = json!({
            "sensorMisalignmentRadial": { "value": 1.1, "unit": "μm", "distribution": "uniform" },
            "radialMisalignment": { "value": 0.9, "unit": "μm", "distribution": "uniform" },
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.sensor_misalignment_radial.value, Some(1.1));
    }

    #[test]
    fn test_normalize_unknown_distribution_falls_back() {
        let raw = json!({
            "standardError": { "value": 0.2, "unit": "μm", "distribution": "lognormal" },
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.standard_error.value, Some(0.2));
        assert_eq!(
            normalized.standard_error.distribution,
            ParameterSet::default().standard_error.distribution
        );
    }

    #[test]
    fn test_normalize_null_value_reads_as_unset() {
        let raw = json!({
            "environmentError": { "value": null, "unit": "μm", "distribution": "uniform" },
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.environment_error.value, None);
    }

    #[test]
    fn test_normalize_malformed_field_falls_back_whole() {
        let raw = json!({ "sensorError": "oops" });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.sensor_error, ParameterSet::default().sensor_error);
    }

    #[test]
    fn test_normalize_environment_readings() {
        let raw = json!({
            "environmentTemperature": { "value": 21.4, "unit": "°C" },
            "environmentHumidity": "broken",
        });
        let normalized = ParameterSet::normalize(&raw);
        assert_eq!(normalized.environment_temperature.value, Some(21.4));
        assert_eq!(
            normalized.environment_humidity,
            ParameterSet::default().environment_humidity
        );
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let json = serde_json::to_string(&ParameterSet::default()).unwrap();
        assert!(json.contains("sensorError"));
        assert!(json.contains("sensorMisalignmentRadial"));
        assert!(json.contains("environmentTemperature"));
    }
}
