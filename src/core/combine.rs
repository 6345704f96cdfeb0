//! Combined uncertainty calculation (root-sum-of-squares)

use serde::{Deserialize, Serialize};

use crate::core::params::{Contributor, ParameterSet};

/// Contributors feeding the radial combined uncertainty
pub const RADIAL_GROUP: [Contributor; 5] = [
    Contributor::SensorError,
    Contributor::StandardError,
    Contributor::EnvironmentError,
    Contributor::SensorMisalignmentRadial,
    Contributor::SensorLateralDisplacementRadial,
];

/// Contributors feeding the axial combined uncertainty
pub const AXIAL_GROUP: [Contributor; 5] = [
    Contributor::SensorError,
    Contributor::StandardError,
    Contributor::EnvironmentError,
    Contributor::SensorMisalignmentAxial,
    Contributor::SensorLateralDisplacementAxial,
];

/// Combined radial and axial uncertainty, in micrometers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyResult {
    pub radial: Option<f64>,
    pub axial: Option<f64>,
    pub valid: bool,
}

/// Combine the independent contributors of a parameter set
///
/// Validity is all-or-nothing: as soon as any required contributor is
/// unset, both group values are withheld rather than surfacing a partial
/// (and silently understated) uncertainty.
pub fn combine(params: &ParameterSet) -> UncertaintyResult {
    match (group_rss(params, &RADIAL_GROUP), group_rss(params, &AXIAL_GROUP)) {
        (Some(radial), Some(axial)) => UncertaintyResult {
            radial: Some(round3(radial)),
            axial: Some(round3(axial)),
            valid: true,
        },
        _ => UncertaintyResult::default(),
    }
}

fn group_rss(params: &ParameterSet, group: &[Contributor]) -> Option<f64> {
    let mut sum_of_squares = 0.0;
    for &which in group {
        let sigma = params.contributor(which).standard_uncertainty()?;
        sum_of_squares += sigma * sigma;
    }
    Some(sum_of_squares.sqrt())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distribution::Distribution;
    use crate::core::params::{UncertaintyParameter, UNIT_NM};

    fn nm_uniform(value: f64) -> UncertaintyParameter {
        UncertaintyParameter::new(value, UNIT_NM, Distribution::Uniform)
    }

    #[test]
    fn test_combine_factory_defaults_are_valid() {
        let result = combine(&ParameterSet::default());
        assert!(result.valid);
        assert!(result.radial.is_some());
        assert!(result.axial.is_some());
    }

    #[test]
    fn test_combine_nanometer_scenario() {
        // 500/300/200/400/200 nm uniform across the radial group
        let mut params = ParameterSet::default();
        params.sensor_error = nm_uniform(500.0);
        params.standard_error = nm_uniform(300.0);
        params.environment_error = nm_uniform(200.0);
        params.sensor_misalignment_radial = nm_uniform(400.0);
        params.sensor_lateral_displacement_radial = nm_uniform(200.0);

        let result = combine(&params);
        assert!(result.valid);

        // RSS of 0.5/√3, 0.3/√3, 0.2/√3, 0.4/√3, 0.2/√3 = √(0.58/3)
        let expected = (0.58_f64 / 3.0).sqrt();
        let expected = (expected * 1000.0).round() / 1000.0;
        assert_eq!(result.radial, Some(expected));
        assert_eq!(result.radial, Some(0.44));
    }

    #[test]
    fn test_combine_matches_euclidean_norm() {
        let mut params = ParameterSet::default();
        params.sensor_error = UncertaintyParameter::new(0.12, "μm", Distribution::Normal);
        params.standard_error = UncertaintyParameter::new(0.05, "μm", Distribution::Normal);
        params.environment_error = UncertaintyParameter::new(0.08, "μm", Distribution::Normal);
        params.sensor_misalignment_axial = UncertaintyParameter::new(0.1, "μm", Distribution::Normal);
        params.sensor_lateral_displacement_axial =
            UncertaintyParameter::new(0.03, "μm", Distribution::Normal);

        let sigmas: f64 = [0.12_f64, 0.05, 0.08, 0.1, 0.03]
            .iter()
            .map(|s| s * s)
            .sum();
        let expected = (sigmas.sqrt() * 1000.0).round() / 1000.0;

        let result = combine(&params);
        assert_eq!(result.axial, Some(expected));
    }

    #[test]
    fn test_combine_any_missing_contributor_invalidates_everything() {
        for which in Contributor::ALL {
            let mut params = ParameterSet::default();
            params.contributor_mut(which).value = None;

            let result = combine(&params);
            assert!(!result.valid, "missing {:?} must invalidate", which);
            assert_eq!(result.radial, None);
            assert_eq!(result.axial, None);
        }
    }

    #[test]
    fn test_combine_ignores_environment_readings() {
        let mut params = ParameterSet::default();
        params.environment_temperature.value = None;
        params.environment_humidity.value = None;

        assert!(combine(&params).valid);
    }

    #[test]
    fn test_combine_is_deterministic() {
        let params = ParameterSet::default();
        assert_eq!(combine(&params), combine(&params));
    }

    #[test]
    fn test_combine_rounds_to_three_decimals() {
        let mut params = ParameterSet::default();
        for which in Contributor::ALL {
            *params.contributor_mut(which) =
                UncertaintyParameter::new(0.1, "μm", Distribution::Normal);
        }

        // √5 × 0.1 = 0.22360679… → 0.224
        let result = combine(&params);
        assert_eq!(result.radial, Some(0.224));
        assert_eq!(result.axial, Some(0.224));
    }
}
