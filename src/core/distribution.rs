//! Probability distribution shapes for declared uncertainty contributors

use serde::{Deserialize, Serialize};

/// Distribution shape declared for an uncertainty contributor
///
/// The declared value is a half-width for `Uniform` and `Triangular`, and is
/// read directly as a standard deviation for `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Distribution {
    /// Rectangular distribution: sigma = half-width / sqrt(3)
    #[default]
    Uniform,
    /// Gaussian distribution: value is already a standard deviation
    Normal,
    /// Triangular distribution: sigma = half-width / sqrt(6)
    Triangular,
}

impl Distribution {
    /// Divisor that turns the declared value into a standard deviation
    pub fn divisor(self) -> f64 {
        match self {
            Distribution::Uniform => 3.0_f64.sqrt(),
            Distribution::Normal => 1.0,
            Distribution::Triangular => 6.0_f64.sqrt(),
        }
    }

    /// Parse a persisted distribution name, if recognized
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "uniform" => Some(Distribution::Uniform),
            "normal" => Some(Distribution::Normal),
            "triangular" => Some(Distribution::Triangular),
            _ => None,
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Uniform => write!(f, "uniform"),
            Distribution::Normal => write!(f, "normal"),
            Distribution::Triangular => write!(f, "triangular"),
        }
    }
}
